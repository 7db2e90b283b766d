//! Nuclides: named sets of reaction channels sharing one group structure.

use crate::distribution::sample_index;
use crate::error::{Error, Result};
use crate::random::RandomStream;

use super::Reaction;

#[derive(Debug, Clone, PartialEq)]
pub struct Nuclide {
    pub name: String,
    num_groups: usize,
    reactions: Vec<Reaction>,
}

impl Nuclide {
    pub fn new(name: impl Into<String>, num_groups: usize, reactions: Vec<Reaction>) -> Result<Self> {
        let name = name.into();
        if num_groups == 0 {
            return Err(Error::InvalidParam(format!("nuclide `{name}` has no groups")));
        }
        if reactions.is_empty() {
            return Err(Error::InvalidParam(format!("nuclide `{name}` has no reactions")));
        }
        if let Some(r) = reactions.iter().find(|r| r.num_groups() != num_groups) {
            return Err(Error::InvalidParam(format!(
                "nuclide `{name}`: {} data covers {} groups, expected {num_groups}",
                r.name(),
                r.num_groups()
            )));
        }
        Ok(Self {
            name,
            num_groups,
            reactions,
        })
    }

    pub fn num_groups(&self) -> usize {
        self.num_groups
    }

    pub fn reactions(&self) -> &[Reaction] {
        &self.reactions
    }

    fn check_group(&self, group: usize) -> Result<()> {
        if group == 0 || group > self.num_groups {
            return Err(Error::InvalidParam(format!(
                "group {group} outside 1..={} of nuclide `{}`",
                self.num_groups, self.name
            )));
        }
        Ok(())
    }

    /// Total microscopic cross section in `group`
    pub fn total_xs(&self, group: usize) -> Result<f64> {
        self.check_group(group)?;
        Ok(self.reactions.iter().map(|r| r.xs(group)).sum())
    }

    /// Pick a reaction with probability `σ_r / σ_t` in the particle's group.
    pub fn sample_reaction<R: RandomStream + ?Sized>(&self, group: usize, rng: &mut R) -> Result<&Reaction> {
        self.check_group(group)?;
        let weights: Vec<f64> = self.reactions.iter().map(|r| r.xs(group)).collect();
        Ok(&self.reactions[sample_index(&weights, rng)])
    }
}
