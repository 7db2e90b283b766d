//! Materials: nuclide mixtures with an atom density.

use std::sync::Arc;

use tracing::trace;

use crate::distribution::sample_index;
use crate::error::{Error, Result};
use crate::particle::{Particle, ParticleBank};
use crate::random::RandomStream;

use super::{CollisionOutcome, Nuclide};

/// Homogeneous mixture of nuclides.
///
/// Nuclides are shared between materials through `Arc`; the fractions are
/// atom fractions and need not be normalized.
#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    /// Atom density (atoms/barn-cm)
    pub atom_density: f64,
    nuclides: Vec<(Arc<Nuclide>, f64)>,
    num_groups: usize,
}

impl Material {
    pub fn new(
        name: impl Into<String>,
        atom_density: f64,
        nuclides: Vec<(Arc<Nuclide>, f64)>,
    ) -> Result<Self> {
        let name = name.into();
        if !(atom_density.is_finite() && atom_density > 0.0) {
            return Err(Error::InvalidParam(format!(
                "material `{name}`: atom density {atom_density} must be positive"
            )));
        }
        let Some(num_groups) = nuclides.first().map(|(n, _)| n.num_groups()) else {
            return Err(Error::InvalidParam(format!("material `{name}` has no nuclides")));
        };
        if nuclides.iter().any(|(n, _)| n.num_groups() != num_groups) {
            return Err(Error::InvalidParam(format!(
                "material `{name}` mixes nuclides with different group structures"
            )));
        }
        if nuclides.iter().any(|(_, f)| !f.is_finite() || *f < 0.0) {
            return Err(Error::InvalidParam(format!(
                "material `{name}`: atom fractions must be finite and non-negative"
            )));
        }
        Ok(Self {
            name,
            atom_density,
            nuclides,
            num_groups,
        })
    }

    pub fn num_groups(&self) -> usize {
        self.num_groups
    }

    pub fn nuclides(&self) -> &[(Arc<Nuclide>, f64)] {
        &self.nuclides
    }

    /// Fraction-weighted microscopic total cross section
    pub fn micro_xs(&self, group: usize) -> Result<f64> {
        let mut xs = 0.0;
        for (n, frac) in &self.nuclides {
            xs += n.total_xs(group)? * frac;
        }
        Ok(xs)
    }

    /// Macroscopic total cross section (1/cm)
    pub fn macro_xs(&self, group: usize) -> Result<f64> {
        Ok(self.atom_density * self.micro_xs(group)?)
    }

    /// Pick the collision nuclide with probability ∝ `σ_t × fraction`.
    pub fn sample_nuclide<R: RandomStream + ?Sized>(&self, group: usize, rng: &mut R) -> Result<&Nuclide> {
        let weights = self
            .nuclides
            .iter()
            .map(|(n, frac)| Ok(n.total_xs(group)? * frac))
            .collect::<Result<Vec<f64>>>()?;
        Ok(&self.nuclides[sample_index(&weights, rng)].0)
    }

    /// Sample the nuclide, then its reaction, then apply the reaction.
    pub fn sample_collision<R: RandomStream + ?Sized>(
        &self,
        particle: &mut Particle,
        bank: &mut ParticleBank,
        rng: &mut R,
    ) -> Result<CollisionOutcome> {
        let nuclide = self.sample_nuclide(particle.group, rng)?;
        let reaction = nuclide.sample_reaction(particle.group, rng)?;
        trace!(
            material = %self.name,
            nuclide = %nuclide.name,
            reaction = reaction.name(),
            group = particle.group,
            "collision"
        );
        Ok(reaction.sample(particle, bank, rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::Reaction;
    use crate::random::ReplayStream;
    use crate::types::Vec3;
    use approx::assert_relative_eq;

    fn absorber(xs: f64) -> Result<Arc<Nuclide>> {
        Ok(Arc::new(Nuclide::new("abs", 1, vec![Reaction::capture(vec![xs])?])?))
    }

    fn scatterer(xs: f64) -> Result<Arc<Nuclide>> {
        Ok(Arc::new(Nuclide::new("sca", 1, vec![Reaction::scatter(vec![vec![xs]])?])?))
    }

    #[test]
    fn test_cross_sections() -> Result<()> {
        let m = Material::new("mix", 0.5, vec![(absorber(2.0)?, 0.25), (scatterer(4.0)?, 0.75)])?;
        assert_relative_eq!(m.micro_xs(1)?, 3.5);
        assert_relative_eq!(m.macro_xs(1)?, 1.75);
        assert!(m.macro_xs(2).is_err());
        Ok(())
    }

    #[test]
    fn test_nuclide_sampling_weights_by_xs_and_fraction() -> Result<()> {
        // weights: 2 * 0.25 = 0.5 and 4 * 0.75 = 3
        let m = Material::new("mix", 1.0, vec![(absorber(2.0)?, 0.25), (scatterer(4.0)?, 0.75)])?;
        let mut rng = ReplayStream::new(vec![0.1, 0.2])?;
        assert_eq!(m.sample_nuclide(1, &mut rng)?.name, "abs");
        assert_eq!(m.sample_nuclide(1, &mut rng)?.name, "sca");
        Ok(())
    }

    #[test]
    fn test_sample_collision_capture() -> Result<()> {
        let m = Material::new("abs", 1.0, vec![(absorber(1.0)?, 1.0)])?;
        let mut p = Particle::new(Vec3::zero(), Vec3::unit_x(), 1);
        let mut bank = ParticleBank::new();
        let mut rng = ReplayStream::new(vec![0.5])?;
        assert_eq!(m.sample_collision(&mut p, &mut bank, &mut rng)?, CollisionOutcome::Captured);
        assert!(!p.alive);
        Ok(())
    }

    #[test]
    fn test_shared_nuclides() -> Result<()> {
        let shared = absorber(1.0)?;
        let a = Material::new("a", 1.0, vec![(Arc::clone(&shared), 1.0)])?;
        let b = Material::new("b", 2.0, vec![(shared, 1.0)])?;
        assert_relative_eq!(b.macro_xs(1)?, 2.0 * a.macro_xs(1)?);
        Ok(())
    }

    #[test]
    fn test_validation() -> Result<()> {
        assert!(Material::new("none", 1.0, vec![]).is_err());
        assert!(Material::new("dens", 0.0, vec![(absorber(1.0)?, 1.0)]).is_err());
        assert!(Material::new("frac", 1.0, vec![(absorber(1.0)?, -1.0)]).is_err());
        let two = Arc::new(Nuclide::new("two", 2, vec![Reaction::capture(vec![1.0, 1.0])?])?);
        assert!(Material::new("mixed", 1.0, vec![(absorber(1.0)?, 0.5), (two, 0.5)]).is_err());
        Ok(())
    }
}
