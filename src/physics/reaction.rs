//! Multigroup reactions and their effect on the colliding particle.

use crate::distribution::{isotropic_direction, sample_index, validate_weights};
use crate::error::{Error, Result};
use crate::particle::{Particle, ParticleBank};
use crate::random::RandomStream;

/// Result of processing one collision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionOutcome {
    Captured,
    Scattered,
    Fissioned { secondaries: usize },
}

/// Reaction channel with per-group data (index `g - 1` for group `g`)
#[derive(Debug, Clone, PartialEq)]
pub enum Reaction {
    /// Absorption without re-emission
    Capture { xs: Vec<f64> },
    /// `matrix[g_in - 1][g_out - 1]` is the g_in → g_out scattering cross section
    Scatter { matrix: Vec<Vec<f64>> },
    /// Fission with mean yield `nu` and emission spectrum `chi`
    Fission {
        xs: Vec<f64>,
        nu: Vec<f64>,
        chi: Vec<f64>,
    },
}

fn non_negative(what: &str, values: &[f64]) -> Result<()> {
    if values.is_empty() {
        return Err(Error::InvalidParam(format!("{what}: no group data")));
    }
    if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
        return Err(Error::InvalidParam(format!(
            "{what}: values must be finite and non-negative"
        )));
    }
    Ok(())
}

impl Reaction {
    pub fn capture(xs: Vec<f64>) -> Result<Self> {
        non_negative("capture cross section", &xs)?;
        Ok(Self::Capture { xs })
    }

    pub fn scatter(matrix: Vec<Vec<f64>>) -> Result<Self> {
        let n = matrix.len();
        if n == 0 {
            return Err(Error::InvalidParam("scatter matrix is empty".into()));
        }
        for row in &matrix {
            if row.len() != n {
                return Err(Error::InvalidParam(format!(
                    "scatter matrix must be square, found a row of {} for {n} groups",
                    row.len()
                )));
            }
            non_negative("scatter matrix", row)?;
        }
        Ok(Self::Scatter { matrix })
    }

    pub fn fission(xs: Vec<f64>, nu: Vec<f64>, chi: Vec<f64>) -> Result<Self> {
        non_negative("fission cross section", &xs)?;
        non_negative("fission nu", &nu)?;
        validate_weights("fission chi", &chi)?;
        if nu.len() != xs.len() || chi.len() != xs.len() {
            return Err(Error::InvalidParam(format!(
                "fission data lengths differ: xs {}, nu {}, chi {}",
                xs.len(),
                nu.len(),
                chi.len()
            )));
        }
        Ok(Self::Fission { xs, nu, chi })
    }

    /// Number of energy groups the data covers
    pub fn num_groups(&self) -> usize {
        match self {
            Reaction::Capture { xs } | Reaction::Fission { xs, .. } => xs.len(),
            Reaction::Scatter { matrix } => matrix.len(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Reaction::Capture { .. } => "capture",
            Reaction::Scatter { .. } => "scatter",
            Reaction::Fission { .. } => "fission",
        }
    }

    /// Microscopic cross section in group `group` (1-based, caller-checked)
    pub fn xs(&self, group: usize) -> f64 {
        let g = group - 1;
        match self {
            Reaction::Capture { xs } | Reaction::Fission { xs, .. } => xs[g],
            Reaction::Scatter { matrix } => matrix[g].iter().sum(),
        }
    }

    /// Apply the reaction to `particle`, banking any secondaries.
    pub fn sample<R: RandomStream + ?Sized>(
        &self,
        particle: &mut Particle,
        bank: &mut ParticleBank,
        rng: &mut R,
    ) -> CollisionOutcome {
        match self {
            Reaction::Capture { .. } => {
                particle.kill();
                CollisionOutcome::Captured
            }
            Reaction::Scatter { matrix } => {
                particle.group = sample_index(&matrix[particle.group - 1], rng) + 1;
                let mu = 2.0 * rng.uniform() - 1.0;
                particle.rotate_direction(mu, rng);
                CollisionOutcome::Scattered
            }
            Reaction::Fission { nu, chi, .. } => {
                particle.kill();
                let n = (nu[particle.group - 1] + rng.uniform()).floor() as usize;
                let parent = &*particle;
                bank.extend((0..n).map(|_| {
                    let dir = isotropic_direction(rng);
                    let group = sample_index(chi, rng) + 1;
                    let mut child = Particle::new(parent.pos, dir, group);
                    child.cell = parent.cell;
                    child.weight = parent.weight;
                    child
                }));
                CollisionOutcome::Fissioned { secondaries: n }
            }
        }
    }
}
