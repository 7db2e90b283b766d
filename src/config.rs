//! # Run Settings
//!
//! Knobs for a transport run, loadable from JSON. Missing fields take their
//! defaults.
//!
//! ```json
//! { "num_histories": 50000, "seed": 7, "collision_policy": "Continue" }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// What happens to a particle that survives a collision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CollisionPolicy {
    /// Keep tracking scattered particles
    #[default]
    Continue,
    /// End every particle at its first collision
    TerminateAfterCollision,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    /// Source histories
    pub num_histories: u64,
    /// Master seed; history `h` uses the sub-stream derived from `(seed, h)`
    pub seed: u64,
    /// Distance a particle is pushed past a surface it crosses (cm)
    pub surface_bump: f64,
    pub collision_policy: CollisionPolicy,
    /// Particles colliding this many times are killed
    pub max_collisions_per_particle: u64,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            num_histories: 10_000,
            seed: 12345,
            surface_bump: 1e-8,
            collision_policy: CollisionPolicy::Continue,
            max_collisions_per_particle: 100_000,
        }
    }
}

impl RunSettings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_histories == 0 {
            return Err(Error::InvalidParam("num_histories must be positive".into()));
        }
        if !(self.surface_bump.is_finite() && self.surface_bump > 0.0) {
            return Err(Error::InvalidParam(format!(
                "surface_bump {} must be finite and positive",
                self.surface_bump
            )));
        }
        if self.max_collisions_per_particle == 0 {
            return Err(Error::InvalidParam(
                "max_collisions_per_particle must be positive".into(),
            ));
        }
        Ok(())
    }
}
