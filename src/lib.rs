//! # MGMC-RS
//!
//! Multigroup Monte Carlo neutral-particle transport with binned statistical
//! estimators.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │                                MGMC-RS                                      │
//! ├─────────────────────────────────────────────────────────────────────────────┤
//! │  transport     history loop: source → bank → flights → end_history          │
//! │  tally         estimator collections, event handlers, reports               │
//! │  binning       equal-width bins over group / collision order / angle        │
//! │  geometry      surfaces, cells, tetrahedral mesh, problem arena             │
//! │  physics       multigroup nuclides, materials, reactions                    │
//! │  source        position / direction / group samplers                        │
//! │  random        injected uniform streams (production, replay, rand)          │
//! └─────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use mgmc_rs::prelude::*;
//! use std::sync::Arc;
//!
//! # fn main() -> mgmc_rs::error::Result<()> {
//! let settings = RunSettings { num_histories: 1000, ..RunSettings::default() };
//! let mut problem = Problem::new();
//! let g = &mut problem.geometry;
//! let ball = g.add_surface(Surface::sphere("ball", Vec3::zero(), 10.0)?);
//! let absorber = Arc::new(Nuclide::new("abs", 1, vec![Reaction::capture(vec![1.0])?])?);
//! let mat = g.add_material(Material::new("m", 1.0, vec![(absorber, 1.0)])?);
//! let cell = g.add_cell(Cell::new("core", Some(mat), vec![(ball, Sense::Negative)]))?;
//! g.set_source(Source::point("src", Vec3::zero(), 1)?);
//! problem.add_tally(
//!     EstimatorCollection::new(
//!         "flux",
//!         EstimatorType::Collision,
//!         vec![AttributeBinning::group_all(1)?],
//!         settings.num_histories,
//!     )?,
//!     AttachTarget::Cell(cell),
//! )?;
//! let mut transport = Transport::new(problem, settings)?;
//! transport.run_seeded()?;
//! println!("{}", transport.summary());
//! # Ok(())
//! # }
//! ```

pub mod binning;
pub mod config;
pub mod distribution;
pub mod error;
pub mod geometry;
pub mod particle;
pub mod physics;
pub mod random;
pub mod source;
pub mod tally;
pub mod transport;
pub mod types;

// Re-exports
pub use error::{Error, Result};
pub use types::*;

/// Commonly used items
pub mod prelude {
    pub use crate::binning::{Attribute, AttributeBinning, BinningStructure};
    pub use crate::config::{CollisionPolicy, RunSettings};
    pub use crate::error::{Error, Result};
    pub use crate::geometry::{Cell, Geometry, Mesh, MeshElement, Problem, Sense, Surface};
    pub use crate::particle::{Particle, ParticleBank};
    pub use crate::physics::{Material, Nuclide, Reaction};
    pub use crate::random::{RandomGenerator, RandomStream, ReplayStream};
    pub use crate::source::Source;
    pub use crate::tally::{AttachTarget, EstimatorCollection, EstimatorType, Tallies};
    pub use crate::transport::{Transport, TransportStats};
    pub use crate::types::*;
}

/// MGMC version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Information about the library
pub fn info() -> String {
    format!(
        "MGMC-RS v{}\n\
         Multigroup Monte Carlo Neutral-Particle Transport\n\
         Collision / track-length / surface estimators with attribute binning",
        VERSION
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info() {
        let info = info();
        assert!(info.contains("MGMC-RS"));
        assert!(info.contains(VERSION));
    }
}
