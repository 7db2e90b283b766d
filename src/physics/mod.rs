//! # Multigroup Physics
//!
//! Cross sections and collision sampling for multigroup transport.
//!
//! ## Theory
//!
//! Energy is discretized into groups `g = 1..G`; every reaction carries one
//! microscopic cross section per group. A collision in a material is sampled
//! in two stages:
//!
//! 1. nuclide `i` with probability `σ_t,i(g) f_i / Σ_j σ_t,j(g) f_j`
//! 2. reaction `r` on that nuclide with probability `σ_r(g) / σ_t(g)`
//!
//! The macroscopic total cross section `Σ_t(g) = N Σ_i f_i σ_t,i(g)` sets the
//! free-flight distance `d = -ln(ξ) / Σ_t`.
//!
//! ## References
//!
//! [1] Lewis, E.E., Miller, W.F. "Computational Methods of Neutron Transport", ANS, 1993

pub mod material;
pub mod nuclide;
pub mod reaction;

pub use material::Material;
pub use nuclide::Nuclide;
pub use reaction::{CollisionOutcome, Reaction};
