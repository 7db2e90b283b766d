//! # Distributions
//!
//! Closed sampler variants feeding source and reaction sampling. Each variant
//! carries its own parameters, is validated once at construction and is
//! sampled through a single `sample` method taking the caller's stream.
//!
//! ## Position samplers
//! - Point: delta at a fixed location
//! - Sphere shell: rejection in the bounding cube, accepting `r_in <= r < r_out`
//! - Annulus along an axis: `r = sqrt(r_in² + (r_out² - r_in²) ξ)`, uniform
//!   azimuth, axial offset uniform over the height
//! - Cuboid: independent uniform coordinates
//!
//! ## Directions
//! Isotropic directions use `μ = 2ξ - 1`, `φ = 2πξ`.

use std::f64::consts::PI;

use crate::error::{Error, Result};
use crate::random::RandomStream;
use crate::types::Vec3;

// ============================================================================
// HELPERS
// ============================================================================

/// Sample an index with probability proportional to `weights[i]`.
///
/// Weights must be non-negative with a positive sum; round-off at the top of
/// the cumulative sum falls back to the last positive weight.
pub fn sample_index<R: RandomStream + ?Sized>(weights: &[f64], rng: &mut R) -> usize {
    let total: f64 = weights.iter().sum();
    let target = rng.uniform() * total;
    let mut cumulative = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        cumulative += w;
        if target < cumulative {
            return i;
        }
    }
    weights.iter().rposition(|&w| w > 0.0).unwrap_or(0)
}

/// Check a weight vector for categorical sampling.
pub fn validate_weights(what: &str, weights: &[f64]) -> Result<()> {
    if weights.is_empty() {
        return Err(Error::InvalidParam(format!("{what}: empty weight vector")));
    }
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(Error::InvalidParam(format!(
            "{what}: weights must be finite and non-negative"
        )));
    }
    if weights.iter().sum::<f64>() <= 0.0 {
        return Err(Error::InvalidParam(format!("{what}: weights sum to zero")));
    }
    Ok(())
}

/// Isotropic unit vector
pub fn isotropic_direction<R: RandomStream + ?Sized>(rng: &mut R) -> Vec3 {
    let mu = 2.0 * rng.uniform() - 1.0;
    let phi = 2.0 * PI * rng.uniform();
    let s = (1.0 - mu * mu).max(0.0).sqrt();
    Vec3::new(s * phi.cos(), s * phi.sin(), mu)
}

/// Two unit vectors completing `axis` (assumed unit) to a right-handed basis.
pub fn orthonormal_basis(axis: Vec3) -> (Vec3, Vec3) {
    let helper = if axis.x.abs() < 0.9 {
        Vec3::unit_x()
    } else {
        Vec3::unit_y()
    };
    let u = axis.cross(&helper).normalize();
    let v = axis.cross(&u);
    (u, v)
}

fn unit(what: &str, v: Vec3) -> Result<Vec3> {
    if !v.is_finite() || v.mag() < 1e-12 {
        return Err(Error::InvalidParam(format!("{what}: zero or non-finite vector")));
    }
    Ok(v.normalize())
}

fn finite_point(what: &str, p: Vec3) -> Result<Vec3> {
    if !p.is_finite() {
        return Err(Error::InvalidParam(format!("{what}: non-finite coordinates")));
    }
    Ok(p)
}

// ============================================================================
// POSITION
// ============================================================================

/// Spatial distribution of source sites
#[derive(Debug, Clone, PartialEq)]
pub enum PositionSampler {
    Point(Vec3),
    Sphere {
        center: Vec3,
        inner_radius: f64,
        outer_radius: f64,
    },
    Annulus {
        base: Vec3,
        axis: Vec3,
        height: f64,
        inner_radius: f64,
        outer_radius: f64,
    },
    Cuboid {
        min: Vec3,
        max: Vec3,
    },
}

impl PositionSampler {
    pub fn point(at: Vec3) -> Result<Self> {
        Ok(Self::Point(finite_point("point sampler", at)?))
    }

    pub fn sphere(center: Vec3, inner_radius: f64, outer_radius: f64) -> Result<Self> {
        check_radii("sphere sampler", inner_radius, outer_radius)?;
        Ok(Self::Sphere {
            center: finite_point("sphere sampler", center)?,
            inner_radius,
            outer_radius,
        })
    }

    /// Annular prism starting at `base`, extending `height` along `axis`.
    pub fn annulus(
        base: Vec3,
        axis: Vec3,
        height: f64,
        inner_radius: f64,
        outer_radius: f64,
    ) -> Result<Self> {
        check_radii("annulus sampler", inner_radius, outer_radius)?;
        if !(height.is_finite() && height >= 0.0) {
            return Err(Error::InvalidParam(format!(
                "annulus sampler: height {height} must be finite and non-negative"
            )));
        }
        Ok(Self::Annulus {
            base: finite_point("annulus sampler", base)?,
            axis: unit("annulus sampler axis", axis)?,
            height,
            inner_radius,
            outer_radius,
        })
    }

    /// Solid cylinder: an annulus with no hole.
    pub fn cylinder(base: Vec3, axis: Vec3, height: f64, radius: f64) -> Result<Self> {
        Self::annulus(base, axis, height, 0.0, radius)
    }

    pub fn cuboid(min: Vec3, max: Vec3) -> Result<Self> {
        let min = finite_point("cuboid sampler", min)?;
        let max = finite_point("cuboid sampler", max)?;
        if min.x > max.x || min.y > max.y || min.z > max.z {
            return Err(Error::InvalidParam(
                "cuboid sampler: min corner exceeds max corner".into(),
            ));
        }
        Ok(Self::Cuboid { min, max })
    }

    pub fn sample<R: RandomStream + ?Sized>(&self, rng: &mut R) -> Vec3 {
        match *self {
            Self::Point(p) => p,
            Self::Sphere {
                center,
                inner_radius,
                outer_radius,
            } => loop {
                let offset = Vec3::new(
                    rng.uniform_range(-outer_radius, outer_radius),
                    rng.uniform_range(-outer_radius, outer_radius),
                    rng.uniform_range(-outer_radius, outer_radius),
                );
                let r = offset.mag();
                if r >= inner_radius && r < outer_radius {
                    break center + offset;
                }
            },
            Self::Annulus {
                base,
                axis,
                height,
                inner_radius,
                outer_radius,
            } => {
                let (u, v) = orthonormal_basis(axis);
                let h = height * rng.uniform();
                let (a, b) = if inner_radius > 0.0 {
                    let r2 = inner_radius * inner_radius
                        + (outer_radius * outer_radius - inner_radius * inner_radius) * rng.uniform();
                    let r = r2.sqrt();
                    let phi = 2.0 * PI * rng.uniform();
                    (r * phi.cos(), r * phi.sin())
                } else {
                    loop {
                        let a = rng.uniform_range(-outer_radius, outer_radius);
                        let b = rng.uniform_range(-outer_radius, outer_radius);
                        if a * a + b * b < outer_radius * outer_radius {
                            break (a, b);
                        }
                    }
                };
                base + axis * h + u * a + v * b
            }
            Self::Cuboid { min, max } => Vec3::new(
                rng.uniform_range(min.x, max.x),
                rng.uniform_range(min.y, max.y),
                rng.uniform_range(min.z, max.z),
            ),
        }
    }
}

fn check_radii(what: &str, inner: f64, outer: f64) -> Result<()> {
    if !(inner.is_finite() && outer.is_finite()) || inner < 0.0 || outer <= inner {
        return Err(Error::InvalidParam(format!(
            "{what}: need 0 <= inner ({inner}) < outer ({outer})"
        )));
    }
    Ok(())
}

// ============================================================================
// DIRECTION
// ============================================================================

/// Angular distribution of emitted particles
#[derive(Debug, Clone, PartialEq)]
pub enum DirectionSampler {
    Isotropic,
    Fixed(Vec3),
}

impl DirectionSampler {
    /// Mono-directional beam; the direction is normalized here.
    pub fn fixed(direction: Vec3) -> Result<Self> {
        Ok(Self::Fixed(unit("direction sampler", direction)?))
    }

    pub fn sample<R: RandomStream + ?Sized>(&self, rng: &mut R) -> Vec3 {
        match *self {
            Self::Isotropic => isotropic_direction(rng),
            Self::Fixed(d) => d,
        }
    }
}

// ============================================================================
// ENERGY GROUP
// ============================================================================

/// Distribution of 1-based energy groups
#[derive(Debug, Clone, PartialEq)]
pub enum GroupSampler {
    Fixed(usize),
    /// `weights[g - 1]` is the relative probability of group `g`
    Categorical(Vec<f64>),
}

impl GroupSampler {
    pub fn fixed(group: usize) -> Result<Self> {
        if group == 0 {
            return Err(Error::InvalidParam("energy groups are 1-based".into()));
        }
        Ok(Self::Fixed(group))
    }

    pub fn categorical(weights: Vec<f64>) -> Result<Self> {
        validate_weights("group sampler", &weights)?;
        Ok(Self::Categorical(weights))
    }

    /// Largest group this sampler can emit
    pub fn max_group(&self) -> usize {
        match self {
            Self::Fixed(g) => *g,
            Self::Categorical(w) => w.len(),
        }
    }

    pub fn sample<R: RandomStream + ?Sized>(&self, rng: &mut R) -> usize {
        match self {
            Self::Fixed(g) => *g,
            Self::Categorical(w) => sample_index(w, rng) + 1,
        }
    }
}
