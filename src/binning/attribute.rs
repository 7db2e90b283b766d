//! Particle-attribute binnings: a [`BinningStructure`] paired with the
//! projection that reads one attribute off a particle.

use std::fmt;

use crate::error::{Error, Result};
use crate::particle::Particle;
use crate::types::Vec3;

use super::BinningStructure;

/// Particle attributes an estimator collection can be binned over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Group,
    CollisionOrder,
    Angle,
}

impl Attribute {
    pub fn name(&self) -> &'static str {
        match self {
            Attribute::Group => "group",
            Attribute::CollisionOrder => "collisionOrder",
            Attribute::Angle => "angle",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One histogram dimension of an estimator collection.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeBinning {
    /// Energy group, 1-based
    Group(BinningStructure<i64>),
    /// Number of collisions the particle has undergone
    CollisionOrder(BinningStructure<i64>),
    /// Cosine between the particle direction and a unit reference direction
    Angle {
        reference: Vec3,
        bins: BinningStructure<f64>,
    },
}

impl AttributeBinning {
    /// One bin per group over groups `1..=num_groups`.
    pub fn group_all(num_groups: usize) -> Result<Self> {
        Self::group_range(1, num_groups)
    }

    /// A single bin accepting only `group`.
    pub fn group_single(group: usize) -> Result<Self> {
        Self::group_range(group, group)
    }

    /// One bin per group over `min..=max`.
    pub fn group_range(min: usize, max: usize) -> Result<Self> {
        if min == 0 {
            return Err(Error::InvalidBinning("energy groups are 1-based".into()));
        }
        let (lo, hi, size) = inclusive_range("group", min as u64, max as u64)?;
        Ok(Self::Group(BinningStructure::new(lo, hi, size)?))
    }

    /// A single bin accepting particles that have collided exactly `order` times.
    pub fn collision_order(order: u64) -> Result<Self> {
        Self::collision_order_range(order, order)
    }

    /// One bin per collision order over `min..=max`.
    pub fn collision_order_range(min: u64, max: u64) -> Result<Self> {
        let (lo, hi, size) = inclusive_range("collision order", min, max)?;
        Ok(Self::CollisionOrder(BinningStructure::new(lo, hi, size)?))
    }

    /// `size` bins in the cosine with `reference` over `[min, max)`.
    ///
    /// The reference direction is normalized here.
    pub fn angle(reference: Vec3, min: f64, max: f64, size: usize) -> Result<Self> {
        if !reference.is_finite() || reference.mag() < 1e-12 {
            return Err(Error::InvalidBinning(
                "angle binning needs a non-zero reference direction".into(),
            ));
        }
        if min < -1.0 || max > 1.0 + 1e-12 {
            // cosines never leave [-1, 1]; wider bounds would leave empty bins
            return Err(Error::InvalidBinning(format!(
                "angle cosine bounds [{min}, {max}) exceed [-1, 1]"
            )));
        }
        Ok(Self::Angle {
            reference: reference.normalize(),
            bins: BinningStructure::new(min, max, size)?,
        })
    }

    pub fn attribute(&self) -> Attribute {
        match self {
            Self::Group(_) => Attribute::Group,
            Self::CollisionOrder(_) => Attribute::CollisionOrder,
            Self::Angle { .. } => Attribute::Angle,
        }
    }

    /// Number of bins along this dimension
    pub fn size(&self) -> usize {
        match self {
            Self::Group(b) | Self::CollisionOrder(b) => b.size(),
            Self::Angle { bins, .. } => bins.size(),
        }
    }

    /// Bin the particle falls in, `None` when outside the binned domain.
    pub fn index(&self, particle: &Particle) -> Result<Option<usize>> {
        match self {
            Self::Group(b) => b.index(particle.group as i64),
            Self::CollisionOrder(b) => b.index(particle.collisions as i64),
            Self::Angle { reference, bins } => bins.index(particle.dir.dot(reference)),
        }
    }

    /// Lower edge of bin `k` as a float, for reporting.
    pub fn lower_edge(&self, k: usize) -> Result<f64> {
        match self {
            Self::Group(b) | Self::CollisionOrder(b) => Ok(b.lower_edge(k)? as f64),
            Self::Angle { bins, .. } => bins.lower_edge(k),
        }
    }

    /// Human-readable label of bin `k`, e.g. `group = 3`.
    pub fn label(&self, k: usize) -> Result<String> {
        match self {
            Self::Group(b) | Self::CollisionOrder(b) => {
                let lo = b.lower_edge(k)?;
                let hi = b.lower_edge(k + 1)?;
                if hi - lo == 1 {
                    Ok(format!("{} = {}", self.attribute(), lo))
                } else {
                    Ok(format!("{} in [{}, {})", self.attribute(), lo, hi))
                }
            }
            Self::Angle { bins, .. } => Ok(format!(
                "{} in [{:.6}, {:.6})",
                self.attribute(),
                bins.lower_edge(k)?,
                bins.lower_edge(k + 1)?
            )),
        }
    }
}

fn inclusive_range(what: &str, min: u64, max: u64) -> Result<(i64, i64, usize)> {
    if max < min {
        return Err(Error::InvalidBinning(format!(
            "{what} range {min}..={max} is empty"
        )));
    }
    let lo = i64::try_from(min).ok();
    let hi = i64::try_from(max).ok().and_then(|m| m.checked_add(1));
    let size = usize::try_from(max - min).ok().and_then(|n| n.checked_add(1));
    match (lo, hi, size) {
        (Some(lo), Some(hi), Some(size)) => Ok((lo, hi, size)),
        _ => Err(Error::InvalidBinning(format!(
            "{what} range {min}..={max} is too large"
        ))),
    }
}
