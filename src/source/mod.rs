//! # Particle Sources
//!
//! A source combines independent position, direction and energy-group
//! distributions. Every history starts with one particle drawn from it.

use crate::distribution::{DirectionSampler, GroupSampler, PositionSampler};
use crate::error::Result;
use crate::particle::Particle;
use crate::random::RandomStream;
use crate::types::Vec3;

#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    pub name: String,
    pub position: PositionSampler,
    pub direction: DirectionSampler,
    pub group: GroupSampler,
}

impl Source {
    pub fn new(
        name: impl Into<String>,
        position: PositionSampler,
        direction: DirectionSampler,
        group: GroupSampler,
    ) -> Self {
        Self {
            name: name.into(),
            position,
            direction,
            group,
        }
    }

    /// Isotropic point source
    pub fn point(name: impl Into<String>, at: Vec3, group: usize) -> Result<Self> {
        Ok(Self::new(
            name,
            PositionSampler::point(at)?,
            DirectionSampler::Isotropic,
            GroupSampler::fixed(group)?,
        ))
    }

    /// Isotropic source uniform in a spherical shell
    pub fn sphere(
        name: impl Into<String>,
        center: Vec3,
        inner_radius: f64,
        outer_radius: f64,
        group: usize,
    ) -> Result<Self> {
        Ok(Self::new(
            name,
            PositionSampler::sphere(center, inner_radius, outer_radius)?,
            DirectionSampler::Isotropic,
            GroupSampler::fixed(group)?,
        ))
    }

    /// Isotropic source uniform in an annular prism
    pub fn annulus(
        name: impl Into<String>,
        base: Vec3,
        axis: Vec3,
        height: f64,
        inner_radius: f64,
        outer_radius: f64,
        group: usize,
    ) -> Result<Self> {
        Ok(Self::new(
            name,
            PositionSampler::annulus(base, axis, height, inner_radius, outer_radius)?,
            DirectionSampler::Isotropic,
            GroupSampler::fixed(group)?,
        ))
    }

    /// Isotropic source uniform in a solid cylinder
    pub fn cylinder(
        name: impl Into<String>,
        base: Vec3,
        axis: Vec3,
        height: f64,
        radius: f64,
        group: usize,
    ) -> Result<Self> {
        Ok(Self::new(
            name,
            PositionSampler::cylinder(base, axis, height, radius)?,
            DirectionSampler::Isotropic,
            GroupSampler::fixed(group)?,
        ))
    }

    /// Draw group, direction and position, in that order.
    pub fn sample<R: RandomStream + ?Sized>(&self, rng: &mut R) -> Particle {
        let group = self.group.sample(rng);
        let dir = self.direction.sample(rng);
        let pos = self.position.sample(rng);
        Particle::new(pos, dir, group)
    }
}
