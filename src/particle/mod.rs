//! # Particle Module
//!
//! Multigroup neutral particle state and the LIFO bank that holds a history's
//! live particles. A history starts with one source particle in the bank;
//! reactions push secondaries on top, so the most recent secondary is
//! tracked first.

use std::f64::consts::PI;

use crate::random::RandomStream;
use crate::types::{CellId, Vec3};

/// Below this `u² + v²` the direction is treated as lying on the z axis.
const POLE_TOLERANCE: f64 = 1e-20;

/// Neutral particle tracked through the geometry
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Position (cm)
    pub pos: Vec3,
    /// Direction (unit vector)
    pub dir: Vec3,
    /// Energy group, 1-based
    pub group: usize,
    /// Statistical weight
    pub weight: f64,
    /// Is particle alive?
    pub alive: bool,
    /// Collisions undergone so far
    pub collisions: u64,
    /// Cell currently containing the particle
    pub cell: Option<CellId>,
}

impl Particle {
    pub fn new(pos: Vec3, dir: Vec3, group: usize) -> Self {
        Self {
            pos,
            dir: dir.normalize(),
            group,
            weight: 1.0,
            alive: true,
            collisions: 0,
            cell: None,
        }
    }

    /// Move along the current direction
    pub fn advance(&mut self, distance: f64) {
        self.pos += self.dir * distance;
    }

    pub fn kill(&mut self) {
        self.alive = false;
    }

    /// Rotate the direction by polar cosine `mu` about the current direction,
    /// with a uniformly sampled azimuth.
    pub fn rotate_direction<R: RandomStream + ?Sized>(&mut self, mu: f64, rng: &mut R) {
        let phi = 2.0 * PI * rng.uniform();
        let sin_theta = (1.0 - mu * mu).max(0.0).sqrt();

        let (u, v, w) = (self.dir.x, self.dir.y, self.dir.z);

        let a_sq = u * u + v * v;
        if a_sq > POLE_TOLERANCE {
            let a = a_sq.sqrt();
            self.dir = Vec3::new(
                mu * u + sin_theta * (u * w * phi.cos() - v * phi.sin()) / a,
                mu * v + sin_theta * (v * w * phi.cos() + u * phi.sin()) / a,
                mu * w - sin_theta * phi.cos() * a,
            );
        } else {
            // Along z to working precision
            self.dir = Vec3::new(
                sin_theta * phi.cos(),
                sin_theta * phi.sin(),
                mu * w.signum(),
            );
        }

        self.dir = self.dir.normalize();
    }
}

// ============================================================================
// PARTICLE BANK
// ============================================================================

/// LIFO stack of particles awaiting transport within one history
#[derive(Debug, Default)]
pub struct ParticleBank {
    stack: Vec<Particle>,
}

impl ParticleBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, particle: Particle) {
        self.stack.push(particle);
    }

    pub fn pop(&mut self) -> Option<Particle> {
        self.stack.pop()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}

impl Extend<Particle> for ParticleBank {
    fn extend<I: IntoIterator<Item = Particle>>(&mut self, iter: I) {
        self.stack.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{RandomGenerator, ReplayStream};
    use approx::assert_relative_eq;

    #[test]
    fn test_new_normalizes_and_advance() {
        let mut p = Particle::new(Vec3::zero(), Vec3::new(0.0, 0.0, 2.0), 1);
        assert_eq!(p.dir, Vec3::unit_z());
        p.advance(3.5);
        assert_relative_eq!(p.pos.z, 3.5);
        assert!(p.alive);
        p.kill();
        assert!(!p.alive);
    }

    #[test]
    fn test_rotation_keeps_cosine() {
        let mut rng = RandomGenerator::new(11);
        let mut p = Particle::new(Vec3::zero(), Vec3::new(1.0, 1.0, 0.3), 1);
        for &mu in &[-0.9, -0.2, 0.0, 0.5, 0.99] {
            let before = p.dir;
            p.rotate_direction(mu, &mut rng);
            assert_relative_eq!(p.dir.mag(), 1.0, epsilon = 1e-12);
            assert_relative_eq!(p.dir.dot(&before), mu, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_rotation_close_to_pole_keeps_cosine() -> crate::error::Result<()> {
        let mut rng = ReplayStream::new(vec![0.0, 0.3, 0.7])?;
        let mut p = Particle::new(Vec3::zero(), Vec3::new(0.0447, 0.0, 0.999), 1);
        for &mu in &[0.0, 0.5, -0.8] {
            let before = p.dir;
            p.rotate_direction(mu, &mut rng);
            assert_relative_eq!(p.dir.dot(&before), mu, epsilon = 1e-9);
            // keep the next rotation close to the pole as well
            p.dir = before;
        }
        Ok(())
    }

    #[test]
    fn test_rotation_near_pole() -> crate::error::Result<()> {
        let mut rng = ReplayStream::new(vec![0.25])?;
        let mut p = Particle::new(Vec3::zero(), Vec3::unit_z(), 1);
        p.rotate_direction(0.0, &mut rng);
        assert_relative_eq!(p.dir.z, 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.dir.y, 1.0, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn test_bank_is_lifo() {
        let mut bank = ParticleBank::new();
        bank.push(Particle::new(Vec3::zero(), Vec3::unit_x(), 1));
        bank.extend([
            Particle::new(Vec3::zero(), Vec3::unit_x(), 2),
            Particle::new(Vec3::zero(), Vec3::unit_x(), 3),
        ]);
        assert_eq!(bank.len(), 3);
        assert_eq!(bank.pop().map(|p| p.group), Some(3));
        assert_eq!(bank.pop().map(|p| p.group), Some(2));
        assert_eq!(bank.pop().map(|p| p.group), Some(1));
        assert!(bank.is_empty());
    }
}
