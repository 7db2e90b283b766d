//! # Monte Carlo Transport Module
//!
//! History-based multigroup transport of neutral particles through a
//! [`Problem`].
//!
//! ## Theory
//!
//! Each flight races two distances from the particle's position:
//!
//! ```text
//! d_coll = -ln(ξ) / Σt(cell, g)         (infinite in void)
//! d_surf = nearest bounding-surface intersection of the current cell
//! ```
//!
//! If `d_surf > d_coll` the particle collides: it moves `d_coll`, collision
//! and track-length estimators score, and a nuclide and reaction are sampled.
//! Otherwise it moves `d_surf` plus a small bump across the surface, surface
//! and track-length estimators score, and the particle is relocated; finding
//! no cell means it leaked.
//!
//! ## History
//!
//! ```text
//! source ─▶ bank ─▶ pop ─▶ track to death ─┐
//!             ▲                            │
//!             └──── secondaries ◀──────────┘
//! bank empty ─▶ tallies.end_history()
//! ```
//!
//! ## References
//!
//! [1] Lux, I., Koblinger, L. "Monte Carlo Particle Transport Methods", CRC Press, 1991

use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::config::{CollisionPolicy, RunSettings};
use crate::error::{Error, Result};
use crate::geometry::{Cell, Problem};
use crate::particle::{Particle, ParticleBank};
use crate::physics::CollisionOutcome;
use crate::random::{RandomGenerator, RandomStream};
use crate::tally::{CollisionEvent, EventHandler, SurfaceCrossingEvent};

/// Event counters for a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransportStats {
    pub histories: u64,
    pub particles_tracked: u64,
    pub collisions: u64,
    pub captures: u64,
    pub scatters: u64,
    pub fissions: u64,
    pub secondaries_banked: u64,
    pub surface_crossings: u64,
    pub leaks: u64,
    pub collision_cutoffs: u64,
}

/// Transport driver owning the problem for the duration of a run
#[derive(Debug)]
pub struct Transport {
    problem: Problem,
    settings: RunSettings,
    stats: TransportStats,
}

impl Transport {
    /// Every tally must be normalized to the run's history count.
    pub fn new(problem: Problem, settings: RunSettings) -> Result<Self> {
        settings.validate()?;
        if let Some((_, c)) = problem
            .tallies
            .iter()
            .find(|(_, c)| c.num_histories() != settings.num_histories)
        {
            return Err(Error::InvalidParam(format!(
                "estimator `{}` expects {} histories, run has {}",
                c.name(),
                c.num_histories(),
                settings.num_histories
            )));
        }
        Ok(Self {
            problem,
            settings,
            stats: TransportStats::default(),
        })
    }

    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    pub fn into_problem(self) -> Problem {
        self.problem
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    pub fn stats(&self) -> &TransportStats {
        &self.stats
    }

    /// Run with the production generator seeded from the settings.
    pub fn run_seeded(&mut self) -> Result<TransportStats> {
        let mut rng = RandomGenerator::new(self.settings.seed);
        self.run(&mut rng)
    }

    /// Run every history, drawing variates from `rng`.
    pub fn run<R: RandomStream + ?Sized>(&mut self, rng: &mut R) -> Result<TransportStats> {
        if self.stats.histories > 0 {
            return Err(Error::InvalidParam("transport has already been run".into()));
        }
        info!(
            histories = self.settings.num_histories,
            cells = self.problem.geometry.cells().len(),
            tallies = self.problem.tallies.len(),
            "starting transport"
        );

        let mut bank = ParticleBank::new();
        for history in 0..self.settings.num_histories {
            rng.begin_history(history);
            let source = self.problem.geometry.sample_source(rng)?;
            bank.push(source);

            let collisions_before = self.stats.collisions;
            while let Some(mut particle) = bank.pop() {
                self.stats.particles_tracked += 1;
                self.track(&mut particle, &mut bank, rng)?;
            }
            self.problem.tallies.end_history();
            self.stats.histories += 1;
            debug!(
                history,
                collisions = self.stats.collisions - collisions_before,
                "history complete"
            );
        }

        info!(
            histories = self.stats.histories,
            particles = self.stats.particles_tracked,
            collisions = self.stats.collisions,
            leaks = self.stats.leaks,
            "transport finished"
        );
        Ok(self.stats.clone())
    }

    /// Follow one particle until it dies.
    fn track<R: RandomStream + ?Sized>(
        &mut self,
        particle: &mut Particle,
        bank: &mut ParticleBank,
        rng: &mut R,
    ) -> Result<()> {
        let Problem { geometry, tallies } = &mut self.problem;

        while particle.alive {
            let cell_id = particle
                .cell
                .ok_or(Error::NoEnclosingCell { position: particle.pos })?;
            let sigma_t = geometry.macro_xs(cell_id, particle.group)?;
            let d_coll = Cell::distance_to_collision(sigma_t, rng);
            let (surface, d_surf) = geometry.distance_to_surface(cell_id, particle)?;
            let prior = particle.pos;
            trace!(cell = %cell_id, d_coll, d_surf, group = particle.group, "flight");

            if d_surf > d_coll {
                particle.advance(d_coll);
                let event = CollisionEvent {
                    cell: cell_id,
                    mesh_element: geometry.locate_element(particle.pos),
                    prior_position: prior,
                };
                event.score(particle, geometry, tallies)?;
                particle.collisions += 1;
                self.stats.collisions += 1;

                let material = geometry
                    .cell_material(cell_id)?
                    .ok_or_else(|| Error::InvalidParam("collision in a void cell".into()))?;
                match material.sample_collision(particle, bank, rng)? {
                    CollisionOutcome::Captured => self.stats.captures += 1,
                    CollisionOutcome::Scattered => self.stats.scatters += 1,
                    CollisionOutcome::Fissioned { secondaries } => {
                        self.stats.fissions += 1;
                        self.stats.secondaries_banked += secondaries as u64;
                    }
                }

                if self.settings.collision_policy == CollisionPolicy::TerminateAfterCollision {
                    particle.kill();
                }
                if particle.alive && particle.collisions >= self.settings.max_collisions_per_particle {
                    warn!(
                        collisions = particle.collisions,
                        position = %particle.pos,
                        "particle hit the collision cutoff"
                    );
                    self.stats.collision_cutoffs += 1;
                    particle.kill();
                }
            } else {
                particle.advance(d_surf + self.settings.surface_bump);
                let event = SurfaceCrossingEvent {
                    surface,
                    cell_left: cell_id,
                    prior_position: prior,
                };
                event.score(particle, geometry, tallies)?;
                self.stats.surface_crossings += 1;

                match geometry.where_am_i(particle.pos) {
                    Some(next) => particle.cell = Some(next),
                    None => {
                        self.stats.leaks += 1;
                        particle.kill();
                    }
                }
            }
        }
        Ok(())
    }

    /// Human-readable run summary with the first bin of every tally
    pub fn summary(&self) -> String {
        let mut s = String::new();
        s.push_str("=== Monte Carlo Transport Summary ===\n");
        s.push_str(&format!("Histories run: {}\n", self.stats.histories));
        s.push_str(&format!("Particles tracked: {}\n", self.stats.particles_tracked));
        s.push_str(&format!("Total collisions: {}\n", self.stats.collisions));
        s.push_str(&format!("Captures: {}\n", self.stats.captures));
        s.push_str(&format!("Scatters: {}\n", self.stats.scatters));
        s.push_str(&format!(
            "Fissions: {} ({} secondaries)\n",
            self.stats.fissions, self.stats.secondaries_banked
        ));
        s.push_str(&format!("Surface crossings: {}\n", self.stats.surface_crossings));
        s.push_str(&format!("Leaks: {}\n", self.stats.leaks));
        s.push_str(&format!("Collision cutoffs: {}\n", self.stats.collision_cutoffs));

        s.push_str("\n--- Tallies ---\n");
        for (_, tally) in self.problem.tallies.iter() {
            let mean = tally.check_estimator(0).unwrap_or(0.0);
            let err = tally.check_uncertainty(0).unwrap_or(0.0);
            s.push_str(&format!(
                "{} [{}]: {:.4e} ± {:.4e}\n",
                tally.name(),
                tally.kind(),
                mean,
                err
            ));
        }

        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binning::AttributeBinning;
    use crate::geometry::{Sense, Surface};
    use crate::physics::{Material, Nuclide, Reaction};
    use crate::random::ReplayStream;
    use crate::source::Source;
    use crate::tally::{AttachTarget, EstimatorCollection, EstimatorType};
    use crate::types::Vec3;
    use approx::assert_relative_eq;
    use std::sync::Arc;

    fn settings(n: u64) -> RunSettings {
        RunSettings {
            num_histories: n,
            ..RunSettings::default()
        }
    }

    /// One-group sphere of radius `r` with the given reactions, point source at the center.
    fn sphere_problem(r: f64, reactions: Vec<Reaction>, density: f64) -> Result<Problem> {
        let mut problem = Problem::new();
        let g = &mut problem.geometry;
        let s = g.add_surface(Surface::sphere("boundary", Vec3::zero(), r)?);
        let n = Arc::new(Nuclide::new("n", 1, reactions)?);
        let m = g.add_material(Material::new("m", density, vec![(n, 1.0)])?);
        g.add_cell(crate::geometry::Cell::new("ball", Some(m), vec![(s, Sense::Negative)]))?;
        g.set_source(Source::point("src", Vec3::zero(), 1)?);
        Ok(problem)
    }

    #[test]
    fn test_history_mismatch_rejected() -> Result<()> {
        let mut problem = sphere_problem(1.0, vec![Reaction::capture(vec![1.0])?], 1.0)?;
        problem.tallies.add(EstimatorCollection::new(
            "c",
            EstimatorType::Collision,
            vec![AttributeBinning::group_all(1)?],
            5,
        )?);
        assert!(Transport::new(problem, settings(10)).is_err());
        Ok(())
    }

    #[test]
    fn test_replayed_capture_history() -> Result<()> {
        // Σt = 2: ξ = e^-1 gives d_coll = 0.5 inside a radius-10 sphere
        let mut problem = sphere_problem(10.0, vec![Reaction::capture(vec![1.0])?], 2.0)?;
        let coll = problem.add_tally(
            EstimatorCollection::new("c", EstimatorType::Collision, vec![AttributeBinning::group_all(1)?], 1)?,
            AttachTarget::Cell(crate::types::CellId(0)),
        )?;
        let track = problem.add_tally(
            EstimatorCollection::new("t", EstimatorType::TrackLength, vec![AttributeBinning::group_all(1)?], 1)?,
            AttachTarget::Cell(crate::types::CellId(0)),
        )?;

        // mu, phi for the source direction, the flight, then nuclide and reaction picks
        let mut rng = ReplayStream::new(vec![0.5, 0.25, (-1.0_f64).exp(), 0.5])?;
        let mut t = Transport::new(problem, settings(1))?;
        let stats = t.run(&mut rng)?;

        assert_eq!(stats.collisions, 1);
        assert_eq!(stats.captures, 1);
        assert_eq!(stats.leaks, 0);
        let tallies = &t.problem().tallies;
        assert_relative_eq!(tallies.get(coll)?.check_estimator(0)?, 0.5, epsilon = 1e-12);
        assert_relative_eq!(tallies.get(track)?.check_estimator(0)?, 0.5, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn test_terminate_after_collision_policy() -> Result<()> {
        let problem = sphere_problem(1000.0, vec![Reaction::scatter(vec![vec![1.0]])?], 1.0)?;
        let mut t = Transport::new(
            problem,
            RunSettings {
                num_histories: 50,
                collision_policy: CollisionPolicy::TerminateAfterCollision,
                ..RunSettings::default()
            },
        )?;
        let stats = t.run_seeded()?;
        assert_eq!(stats.collisions, 50);
        assert_eq!(stats.scatters, 50);
        assert_eq!(stats.leaks, 0);
        Ok(())
    }

    #[test]
    fn test_collision_cutoff() -> Result<()> {
        // pure scatterer far larger than the mean free path
        let problem = sphere_problem(1.0e6, vec![Reaction::scatter(vec![vec![1.0]])?], 1.0)?;
        let mut t = Transport::new(
            problem,
            RunSettings {
                num_histories: 3,
                max_collisions_per_particle: 7,
                ..RunSettings::default()
            },
        )?;
        let stats = t.run_seeded()?;
        assert_eq!(stats.collision_cutoffs, 3);
        assert_eq!(stats.collisions, 21);
        Ok(())
    }

    #[test]
    fn test_fission_secondaries_are_tracked() -> Result<()> {
        // every collision is fission with exactly two neutrons born in a thin sphere
        let problem = sphere_problem(
            0.01,
            vec![Reaction::fission(vec![1.0], vec![2.0], vec![1.0])?],
            1.0,
        )?;
        let mut t = Transport::new(problem, settings(200))?;
        let stats = t.run_seeded()?;
        assert_eq!(stats.secondaries_banked, 2 * stats.fissions);
        assert_eq!(stats.particles_tracked, 200 + stats.secondaries_banked);
        assert_eq!(stats.leaks + stats.fissions, stats.particles_tracked);
        Ok(())
    }

    #[test]
    fn test_second_run_rejected() -> Result<()> {
        let problem = sphere_problem(1.0, vec![Reaction::capture(vec![1.0])?], 1.0)?;
        let mut t = Transport::new(problem, settings(2))?;
        t.run_seeded()?;
        assert!(t.run_seeded().is_err());
        assert!(t.summary().contains("Histories run: 2"));
        Ok(())
    }

    #[test]
    fn test_source_outside_geometry_aborts() -> Result<()> {
        let mut problem = sphere_problem(1.0, vec![Reaction::capture(vec![1.0])?], 1.0)?;
        problem
            .geometry
            .set_source(Source::point("outside", Vec3::new(5.0, 0.0, 0.0), 1)?);
        let mut t = Transport::new(problem, settings(1))?;
        assert!(matches!(t.run_seeded(), Err(Error::NoEnclosingCell { .. })));
        Ok(())
    }
}
