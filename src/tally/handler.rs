//! Event handlers: decide which estimator collections an event scores and
//! with what multiplier. Eligibility comes from
//! [`TypeRules::scores_on`](super::TypeRules::scores_on); handlers only
//! compute multipliers.
//!
//! Each event carries its own geometric context, so scoring is a pure
//! function of `(event, particle, geometry)` plus the tally arena it writes
//! into.
//!
//! | event            | type            | multiplier          |
//! |------------------|-----------------|---------------------|
//! | collision        | Collision       | 1 / Σt(group)       |
//! | collision        | TrackLength     | chord since prior   |
//! | surface crossing | SurfaceCurrent  | 1                   |
//! | surface crossing | SurfaceFluence  | 1 / abs(Ω·n)        |
//! | surface crossing | TrackLength     | chord since prior   |

use crate::error::{Error, Result};
use crate::geometry::Geometry;
use crate::particle::Particle;
use crate::types::{CellId, EstimatorId, MeshElementId, SurfaceId, Vec3};

use super::{AttachKind, EstimatorType, Tallies, TallyEvent};

/// Grazing crossings are capped at this cosine.
pub const MIN_FLUENCE_COSINE: f64 = 1e-10;

/// A geometric event that scores estimators.
pub trait EventHandler {
    fn event(&self) -> TallyEvent;

    /// Multiplier for estimators of `kind`. Only defined for types whose
    /// rules score on [`event`](Self::event).
    fn multiplier(&self, kind: EstimatorType, particle: &Particle, geometry: &Geometry)
        -> Result<f64>;

    /// Score every eligible collection and return how many took a score.
    fn score(&self, particle: &Particle, geometry: &Geometry, tallies: &mut Tallies)
        -> Result<usize>;
}

/// Score the collections attached to one object.
fn score_attached<E: EventHandler + ?Sized>(
    event: &E,
    ids: &[EstimatorId],
    target: AttachKind,
    particle: &Particle,
    geometry: &Geometry,
    tallies: &mut Tallies,
) -> Result<usize> {
    let mut scored = 0;
    for &id in ids {
        let collection = tallies.get_mut(id)?;
        let kind = collection.kind();
        if !kind.can_attach(target) {
            return Err(Error::IncompatibleEstimator {
                estimator: collection.name().to_string(),
                kind: kind.name(),
                target: target.name(),
            });
        }
        if !kind.rules().scores_on(event.event()) {
            continue;
        }
        let m = event.multiplier(kind, particle, geometry)?;
        if collection.score(particle, m)? {
            scored += 1;
        }
    }
    Ok(scored)
}

fn not_scored(kind: EstimatorType, event: TallyEvent) -> Error {
    Error::InvalidParam(format!(
        "{kind} estimators are not scored on a {}",
        event.name()
    ))
}

// ============================================================================
// COLLISION
// ============================================================================

/// A collision inside `cell`, optionally inside a mesh element as well.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEvent {
    pub cell: CellId,
    pub mesh_element: Option<MeshElementId>,
    /// Position of the previous event on this track
    pub prior_position: Vec3,
}

impl EventHandler for CollisionEvent {
    fn event(&self) -> TallyEvent {
        TallyEvent::Collision
    }

    fn multiplier(
        &self,
        kind: EstimatorType,
        particle: &Particle,
        geometry: &Geometry,
    ) -> Result<f64> {
        match kind {
            EstimatorType::Collision => {
                let sigma_t = geometry.macro_xs(self.cell, particle.group)?;
                Ok(if sigma_t > 0.0 { 1.0 / sigma_t } else { 0.0 })
            }
            EstimatorType::TrackLength => Ok(particle.pos.distance(&self.prior_position)),
            EstimatorType::SurfaceCurrent | EstimatorType::SurfaceFluence => {
                Err(not_scored(kind, self.event()))
            }
        }
    }

    fn score(&self, particle: &Particle, geometry: &Geometry, tallies: &mut Tallies) -> Result<usize> {
        let cell = geometry.cell(self.cell)?;
        let mut scored = score_attached(
            self,
            cell.estimators(),
            AttachKind::Cell,
            particle,
            geometry,
            tallies,
        )?;
        if let Some(element) = self.mesh_element {
            scored += score_attached(
                self,
                geometry.mesh_element(element)?.estimators(),
                AttachKind::MeshElement,
                particle,
                geometry,
                tallies,
            )?;
        }
        Ok(scored)
    }
}

// ============================================================================
// SURFACE CROSSING
// ============================================================================

/// A particle crossing `surface` out of `cell_left`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceCrossingEvent {
    pub surface: SurfaceId,
    pub cell_left: CellId,
    /// Position of the previous event on this track
    pub prior_position: Vec3,
}

impl EventHandler for SurfaceCrossingEvent {
    fn event(&self) -> TallyEvent {
        TallyEvent::SurfaceCrossing
    }

    fn multiplier(
        &self,
        kind: EstimatorType,
        particle: &Particle,
        geometry: &Geometry,
    ) -> Result<f64> {
        match kind {
            EstimatorType::SurfaceCurrent => Ok(1.0),
            EstimatorType::SurfaceFluence => {
                let normal = geometry.surface(self.surface)?.normal(particle.pos);
                let cosine = particle.dir.dot(&normal).abs();
                Ok(1.0 / cosine.max(MIN_FLUENCE_COSINE))
            }
            EstimatorType::TrackLength => Ok(particle.pos.distance(&self.prior_position)),
            EstimatorType::Collision => Err(not_scored(kind, self.event())),
        }
    }

    fn score(&self, particle: &Particle, geometry: &Geometry, tallies: &mut Tallies) -> Result<usize> {
        let surface = geometry.surface(self.surface)?;
        let mut scored = score_attached(
            self,
            surface.estimators(),
            AttachKind::Surface,
            particle,
            geometry,
            tallies,
        )?;
        scored += score_attached(
            self,
            geometry.cell(self.cell_left)?.estimators(),
            AttachKind::Cell,
            particle,
            geometry,
            tallies,
        )?;
        Ok(scored)
    }
}
