//! # Tallies
//!
//! Statistical estimators of flux, current and fluence, binned over particle
//! attributes.
//!
//! ## Structure
//!
//! ```text
//! Tallies (arena, EstimatorId)
//!   └── EstimatorCollection      one per tally, fixed EstimatorType
//!         ├── AttributeBinning   one per histogram dimension
//!         └── Estimator[∏ sizes] flat, first dimension fastest
//! ```
//!
//! Geometry objects hold `EstimatorId`s; the event handlers look the
//! collections up here and score them with a type-dependent multiplier.
//!
//! ## Estimator types
//!
//! | type            | attach to           | geometric divisor | scored on            |
//! |-----------------|---------------------|-------------------|----------------------|
//! | SurfaceCurrent  | surface             | forbidden         | surface crossing     |
//! | SurfaceFluence  | surface             | allowed           | surface crossing     |
//! | TrackLength     | cell                | allowed           | collision + crossing |
//! | Collision       | cell, mesh element  | allowed           | collision            |
//!
//! ## References
//!
//! [1] Lux, I., Koblinger, L. "Monte Carlo Particle Transport Methods", CRC Press, 1991
//! [2] X-5 Monte Carlo Team, "MCNP - A General Monte Carlo N-Particle Transport Code", LA-UR-03-1987

pub mod collection;
pub mod estimator;
pub mod handler;
pub mod index;
pub mod report;

pub use collection::EstimatorCollection;
pub use estimator::Estimator;
pub use handler::{CollisionEvent, EventHandler, SurfaceCrossingEvent};
pub use index::{delinearize, linearize};
pub use report::{TallyReport, TallyRow, TallyTable};

use std::fmt;
use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{CellId, EstimatorId, MeshElementId, SurfaceId};

// ============================================================================
// ESTIMATOR TYPES
// ============================================================================

/// Kind of geometric object an estimator collection is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachKind {
    Cell,
    Surface,
    MeshElement,
}

impl AttachKind {
    pub fn name(&self) -> &'static str {
        match self {
            AttachKind::Cell => "cell",
            AttachKind::Surface => "surface",
            AttachKind::MeshElement => "mesh element",
        }
    }
}

/// A concrete attachment point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachTarget {
    Cell(CellId),
    Surface(SurfaceId),
    MeshElement(MeshElementId),
}

impl AttachTarget {
    pub fn kind(&self) -> AttachKind {
        match self {
            AttachTarget::Cell(_) => AttachKind::Cell,
            AttachTarget::Surface(_) => AttachKind::Surface,
            AttachTarget::MeshElement(_) => AttachKind::MeshElement,
        }
    }
}

/// Geometric event that can trigger scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TallyEvent {
    Collision,
    SurfaceCrossing,
}

impl TallyEvent {
    pub fn name(&self) -> &'static str {
        match self {
            TallyEvent::Collision => "collision",
            TallyEvent::SurfaceCrossing => "surface crossing",
        }
    }
}

/// Compatibility row for one estimator type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeRules {
    pub attach_to: &'static [AttachKind],
    pub divisor_allowed: bool,
    pub on_collision: bool,
    pub on_crossing: bool,
}

impl TypeRules {
    /// Whether estimators of this type take a score on `event`.
    pub fn scores_on(&self, event: TallyEvent) -> bool {
        match event {
            TallyEvent::Collision => self.on_collision,
            TallyEvent::SurfaceCrossing => self.on_crossing,
        }
    }
}

/// What an estimator collection measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EstimatorType {
    SurfaceCurrent,
    SurfaceFluence,
    TrackLength,
    Collision,
}

impl EstimatorType {
    pub const ALL: [EstimatorType; 4] = [
        EstimatorType::SurfaceCurrent,
        EstimatorType::SurfaceFluence,
        EstimatorType::TrackLength,
        EstimatorType::Collision,
    ];

    pub fn rules(&self) -> &'static TypeRules {
        const SURFACE_CURRENT: TypeRules = TypeRules {
            attach_to: &[AttachKind::Surface],
            divisor_allowed: false,
            on_collision: false,
            on_crossing: true,
        };
        const SURFACE_FLUENCE: TypeRules = TypeRules {
            attach_to: &[AttachKind::Surface],
            divisor_allowed: true,
            on_collision: false,
            on_crossing: true,
        };
        const TRACK_LENGTH: TypeRules = TypeRules {
            attach_to: &[AttachKind::Cell],
            divisor_allowed: true,
            on_collision: true,
            on_crossing: true,
        };
        const COLLISION: TypeRules = TypeRules {
            attach_to: &[AttachKind::Cell, AttachKind::MeshElement],
            divisor_allowed: true,
            on_collision: true,
            on_crossing: false,
        };
        match self {
            EstimatorType::SurfaceCurrent => &SURFACE_CURRENT,
            EstimatorType::SurfaceFluence => &SURFACE_FLUENCE,
            EstimatorType::TrackLength => &TRACK_LENGTH,
            EstimatorType::Collision => &COLLISION,
        }
    }

    pub fn can_attach(&self, kind: AttachKind) -> bool {
        self.rules().attach_to.contains(&kind)
    }

    pub fn name(&self) -> &'static str {
        match self {
            EstimatorType::SurfaceCurrent => "Surface Current",
            EstimatorType::SurfaceFluence => "Surface Fluence",
            EstimatorType::TrackLength => "Track Length",
            EstimatorType::Collision => "Collision",
        }
    }
}

impl fmt::Display for EstimatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// TALLY ARENA
// ============================================================================

/// Owner of every estimator collection in a problem
#[derive(Debug, Default)]
pub struct Tallies {
    collections: Vec<EstimatorCollection>,
}

impl Tallies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, collection: EstimatorCollection) -> EstimatorId {
        self.collections.push(collection);
        EstimatorId(self.collections.len() - 1)
    }

    pub fn get(&self, id: EstimatorId) -> Result<&EstimatorCollection> {
        self.collections.get(id.index()).ok_or(Error::UnknownId {
            kind: EstimatorId::KIND,
            id: id.index(),
        })
    }

    pub fn get_mut(&mut self, id: EstimatorId) -> Result<&mut EstimatorCollection> {
        self.collections.get_mut(id.index()).ok_or(Error::UnknownId {
            kind: EstimatorId::KIND,
            id: id.index(),
        })
    }

    /// Look a collection up by name
    pub fn find(&self, name: &str) -> Option<(EstimatorId, &EstimatorCollection)> {
        self.collections
            .iter()
            .enumerate()
            .find(|(_, c)| c.name() == name)
            .map(|(i, c)| (EstimatorId(i), c))
    }

    pub fn iter(&self) -> impl Iterator<Item = (EstimatorId, &EstimatorCollection)> {
        self.collections
            .iter()
            .enumerate()
            .map(|(i, c)| (EstimatorId(i), c))
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    /// Commit the in-flight history in every collection.
    pub fn end_history(&mut self) {
        for c in &mut self.collections {
            c.end_history();
        }
    }

    pub fn reports(&self) -> Result<Vec<TallyReport>> {
        self.collections.iter().map(|c| c.report()).collect()
    }

    /// Every report as one pretty-printed JSON array.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.reports()?)?)
    }

    pub fn write_reports<W: Write>(&self, out: &mut W) -> Result<()> {
        for c in &self.collections {
            c.write_report(out)?;
            writeln!(out)?;
        }
        Ok(())
    }
}
