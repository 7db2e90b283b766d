//! # Geometry Module
//!
//! Constructive solid geometry for transport: surfaces, cells bounded by
//! surface half-spaces, materials, an optional tetrahedral mesh overlay and
//! the source. Objects live in arenas inside [`Geometry`] and refer to each
//! other through stable ids.
//!
//! [`Problem`] pairs a geometry with its tally arena and enforces which
//! estimator types may be attached where.

pub mod cell;
pub mod mesh;
pub mod surface;

pub use cell::Cell;
pub use mesh::{Mesh, MeshElement};
pub use surface::{Sense, Surface, SurfaceShape};

use tracing::debug;

use crate::error::{Error, Result};
use crate::particle::Particle;
use crate::physics::Material;
use crate::random::RandomStream;
use crate::source::Source;
use crate::tally::{AttachTarget, Tallies};
use crate::types::{CellId, EstimatorId, MaterialId, MeshElementId, SurfaceId, Vec3};

// ============================================================================
// GEOMETRY ARENA
// ============================================================================

#[derive(Debug, Default)]
pub struct Geometry {
    surfaces: Vec<Surface>,
    materials: Vec<Material>,
    cells: Vec<Cell>,
    mesh: Option<Mesh>,
    source: Option<Source>,
}

impl Geometry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_surface(&mut self, surface: Surface) -> SurfaceId {
        self.surfaces.push(surface);
        SurfaceId(self.surfaces.len() - 1)
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    /// Add a cell after checking its surface and material ids.
    pub fn add_cell(&mut self, cell: Cell) -> Result<CellId> {
        for &(id, _) in &cell.surfaces {
            self.surface(id)?;
        }
        if let Some(m) = cell.material {
            self.material(m)?;
        }
        if cell.surfaces.is_empty() {
            return Err(Error::InvalidParam(format!(
                "cell `{}` has no bounding surfaces",
                cell.name
            )));
        }
        self.cells.push(cell);
        Ok(CellId(self.cells.len() - 1))
    }

    pub fn set_mesh(&mut self, mesh: Mesh) {
        self.mesh = Some(mesh);
    }

    pub fn set_source(&mut self, source: Source) {
        self.source = Some(source);
    }

    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn mesh(&self) -> Option<&Mesh> {
        self.mesh.as_ref()
    }

    pub fn source(&self) -> Option<&Source> {
        self.source.as_ref()
    }

    pub fn surface(&self, id: SurfaceId) -> Result<&Surface> {
        self.surfaces.get(id.index()).ok_or(Error::UnknownId {
            kind: SurfaceId::KIND,
            id: id.index(),
        })
    }

    pub fn surface_mut(&mut self, id: SurfaceId) -> Result<&mut Surface> {
        self.surfaces.get_mut(id.index()).ok_or(Error::UnknownId {
            kind: SurfaceId::KIND,
            id: id.index(),
        })
    }

    pub fn cell(&self, id: CellId) -> Result<&Cell> {
        self.cells.get(id.index()).ok_or(Error::UnknownId {
            kind: CellId::KIND,
            id: id.index(),
        })
    }

    pub fn cell_mut(&mut self, id: CellId) -> Result<&mut Cell> {
        self.cells.get_mut(id.index()).ok_or(Error::UnknownId {
            kind: CellId::KIND,
            id: id.index(),
        })
    }

    pub fn material(&self, id: MaterialId) -> Result<&Material> {
        self.materials.get(id.index()).ok_or(Error::UnknownId {
            kind: MaterialId::KIND,
            id: id.index(),
        })
    }

    pub fn mesh_element(&self, id: MeshElementId) -> Result<&MeshElement> {
        self.mesh
            .as_ref()
            .ok_or(Error::UnknownId {
                kind: MeshElementId::KIND,
                id: id.index(),
            })?
            .element(id)
    }

    fn mesh_element_mut(&mut self, id: MeshElementId) -> Result<&mut MeshElement> {
        self.mesh
            .as_mut()
            .ok_or(Error::UnknownId {
                kind: MeshElementId::KIND,
                id: id.index(),
            })?
            .element_mut(id)
    }

    /// Material filling `cell`, `None` for void
    pub fn cell_material(&self, cell: CellId) -> Result<Option<&Material>> {
        self.cell(cell)?.material.map(|m| self.material(m)).transpose()
    }

    /// Cell containing `p`
    pub fn where_am_i(&self, p: Vec3) -> Option<CellId> {
        self.cells
            .iter()
            .position(|c| c.contains(p, &self.surfaces))
            .map(CellId)
    }

    /// Mesh element containing `p`, if a mesh is loaded
    pub fn locate_element(&self, p: Vec3) -> Option<MeshElementId> {
        self.mesh.as_ref().and_then(|m| m.locate(p))
    }

    /// Macroscopic total cross section in `cell` for `group`; zero in void.
    pub fn macro_xs(&self, cell: CellId, group: usize) -> Result<f64> {
        match self.cell_material(cell)? {
            Some(m) => m.macro_xs(group),
            None => Ok(0.0),
        }
    }

    /// Nearest bounding surface of `cell` ahead of the particle.
    pub fn distance_to_surface(&self, cell: CellId, particle: &Particle) -> Result<(SurfaceId, f64)> {
        self.cell(cell)?
            .distance_to_surface(particle.pos, particle.dir, &self.surfaces)
    }

    /// Sample a source particle and locate its starting cell.
    pub fn sample_source<R: RandomStream + ?Sized>(&self, rng: &mut R) -> Result<Particle> {
        let source = self
            .source
            .as_ref()
            .ok_or_else(|| Error::InvalidParam("geometry has no source".into()))?;
        let mut particle = source.sample(rng);
        particle.cell = Some(
            self.where_am_i(particle.pos)
                .ok_or(Error::NoEnclosingCell { position: particle.pos })?,
        );
        Ok(particle)
    }
}

// ============================================================================
// PROBLEM
// ============================================================================

/// A geometry together with the tallies attached to it
#[derive(Debug, Default)]
pub struct Problem {
    pub geometry: Geometry,
    pub tallies: Tallies,
}

impl Problem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an estimator collection to a geometric object, enforcing the
    /// estimator type's attach targets.
    pub fn attach(&mut self, target: AttachTarget, id: EstimatorId) -> Result<()> {
        let collection = self.tallies.get(id)?;
        let kind = collection.kind();
        if !kind.can_attach(target.kind()) {
            return Err(Error::IncompatibleEstimator {
                estimator: collection.name().to_string(),
                kind: kind.name(),
                target: target.kind().name(),
            });
        }
        debug!(estimator = %collection.name(), target = ?target, "attached estimator");
        match target {
            AttachTarget::Cell(c) => self.geometry.cell_mut(c)?.push_estimator(id),
            AttachTarget::Surface(s) => self.geometry.surface_mut(s)?.push_estimator(id),
            AttachTarget::MeshElement(e) => self.geometry.mesh_element_mut(e)?.push_estimator(id),
        }
        Ok(())
    }

    /// Add a collection and attach it in one step.
    pub fn add_tally(
        &mut self,
        collection: crate::tally::EstimatorCollection,
        target: AttachTarget,
    ) -> Result<EstimatorId> {
        let id = self.tallies.add(collection);
        self.attach(target, id)?;
        Ok(id)
    }
}
