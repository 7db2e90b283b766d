//! Cells: intersections of surface half-spaces filled with a material or void.

use crate::error::{Error, Result};
use crate::random::RandomStream;
use crate::types::{EstimatorId, MaterialId, SurfaceId, Vec3};

use super::{Sense, Surface};

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub name: String,
    /// `None` for void
    pub material: Option<MaterialId>,
    /// Bounding surfaces and the side of each the cell lies on
    pub surfaces: Vec<(SurfaceId, Sense)>,
    estimators: Vec<EstimatorId>,
}

impl Cell {
    pub fn new(
        name: impl Into<String>,
        material: Option<MaterialId>,
        surfaces: Vec<(SurfaceId, Sense)>,
    ) -> Self {
        Self {
            name: name.into(),
            material,
            surfaces,
            estimators: Vec::new(),
        }
    }

    pub fn estimators(&self) -> &[EstimatorId] {
        &self.estimators
    }

    pub(crate) fn push_estimator(&mut self, id: EstimatorId) {
        self.estimators.push(id);
    }

    /// True when `p` is on the required side of every bounding surface.
    ///
    /// `surfaces` is the geometry's surface arena.
    pub fn contains(&self, p: Vec3, surfaces: &[Surface]) -> bool {
        self.surfaces
            .iter()
            .all(|&(id, sense)| surfaces.get(id.index()).is_some_and(|s| s.sense(p) == sense))
    }

    /// Nearest bounding surface ahead of a particle at `pos` moving along `dir`.
    pub fn distance_to_surface(
        &self,
        pos: Vec3,
        dir: Vec3,
        surfaces: &[Surface],
    ) -> Result<(SurfaceId, f64)> {
        self.surfaces
            .iter()
            .filter_map(|&(id, _)| {
                surfaces
                    .get(id.index())
                    .and_then(|s| s.distance(pos, dir))
                    .map(|d| (id, d))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .ok_or_else(|| Error::NoSurfaceIntersection {
                cell: self.name.clone(),
            })
    }

    /// Sampled free-flight distance for total cross section `sigma_t`; infinite in void.
    pub fn distance_to_collision<R: RandomStream + ?Sized>(sigma_t: f64, rng: &mut R) -> f64 {
        if sigma_t <= 0.0 {
            return f64::INFINITY;
        }
        -rng.uniform().max(f64::MIN_POSITIVE).ln() / sigma_t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ReplayStream;
    use approx::assert_relative_eq;

    fn slab() -> Result<(Vec<Surface>, Cell)> {
        let surfaces = vec![
            Surface::plane("x0", 1.0, 0.0, 0.0, 0.0)?,
            Surface::plane("x5", 1.0, 0.0, 0.0, 5.0)?,
        ];
        let cell = Cell::new(
            "slab",
            None,
            vec![(SurfaceId(0), Sense::Positive), (SurfaceId(1), Sense::Negative)],
        );
        Ok((surfaces, cell))
    }

    #[test]
    fn test_contains() -> Result<()> {
        let (surfaces, cell) = slab()?;
        assert!(cell.contains(Vec3::new(2.0, 7.0, -3.0), &surfaces));
        assert!(!cell.contains(Vec3::new(-1.0, 0.0, 0.0), &surfaces));
        assert!(!cell.contains(Vec3::new(6.0, 0.0, 0.0), &surfaces));
        Ok(())
    }

    #[test]
    fn test_nearest_surface() -> Result<()> {
        let (surfaces, cell) = slab()?;
        let (id, d) = cell.distance_to_surface(Vec3::new(1.0, 0.0, 0.0), Vec3::unit_x(), &surfaces)?;
        assert_eq!(id, SurfaceId(1));
        assert_relative_eq!(d, 4.0);
        let (id, d) = cell.distance_to_surface(Vec3::new(1.0, 0.0, 0.0), -Vec3::unit_x(), &surfaces)?;
        assert_eq!(id, SurfaceId(0));
        assert_relative_eq!(d, 1.0);
        Ok(())
    }

    #[test]
    fn test_no_surface_ahead() -> Result<()> {
        let (surfaces, cell) = slab()?;
        let err = cell.distance_to_surface(Vec3::new(1.0, 0.0, 0.0), Vec3::unit_y(), &surfaces);
        assert!(matches!(err, Err(Error::NoSurfaceIntersection { .. })));
        Ok(())
    }

    #[test]
    fn test_distance_to_collision() -> Result<()> {
        let mut rng = ReplayStream::new(vec![(-1.0_f64).exp(), 0.5])?;
        assert_relative_eq!(Cell::distance_to_collision(2.0, &mut rng), 0.5, epsilon = 1e-12);
        assert_relative_eq!(Cell::distance_to_collision(1.0, &mut rng), 2.0_f64.ln(), epsilon = 1e-12);
        assert_eq!(Cell::distance_to_collision(0.0, &mut rng), f64::INFINITY);
        Ok(())
    }
}
