//! Unstructured tetrahedral mesh overlaid on the cell geometry. Elements
//! carry collision estimators only.

use crate::error::{Error, Result};
use crate::types::{EstimatorId, MeshElementId, Vec3};

/// Signed six-fold volume of the tetrahedron `(a, b, c, d)`, the determinant
/// of the 4x4 matrix with rows `[x y z 1]`.
fn orient(a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> f64 {
    (b - a).dot(&(c - a).cross(&(d - a)))
}

/// Tetrahedral element
#[derive(Debug, Clone, PartialEq)]
pub struct MeshElement {
    pub vertices: [Vec3; 4],
    estimators: Vec<EstimatorId>,
}

impl MeshElement {
    pub fn new(vertices: [Vec3; 4]) -> Result<Self> {
        let [a, b, c, d] = vertices;
        if !vertices.iter().all(Vec3::is_finite) || orient(a, b, c, d).abs() < 1e-300 {
            return Err(Error::InvalidParam("degenerate tetrahedron".into()));
        }
        Ok(Self {
            vertices,
            estimators: Vec::new(),
        })
    }

    pub fn volume(&self) -> f64 {
        let [a, b, c, d] = self.vertices;
        orient(a, b, c, d).abs() / 6.0
    }

    pub fn estimators(&self) -> &[EstimatorId] {
        &self.estimators
    }

    pub(crate) fn push_estimator(&mut self, id: EstimatorId) {
        self.estimators.push(id);
    }

    /// Barycentric containment: `p` is inside when every sub-tetrahedron
    /// formed by swapping `p` for one vertex keeps the element's orientation.
    /// Points on a face count as inside.
    pub fn contains(&self, p: Vec3) -> bool {
        let [a, b, c, d] = self.vertices;
        let d0 = orient(a, b, c, d);
        let tol = -1e-12 * d0.abs();
        [
            orient(p, b, c, d),
            orient(a, p, c, d),
            orient(a, b, p, d),
            orient(a, b, c, p),
        ]
        .iter()
        .all(|di| di * d0.signum() >= tol)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    elements: Vec<MeshElement>,
}

impl Mesh {
    pub fn new(elements: Vec<MeshElement>) -> Self {
        Self { elements }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn element(&self, id: MeshElementId) -> Result<&MeshElement> {
        self.elements.get(id.index()).ok_or(Error::UnknownId {
            kind: MeshElementId::KIND,
            id: id.index(),
        })
    }

    pub fn element_mut(&mut self, id: MeshElementId) -> Result<&mut MeshElement> {
        self.elements.get_mut(id.index()).ok_or(Error::UnknownId {
            kind: MeshElementId::KIND,
            id: id.index(),
        })
    }

    /// First element containing `p`
    pub fn locate(&self, p: Vec3) -> Option<MeshElementId> {
        self.elements
            .iter()
            .position(|e| e.contains(p))
            .map(MeshElementId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_tet() -> Result<MeshElement> {
        MeshElement::new([Vec3::zero(), Vec3::unit_x(), Vec3::unit_y(), Vec3::unit_z()])
    }

    #[test]
    fn test_volume() -> Result<()> {
        assert_relative_eq!(unit_tet()?.volume(), 1.0 / 6.0);
        Ok(())
    }

    #[test]
    fn test_containment() -> Result<()> {
        let t = unit_tet()?;
        assert!(t.contains(Vec3::new(0.1, 0.1, 0.1)));
        assert!(t.contains(Vec3::new(0.0, 0.2, 0.2)));
        assert!(!t.contains(Vec3::new(0.5, 0.5, 0.5)));
        assert!(!t.contains(Vec3::new(-0.1, 0.1, 0.1)));

        // vertex order must not matter
        let flipped = MeshElement::new([Vec3::zero(), Vec3::unit_y(), Vec3::unit_x(), Vec3::unit_z()])?;
        assert!(flipped.contains(Vec3::new(0.1, 0.1, 0.1)));
        assert!(!flipped.contains(Vec3::new(0.5, 0.5, 0.5)));
        Ok(())
    }

    #[test]
    fn test_locate() -> Result<()> {
        let shifted = MeshElement::new([
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(3.0, 0.0, 0.0),
            Vec3::new(2.0, 1.0, 0.0),
            Vec3::new(2.0, 0.0, 1.0),
        ])?;
        let mesh = Mesh::new(vec![unit_tet()?, shifted]);
        assert_eq!(mesh.locate(Vec3::new(0.1, 0.1, 0.1)), Some(MeshElementId(0)));
        assert_eq!(mesh.locate(Vec3::new(2.1, 0.1, 0.1)), Some(MeshElementId(1)));
        assert_eq!(mesh.locate(Vec3::new(5.0, 5.0, 5.0)), None);
        assert!(mesh.element(MeshElementId(2)).is_err());
        Ok(())
    }

    #[test]
    fn test_degenerate_rejected() {
        let flat = MeshElement::new([Vec3::zero(), Vec3::unit_x(), Vec3::unit_y(), Vec3::new(1.0, 1.0, 0.0)]);
        assert!(flat.is_err());
    }
}
