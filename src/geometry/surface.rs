//! Surface primitives: implicit functions `f(p) = 0` with ray intersection
//! and outward normals.

use crate::error::{Error, Result};
use crate::types::{EstimatorId, Vec3};

/// Intersections closer than this are treated as the point we start from.
const MIN_DISTANCE: f64 = 1e-12;

/// Side of a surface: `f(p) < 0` is negative, otherwise positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Negative,
    Positive,
}

impl Sense {
    pub fn of(value: f64) -> Self {
        if value < 0.0 {
            Sense::Negative
        } else {
            Sense::Positive
        }
    }
}

/// Surface primitive
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceShape {
    /// Plane: ax + by + cz = d
    Plane { a: f64, b: f64, c: f64, d: f64 },
    /// Sphere: |p - center|² = R²
    Sphere { center: Vec3, radius: f64 },
    /// Infinite cylinder about the line through `center` along unit `axis`
    Cylinder { center: Vec3, axis: Vec3, radius: f64 },
}

/// Named surface with the estimators scored when particles cross it
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pub name: String,
    pub shape: SurfaceShape,
    estimators: Vec<EstimatorId>,
}

fn positive(what: &str, v: f64) -> Result<()> {
    if !(v.is_finite() && v > 0.0) {
        return Err(Error::InvalidParam(format!("{what} must be finite and positive, got {v}")));
    }
    Ok(())
}

impl Surface {
    pub fn new(name: impl Into<String>, shape: SurfaceShape) -> Self {
        Self {
            name: name.into(),
            shape,
            estimators: Vec::new(),
        }
    }

    pub fn plane(name: impl Into<String>, a: f64, b: f64, c: f64, d: f64) -> Result<Self> {
        let n = Vec3::new(a, b, c);
        if !n.is_finite() || n.mag() < 1e-12 || !d.is_finite() {
            return Err(Error::InvalidParam("plane needs a finite non-zero normal".into()));
        }
        Ok(Self::new(name, SurfaceShape::Plane { a, b, c, d }))
    }

    pub fn sphere(name: impl Into<String>, center: Vec3, radius: f64) -> Result<Self> {
        positive("sphere radius", radius)?;
        Ok(Self::new(name, SurfaceShape::Sphere { center, radius }))
    }

    pub fn cylinder(name: impl Into<String>, center: Vec3, axis: Vec3, radius: f64) -> Result<Self> {
        positive("cylinder radius", radius)?;
        if !axis.is_finite() || axis.mag() < 1e-12 {
            return Err(Error::InvalidParam("cylinder needs a non-zero axis".into()));
        }
        Ok(Self::new(
            name,
            SurfaceShape::Cylinder {
                center,
                axis: axis.normalize(),
                radius,
            },
        ))
    }

    pub fn estimators(&self) -> &[EstimatorId] {
        &self.estimators
    }

    pub(crate) fn push_estimator(&mut self, id: EstimatorId) {
        self.estimators.push(id);
    }

    /// Signed surface function at `p`
    pub fn eval(&self, p: Vec3) -> f64 {
        match self.shape {
            SurfaceShape::Plane { a, b, c, d } => a * p.x + b * p.y + c * p.z - d,
            SurfaceShape::Sphere { center, radius } => (p - center).mag_squared() - radius * radius,
            SurfaceShape::Cylinder { center, axis, radius } => {
                let w = p - center;
                let perp = w - axis * w.dot(&axis);
                perp.mag_squared() - radius * radius
            }
        }
    }

    pub fn sense(&self, p: Vec3) -> Sense {
        Sense::of(self.eval(p))
    }

    /// Distance along `dir` to the nearest intersection ahead of `pos`.
    pub fn distance(&self, pos: Vec3, dir: Vec3) -> Option<f64> {
        match self.shape {
            SurfaceShape::Plane { a, b, c, d } => {
                let n = Vec3::new(a, b, c);
                let denom = n.dot(&dir);
                if denom.abs() < 1e-15 {
                    return None;
                }
                let t = (d - n.dot(&pos)) / denom;
                (t > MIN_DISTANCE).then_some(t)
            }
            SurfaceShape::Sphere { center, radius } => {
                let w = pos - center;
                solve_quadratic(dir.mag_squared(), 2.0 * w.dot(&dir), w.mag_squared() - radius * radius)
            }
            SurfaceShape::Cylinder { center, axis, radius } => {
                let w = pos - center;
                let wp = w - axis * w.dot(&axis);
                let dp = dir - axis * dir.dot(&axis);
                solve_quadratic(dp.mag_squared(), 2.0 * wp.dot(&dp), wp.mag_squared() - radius * radius)
            }
        }
    }

    /// Unit normal (normalized gradient) at `p`, pointing to the positive side.
    pub fn normal(&self, p: Vec3) -> Vec3 {
        match self.shape {
            SurfaceShape::Plane { a, b, c, .. } => Vec3::new(a, b, c).normalize(),
            SurfaceShape::Sphere { center, .. } => (p - center).normalize(),
            SurfaceShape::Cylinder { center, axis, .. } => {
                let w = p - center;
                (w - axis * w.dot(&axis)).normalize()
            }
        }
    }
}

/// Smallest root of `a t² + b t + c` beyond [`MIN_DISTANCE`].
fn solve_quadratic(a: f64, b: f64, c: f64) -> Option<f64> {
    if a.abs() < 1e-15 {
        // Ray parallel to the generator
        return None;
    }

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrt_d = discriminant.sqrt();
    let t1 = (-b - sqrt_d) / (2.0 * a);
    let t2 = (-b + sqrt_d) / (2.0 * a);

    if t1 > MIN_DISTANCE {
        Some(t1)
    } else if t2 > MIN_DISTANCE {
        Some(t2)
    } else {
        None
    }
}
