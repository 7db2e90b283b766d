//! # Error Types
//!
//! Crate-wide error enum. Every variant belongs to one of four families:
//! configuration errors raised while a problem is assembled, indexing errors
//! raised by the histogram machinery, geometry inconsistencies that make a
//! history physically undefined, and propagated I/O / JSON errors.

use thiserror::Error;

use crate::types::Vec3;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the transport kernel and the estimator subsystem.
#[derive(Debug, Error)]
pub enum Error {
    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------
    /// Invalid binning parameters (empty structure, inverted range, uneven integer width).
    #[error("invalid binning structure: {0}")]
    InvalidBinning(String),

    /// The same particle attribute was given twice to one estimator collection.
    #[error("attribute `{0}` binned more than once in the same estimator collection")]
    DuplicateAttribute(&'static str),

    /// An estimator type was attached to (or scored by) an object that cannot carry it.
    #[error("estimator `{estimator}` of type {kind} cannot be used on a {target}")]
    IncompatibleEstimator {
        estimator: String,
        kind: &'static str,
        target: &'static str,
    },

    /// Surface-current estimators are raw counts and have no geometric normalization.
    #[error("estimator `{0}` is a surface current and takes no geometric divisor")]
    GeometricDivisorNotAllowed(String),

    /// Invalid user or API parameter.
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// An arena id that does not refer to any stored object.
    #[error("unknown {kind} id {id}")]
    UnknownId { kind: &'static str, id: usize },

    // ------------------------------------------------------------------
    // Indexing
    // ------------------------------------------------------------------
    /// Index vector and radix vector have different lengths.
    #[error("dimension mismatch: {indices} indices for {sizes} bin dimensions")]
    DimensionMismatch { indices: usize, sizes: usize },

    /// Flat or per-dimension index past the end of its range.
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Strict binning received a value outside `[min, max)`.
    #[error("value {value} outside strict binning range [{min}, {max})")]
    ValueOutOfRange { value: f64, min: f64, max: f64 },

    // ------------------------------------------------------------------
    // Geometry inconsistency
    // ------------------------------------------------------------------
    /// No cell encloses a point where one is required.
    #[error("no cell encloses position {position}")]
    NoEnclosingCell { position: Vec3 },

    /// A particle inside a cell found no bounding surface ahead of it.
    #[error("no bounding surface intersected from inside cell `{cell}`")]
    NoSurfaceIntersection { cell: String },

    // ------------------------------------------------------------------
    // Propagated
    // ------------------------------------------------------------------
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offender() {
        let e = Error::IncompatibleEstimator {
            estimator: "leakage".into(),
            kind: "Surface Current",
            target: "cell",
        };
        let msg = e.to_string();
        assert!(msg.contains("leakage"));
        assert!(msg.contains("Surface Current"));
        assert!(msg.contains("cell"));
    }

    #[test]
    fn geometry_errors_report_position() {
        let e = Error::NoEnclosingCell {
            position: Vec3::new(1.0, 2.0, 3.0),
        };
        assert!(e.to_string().contains("no cell encloses"));
    }

    #[test]
    fn json_errors_convert() {
        let err = serde_json::from_str::<u64>("not json").unwrap_err();
        let e: Error = err.into();
        assert!(matches!(e, Error::Json(_)));
    }
}
