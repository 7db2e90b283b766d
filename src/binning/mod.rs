//! # Binning Structures
//!
//! Equal-width partitions of a scalar domain with O(1) index lookup, and the
//! particle-attribute wrappers that feed estimator histograms.
//!
//! A structure over `[min, max)` with `size` bins maps a value to
//!
//! ```text
//! k = floor(size * (v - min) / (max - min))      for min <= v < max
//! ```
//!
//! Bins are half-open, so `v == max` is out of range. Out-of-range values map
//! to `None` by default, or to [`Error::ValueOutOfRange`] for strict structures.
//!
//! Integer domains additionally require the domain width to split evenly into
//! `size` bins, so every bin covers the same number of integers.

pub mod attribute;

pub use attribute::{Attribute, AttributeBinning};

use std::fmt;

use crate::error::{Error, Result};

// ============================================================================
// DOMAINS
// ============================================================================

/// Scalar types a [`BinningStructure`] can partition.
pub trait BinValue: Copy + PartialOrd + fmt::Debug + fmt::Display {
    /// Reject parameters that do not describe `size` equal bins.
    fn check_domain(min: Self, max: Self, size: usize) -> Result<()>;

    /// Bin of `value`, which the caller has checked lies in `[min, max)`.
    fn bin_of(min: Self, max: Self, size: usize, value: Self) -> usize;

    /// Lower edge of bin `k`.
    fn edge(min: Self, max: Self, size: usize, k: usize) -> Self;

    fn to_f64(self) -> f64;
}

impl BinValue for i64 {
    fn check_domain(min: i64, max: i64, size: usize) -> Result<()> {
        if max <= min {
            return Err(Error::InvalidBinning(format!(
                "max ({max}) must exceed min ({min})"
            )));
        }
        let width = max.abs_diff(min);
        if size as u64 > width {
            return Err(Error::InvalidBinning(format!(
                "{size} integer bins cannot cover a domain of width {width}"
            )));
        }
        if width % size as u64 != 0 {
            return Err(Error::InvalidBinning(format!(
                "integer domain width {width} is not divisible by {size} bins"
            )));
        }
        Ok(())
    }

    fn bin_of(min: i64, max: i64, size: usize, value: i64) -> usize {
        let per_bin = max.abs_diff(min) / size as u64;
        (value.abs_diff(min) / per_bin) as usize
    }

    fn edge(min: i64, max: i64, size: usize, k: usize) -> i64 {
        let per_bin = (max.abs_diff(min) / size as u64) as i128;
        (min as i128 + per_bin * k as i128) as i64
    }

    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl BinValue for f64 {
    fn check_domain(min: f64, max: f64, _size: usize) -> Result<()> {
        if !(min.is_finite() && max.is_finite()) {
            return Err(Error::InvalidBinning(format!(
                "bounds must be finite, got [{min}, {max})"
            )));
        }
        if max <= min {
            return Err(Error::InvalidBinning(format!(
                "max ({max}) must exceed min ({min})"
            )));
        }
        Ok(())
    }

    fn bin_of(min: f64, max: f64, size: usize, value: f64) -> usize {
        let k = (size as f64 * (value - min) / (max - min)).floor() as usize;
        // round-off just below max can land on `size`
        k.min(size - 1)
    }

    fn edge(min: f64, max: f64, size: usize, k: usize) -> f64 {
        min + (max - min) * k as f64 / size as f64
    }

    fn to_f64(self) -> f64 {
        self
    }
}

// ============================================================================
// BINNING STRUCTURE
// ============================================================================

/// Immutable partition of `[min, max)` into `size` equal-width bins.
#[derive(Debug, Clone, PartialEq)]
pub struct BinningStructure<T: BinValue> {
    min: T,
    max: T,
    size: usize,
    strict: bool,
}

impl<T: BinValue> BinningStructure<T> {
    /// Non-strict structure: out-of-range values map to `None`.
    pub fn new(min: T, max: T, size: usize) -> Result<Self> {
        if size == 0 {
            return Err(Error::InvalidBinning("size must be at least 1".into()));
        }
        T::check_domain(min, max, size)?;
        Ok(Self {
            min,
            max,
            size,
            strict: false,
        })
    }

    /// Strict structure: out-of-range values are an error.
    pub fn new_strict(min: T, max: T, size: usize) -> Result<Self> {
        Ok(Self {
            strict: true,
            ..Self::new(min, max, size)?
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn min(&self) -> T {
        self.min
    }

    pub fn max(&self) -> T {
        self.max
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn bin_width(&self) -> f64 {
        (self.max.to_f64() - self.min.to_f64()) / self.size as f64
    }

    /// Zero-based bin holding `value`.
    pub fn index(&self, value: T) -> Result<Option<usize>> {
        if value >= self.min && value < self.max {
            return Ok(Some(T::bin_of(self.min, self.max, self.size, value)));
        }
        if self.strict {
            return Err(Error::ValueOutOfRange {
                value: value.to_f64(),
                min: self.min.to_f64(),
                max: self.max.to_f64(),
            });
        }
        Ok(None)
    }

    /// Lower edge of bin `k`; `k == size` yields `max`.
    pub fn lower_edge(&self, k: usize) -> Result<T> {
        if k > self.size {
            return Err(Error::IndexOutOfRange {
                index: k,
                len: self.size + 1,
            });
        }
        if k == self.size {
            return Ok(self.max);
        }
        Ok(T::edge(self.min, self.max, self.size, k))
    }

    /// All `size + 1` bin edges, `min` first and `max` last.
    pub fn edges(&self) -> Vec<T> {
        (0..self.size)
            .map(|k| T::edge(self.min, self.max, self.size, k))
            .chain(std::iter::once(self.max))
            .collect()
    }
}

impl<T: BinValue> fmt::Display for BinningStructure<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}) in {} bins", self.min, self.max, self.size)
    }
}
