//! Mixed-radix linearization of per-dimension bin indices.
//!
//! The first dimension varies fastest:
//!
//! ```text
//! linear = i0 + i1*s0 + i2*s0*s1 + ...
//! ```
//!
//! Scoring and reporting both go through these two functions, so a table
//! row is always read back from the bin it was scored into.

use crate::error::{Error, Result};

/// Flat index of `indices` in an array with per-dimension `sizes`.
pub fn linearize(indices: &[usize], sizes: &[usize]) -> Result<usize> {
    if indices.len() != sizes.len() {
        return Err(Error::DimensionMismatch {
            indices: indices.len(),
            sizes: sizes.len(),
        });
    }
    let mut linear = 0;
    let mut stride = 1;
    for (&i, &s) in indices.iter().zip(sizes) {
        if i >= s {
            return Err(Error::IndexOutOfRange { index: i, len: s });
        }
        linear += i * stride;
        stride *= s;
    }
    Ok(linear)
}

/// Inverse of [`linearize`].
pub fn delinearize(mut linear: usize, sizes: &[usize]) -> Result<Vec<usize>> {
    let total: usize = sizes.iter().product();
    if linear >= total {
        return Err(Error::IndexOutOfRange {
            index: linear,
            len: total,
        });
    }
    let mut indices = Vec::with_capacity(sizes.len());
    for &s in sizes {
        indices.push(linear % s);
        linear /= s;
    }
    Ok(indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_first_dimension_fastest() -> Result<()> {
        let sizes = [2, 5];
        assert_eq!(linearize(&[0, 0], &sizes)?, 0);
        assert_eq!(linearize(&[1, 0], &sizes)?, 1);
        assert_eq!(linearize(&[0, 1], &sizes)?, 2);
        assert_eq!(linearize(&[1, 4], &sizes)?, 9);
        assert_eq!(linearize(&[2, 1, 3], &[3, 4, 5])?, 2 + 3 + 3 * 12);
        Ok(())
    }

    #[test]
    fn test_empty_is_single_cell() -> Result<()> {
        assert_eq!(linearize(&[], &[])?, 0);
        assert_eq!(delinearize(0, &[])?, Vec::<usize>::new());
        Ok(())
    }

    #[test]
    fn test_dimension_mismatch() {
        assert!(matches!(
            linearize(&[0, 1], &[3]),
            Err(Error::DimensionMismatch { indices: 2, sizes: 1 })
        ));
    }

    #[test]
    fn test_out_of_range() {
        assert!(matches!(
            linearize(&[0, 5], &[2, 5]),
            Err(Error::IndexOutOfRange { index: 5, len: 5 })
        ));
        assert!(delinearize(10, &[2, 5]).is_err());
    }

    proptest! {
        #[test]
        fn prop_linearize_round_trips(
            dims in proptest::collection::vec((1usize..8, 0usize..8), 1..5)
        ) {
            let sizes: Vec<usize> = dims.iter().map(|(s, _)| *s).collect();
            let indices: Vec<usize> = dims.iter().map(|(s, i)| i % s).collect();
            let flat = linearize(&indices, &sizes).unwrap();
            prop_assert!(flat < sizes.iter().product::<usize>());
            prop_assert_eq!(delinearize(flat, &sizes).unwrap(), indices);
        }

        #[test]
        fn prop_out_of_bounds_rejected(
            sizes in proptest::collection::vec(1usize..8, 1..5),
            dim in 0usize..5,
            over in 0usize..4,
        ) {
            let dim = dim % sizes.len();
            let mut indices = vec![0; sizes.len()];
            indices[dim] = sizes[dim] + over;
            prop_assert!(linearize(&indices, &sizes).is_err());
        }
    }
}
