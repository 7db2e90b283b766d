//! Single-bin running-statistics accumulator.

/// Per-history sums for one scalar quantity.
///
/// `score` adds to the in-flight history; `end_history` folds that history's
/// total `x` into `Σx` and `Σx²` and clears it. With `N` source histories:
///
/// ```text
/// mean   = Σx / N
/// stderr = sqrt((Σx² - (Σx)² / N) / N)      N > 1, else 0
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Estimator {
    current: f64,
    sum: f64,
    sum_sq: f64,
}

impl Estimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add to the in-flight history tally.
    #[inline]
    pub fn score(&mut self, value: f64) {
        self.current += value;
    }

    /// Commit the in-flight history. Call once per history tree, not per particle.
    pub fn end_history(&mut self) {
        self.sum += self.current;
        self.sum_sq += self.current * self.current;
        self.current = 0.0;
    }

    pub fn current_history(&self) -> f64 {
        self.current
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn sum_squared(&self) -> f64 {
        self.sum_sq
    }

    pub fn mean(&self, num_histories: u64) -> f64 {
        if num_histories == 0 {
            return 0.0;
        }
        self.sum / num_histories as f64
    }

    pub fn standard_error(&self, num_histories: u64) -> f64 {
        if num_histories <= 1 {
            return 0.0;
        }
        let n = num_histories as f64;
        // cancellation can leave a tiny negative variance
        ((self.sum_sq - self.sum * self.sum / n) / n).max(0.0).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_score_accumulates_within_history() {
        let mut est = Estimator::new();
        est.score(1.0);
        est.score(1.0);
        assert_relative_eq!(est.current_history(), 2.0);

        est.end_history();
        assert_eq!(est.current_history(), 0.0);
        est.score(1.0);
        est.score(1.0);
        est.score(1.0);
        assert_relative_eq!(est.current_history(), 3.0);
    }

    #[test]
    fn test_mean_and_uncertainty() {
        let mut est = Estimator::new();
        for hist in [2, 3, 2] {
            for _ in 0..hist {
                est.score(1.0);
            }
            est.end_history();
        }
        assert_relative_eq!(est.mean(3), 2.3333, epsilon = 1e-4);
        assert_relative_eq!(est.standard_error(3), 0.47140, epsilon = 1e-5);
    }

    #[test]
    fn test_uncertainty_uneven_scores() {
        let mut est = Estimator::new();
        for (a, b) in [(0.1, 0.1), (0.3, 0.8), (1.5, 2.1)] {
            est.score(a);
            est.score(b);
            est.end_history();
        }
        assert_relative_eq!(est.standard_error(3), 1.43836, epsilon = 1e-5);
    }

    #[test]
    fn test_two_histories_over_four_sources() {
        let mut est = Estimator::new();
        for _ in 0..2 {
            est.score(1.0);
            est.score(1.0);
            est.end_history();
        }
        assert_relative_eq!(est.mean(4), 1.0);
        assert_relative_eq!(est.standard_error(4), 1.0);
    }

    #[test]
    fn test_degenerate_history_counts() {
        let mut est = Estimator::new();
        est.score(5.0);
        est.end_history();
        assert_eq!(est.standard_error(1), 0.0);
        assert_eq!(est.standard_error(0), 0.0);
        assert_eq!(est.mean(0), 0.0);
        assert_relative_eq!(est.mean(1), 5.0);
    }

    #[test]
    fn test_constant_scores_have_no_spread() {
        let mut est = Estimator::new();
        for _ in 0..1000 {
            est.score(0.1);
            est.end_history();
        }
        let se = est.standard_error(1000);
        assert!(se >= 0.0 && se < 1e-7);
    }
}
