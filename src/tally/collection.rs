//! N-dimensional histogram of estimators over particle-attribute bins.

use std::collections::HashSet;
use std::io::Write;

use tracing::debug;

use crate::binning::AttributeBinning;
use crate::error::{Error, Result};
use crate::particle::Particle;

use super::index::{delinearize, linearize};
use super::report::{TallyReport, TallyRow, TallyTable};
use super::{Estimator, EstimatorType};

/// One tally: a fixed estimator type binned over one or more particle
/// attributes, with one [`Estimator`] per bin combination.
///
/// Dimension order is the order the binnings were given in; the flat
/// estimator index is their mixed-radix linearization, first dimension
/// fastest.
#[derive(Debug, Clone)]
pub struct EstimatorCollection {
    name: String,
    kind: EstimatorType,
    binnings: Vec<AttributeBinning>,
    sizes: Vec<usize>,
    estimators: Vec<Estimator>,
    num_histories: u64,
    divisor: Option<f64>,
}

impl EstimatorCollection {
    /// Allocate `∏ sizes` estimators.
    ///
    /// `num_histories` is the run's source-history count and normalizes every
    /// reported mean.
    pub fn new(
        name: impl Into<String>,
        kind: EstimatorType,
        binnings: Vec<AttributeBinning>,
        num_histories: u64,
    ) -> Result<Self> {
        let name = name.into();
        if binnings.is_empty() {
            return Err(Error::InvalidParam(format!(
                "estimator `{name}` needs at least one attribute binning"
            )));
        }
        if num_histories == 0 {
            return Err(Error::InvalidParam(format!(
                "estimator `{name}` needs a positive history count"
            )));
        }
        let mut seen = HashSet::new();
        for b in &binnings {
            if !seen.insert(b.attribute()) {
                return Err(Error::DuplicateAttribute(b.attribute().name()));
            }
        }
        let sizes: Vec<usize> = binnings.iter().map(|b| b.size()).collect();
        let total: usize = sizes.iter().product();
        debug!(estimator = %name, kind = %kind, bins = total, "allocated estimator collection");
        Ok(Self {
            name,
            kind,
            binnings,
            sizes,
            estimators: vec![Estimator::new(); total],
            num_histories,
            divisor: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> EstimatorType {
        self.kind
    }

    pub fn binnings(&self) -> &[AttributeBinning] {
        &self.binnings
    }

    /// Bins per dimension
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// Number of estimators
    pub fn len(&self) -> usize {
        self.estimators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.estimators.is_empty()
    }

    pub fn num_histories(&self) -> u64 {
        self.num_histories
    }

    pub fn geometric_divisor(&self) -> Option<f64> {
        self.divisor
    }

    /// Normalize reported results by a volume or area.
    pub fn set_geometric_divisor(&mut self, divisor: f64) -> Result<()> {
        if !self.kind.rules().divisor_allowed {
            return Err(Error::GeometricDivisorNotAllowed(self.name.clone()));
        }
        if !(divisor.is_finite() && divisor > 0.0) {
            return Err(Error::InvalidParam(format!(
                "geometric divisor {divisor} for `{}` must be finite and positive",
                self.name
            )));
        }
        self.divisor = Some(divisor);
        Ok(())
    }

    /// Per-dimension bin indices of `particle`, `None` if any attribute is
    /// outside its binned domain.
    pub fn bin_indices(&self, particle: &Particle) -> Result<Option<Vec<usize>>> {
        let mut indices = Vec::with_capacity(self.binnings.len());
        for b in &self.binnings {
            match b.index(particle)? {
                Some(i) => indices.push(i),
                None => return Ok(None),
            }
        }
        Ok(Some(indices))
    }

    /// Score `multiplier × weight` into the particle's bin.
    ///
    /// Returns whether anything was scored; particles outside the binned
    /// domain are dropped silently.
    pub fn score(&mut self, particle: &Particle, multiplier: f64) -> Result<bool> {
        let Some(indices) = self.bin_indices(particle)? else {
            return Ok(false);
        };
        let flat = linearize(&indices, &self.sizes)?;
        self.estimators[flat].score(multiplier * particle.weight);
        Ok(true)
    }

    pub fn end_history(&mut self) {
        for e in &mut self.estimators {
            e.end_history();
        }
    }

    pub fn estimator(&self, flat: usize) -> Result<&Estimator> {
        self.estimators.get(flat).ok_or(Error::IndexOutOfRange {
            index: flat,
            len: self.estimators.len(),
        })
    }

    fn scale(&self) -> f64 {
        self.divisor.map_or(1.0, |d| 1.0 / d)
    }

    /// Normalized mean of the estimator at flat index `flat`.
    pub fn check_estimator(&self, flat: usize) -> Result<f64> {
        Ok(self.estimator(flat)?.mean(self.num_histories) * self.scale())
    }

    /// Normalized standard error of the estimator at flat index `flat`.
    pub fn check_uncertainty(&self, flat: usize) -> Result<f64> {
        Ok(self.estimator(flat)?.standard_error(self.num_histories) * self.scale())
    }

    /// Normalized mean at a per-dimension bin coordinate.
    pub fn mean_at(&self, indices: &[usize]) -> Result<f64> {
        self.check_estimator(linearize(indices, &self.sizes)?)
    }

    /// Normalized standard error at a per-dimension bin coordinate.
    pub fn standard_error_at(&self, indices: &[usize]) -> Result<f64> {
        self.check_uncertainty(linearize(indices, &self.sizes)?)
    }

    // ------------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------------

    /// One table per combination of the leading dimensions, rows over the last.
    pub fn report(&self) -> Result<TallyReport> {
        let (last, leading) = match self.binnings.split_last() {
            Some(split) => split,
            None => return Err(Error::InvalidParam("estimator has no dimensions".into())),
        };
        let leading_sizes = &self.sizes[..leading.len()];
        let num_tables: usize = leading_sizes.iter().product();

        let mut tables = Vec::with_capacity(num_tables);
        for t in 0..num_tables {
            let outer = delinearize(t, leading_sizes)?;
            let labels = outer
                .iter()
                .zip(leading)
                .map(|(&k, b)| b.label(k))
                .collect::<Result<Vec<_>>>()?;

            let mut rows = Vec::with_capacity(last.size());
            let mut full = outer.clone();
            full.push(0);
            for k in 0..last.size() {
                if let Some(slot) = full.last_mut() {
                    *slot = k;
                }
                rows.push(TallyRow {
                    lower_edge: last.lower_edge(k)?,
                    mean: self.mean_at(&full)?,
                    std_error: self.standard_error_at(&full)?,
                });
            }
            tables.push(TallyTable {
                labels,
                attribute: last.attribute().name().to_string(),
                upper_edge: last.lower_edge(last.size())?,
                rows,
            });
        }

        Ok(TallyReport {
            name: self.name.clone(),
            kind: self.kind,
            num_histories: self.num_histories,
            geometric_divisor: self.divisor,
            tables,
        })
    }

    /// Text rendering of [`report`](Self::report).
    pub fn write_report<W: Write>(&self, out: &mut W) -> Result<()> {
        self.report()?.write_text(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Vec3;
    use approx::assert_relative_eq;

    fn particle(group: usize, collisions: u64) -> Particle {
        let mut p = Particle::new(Vec3::zero(), Vec3::unit_z(), group);
        p.collisions = collisions;
        p
    }

    fn group_order(n: u64) -> Result<EstimatorCollection> {
        EstimatorCollection::new(
            "group x order",
            EstimatorType::Collision,
            vec![
                AttributeBinning::group_range(3, 4)?,
                AttributeBinning::collision_order_range(0, 4)?,
            ],
            n,
        )
    }

    #[test]
    fn test_mixed_binning_hits_one_bin() -> Result<()> {
        let mut c = group_order(1)?;
        assert_eq!(c.len(), 10);
        assert_eq!(c.sizes(), &[2, 5]);

        assert!(c.score(&particle(4, 2), 1.0)?);
        c.end_history();

        let target = linearize(&[1, 2], c.sizes())?;
        assert_eq!(target, 5);
        for flat in 0..c.len() {
            let expected = if flat == target { 1.0 } else { 0.0 };
            assert_eq!(c.check_estimator(flat)?, expected, "bin {flat}");
        }
        assert_eq!(c.mean_at(&[1, 2])?, 1.0);
        Ok(())
    }

    #[test]
    fn test_out_of_domain_is_dropped() -> Result<()> {
        let mut c = group_order(1)?;
        // group 5 is outside the first dimension, order 7 outside the second
        assert!(!c.score(&particle(5, 1), 1.0)?);
        assert!(!c.score(&particle(3, 7), 1.0)?);
        c.end_history();
        for flat in 0..c.len() {
            assert_eq!(c.estimator(flat)?, &Estimator::new());
        }
        Ok(())
    }

    #[test]
    fn test_weight_scales_score() -> Result<()> {
        let mut c = EstimatorCollection::new(
            "w",
            EstimatorType::TrackLength,
            vec![AttributeBinning::group_all(1)?],
            2,
        )?;
        let mut p = particle(1, 0);
        p.weight = 0.5;
        c.score(&p, 4.0)?;
        assert_relative_eq!(c.estimator(0)?.current_history(), 2.0);
        Ok(())
    }

    #[test]
    fn test_mean_and_error_over_histories() -> Result<()> {
        let mut c = EstimatorCollection::new(
            "flux",
            EstimatorType::Collision,
            vec![AttributeBinning::group_all(1)?],
            4,
        )?;
        let p = particle(1, 0);
        for _ in 0..2 {
            c.score(&p, 1.0)?;
            c.score(&p, 1.0)?;
            c.end_history();
        }
        assert_relative_eq!(c.check_estimator(0)?, 1.0);
        assert_relative_eq!(c.check_uncertainty(0)?, 1.0);

        c.set_geometric_divisor(4.0)?;
        assert_relative_eq!(c.check_estimator(0)?, 0.25);
        assert_relative_eq!(c.check_uncertainty(0)?, 0.25);
        Ok(())
    }

    #[test]
    fn test_surface_current_rejects_divisor() -> Result<()> {
        let mut c = EstimatorCollection::new(
            "leakage",
            EstimatorType::SurfaceCurrent,
            vec![AttributeBinning::group_all(2)?],
            10,
        )?;
        for d in [1.0, 0.5, 1e6] {
            assert!(matches!(
                c.set_geometric_divisor(d),
                Err(Error::GeometricDivisorNotAllowed(_))
            ));
        }
        assert_eq!(c.geometric_divisor(), None);
        Ok(())
    }

    #[test]
    fn test_divisor_must_be_positive() -> Result<()> {
        let mut c = group_order(10)?;
        assert!(c.set_geometric_divisor(0.0).is_err());
        assert!(c.set_geometric_divisor(-2.0).is_err());
        assert!(c.set_geometric_divisor(f64::NAN).is_err());
        c.set_geometric_divisor(2.0)?;
        assert_eq!(c.geometric_divisor(), Some(2.0));
        Ok(())
    }

    #[test]
    fn test_construction_errors() -> Result<()> {
        assert!(matches!(
            EstimatorCollection::new(
                "dup",
                EstimatorType::Collision,
                vec![AttributeBinning::group_all(2)?, AttributeBinning::group_single(1)?],
                10,
            ),
            Err(Error::DuplicateAttribute("group"))
        ));
        assert!(EstimatorCollection::new("none", EstimatorType::Collision, vec![], 10).is_err());
        assert!(EstimatorCollection::new(
            "zero",
            EstimatorType::Collision,
            vec![AttributeBinning::group_all(2)?],
            0
        )
        .is_err());
        Ok(())
    }

    #[test]
    fn test_check_accessors_range() -> Result<()> {
        let c = group_order(10)?;
        assert!(matches!(
            c.check_estimator(10),
            Err(Error::IndexOutOfRange { index: 10, len: 10 })
        ));
        assert!(c.check_uncertainty(11).is_err());
        assert!(matches!(
            c.mean_at(&[0]),
            Err(Error::DimensionMismatch { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_report_tables_follow_linearization() -> Result<()> {
        let mut c = group_order(1)?;
        c.score(&particle(3, 4), 2.0)?;
        c.score(&particle(4, 0), 7.0)?;
        c.end_history();

        let r = c.report()?;
        assert_eq!(r.tables.len(), 2);
        assert_eq!(r.tables[0].labels, vec!["group = 3".to_string()]);
        assert_eq!(r.tables[0].attribute, "collisionOrder");
        assert_eq!(r.tables[0].rows.len(), 5);
        assert_eq!(r.tables[0].rows[4].mean, 2.0);
        assert_eq!(r.tables[1].rows[0].mean, 7.0);
        assert_eq!(r.tables[1].rows[0].lower_edge, 0.0);
        assert_eq!(r.tables[1].upper_edge, 5.0);

        let total: f64 = r.tables.iter().flat_map(|t| &t.rows).map(|row| row.mean).sum();
        assert_eq!(total, 9.0);
        Ok(())
    }

    #[test]
    fn test_write_report_text() -> Result<()> {
        let mut c = group_order(1)?;
        c.score(&particle(3, 1), 1.0)?;
        c.end_history();
        let mut buf = Vec::new();
        c.write_report(&mut buf)?;
        let text = String::from_utf8_lossy(&buf);
        assert!(text.contains("group x order"));
        assert!(text.contains("Collision"));
        assert!(text.contains("group = 4"));
        Ok(())
    }
}
