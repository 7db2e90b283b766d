//! Tally output: serializable tables of bin edges, means and standard errors.

use std::io::Write;

use serde::Serialize;

use crate::error::Result;

use super::EstimatorType;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TallyRow {
    pub lower_edge: f64,
    pub mean: f64,
    pub std_error: f64,
}

/// Rows over the last binned attribute, for one combination of the others.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TallyTable {
    /// Bin labels of the leading dimensions; empty for one-dimensional tallies
    pub labels: Vec<String>,
    /// Attribute the rows run over
    pub attribute: String,
    pub upper_edge: f64,
    pub rows: Vec<TallyRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TallyReport {
    pub name: String,
    pub kind: EstimatorType,
    pub num_histories: u64,
    pub geometric_divisor: Option<f64>,
    pub tables: Vec<TallyTable>,
}

impl TallyReport {
    pub fn write_text<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "estimator: {}", self.name)?;
        writeln!(out, "type: {}", self.kind)?;
        writeln!(out, "histories: {}", self.num_histories)?;
        if let Some(d) = self.geometric_divisor {
            writeln!(out, "geometric divisor: {d:.9e}")?;
        }
        for table in &self.tables {
            if !table.labels.is_empty() {
                writeln!(out, "{}", table.labels.join(", "))?;
            }
            writeln!(out, "  {:>16}  ,  {:>16}  ,  {:>16}", table.attribute, "mean", "std error")?;
            for row in &table.rows {
                writeln!(
                    out,
                    "  {:>16.9}  ,  {:>16.9e}  ,  {:>16.9e}",
                    row.lower_edge, row.mean, row.std_error
                )?;
            }
            writeln!(out, "  {:>16.9}", table.upper_edge)?;
        }
        Ok(())
    }
}
