//! End-of-run statistics over a recorded CSV file.

use std::fmt;
use std::path::Path;

use crate::error::Result;
use crate::sample::{Field, Sample};

/// Min/mean/max over the present values of one field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldStats {
    pub count: usize,
    pub min: f64,
    pub mean: f64,
    pub max: f64,
}

impl FieldStats {
    /// `None` when `values` is empty.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        Some(Self {
            count: values.len(),
            min,
            mean,
            max,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSummary {
    pub field: Field,
    /// `None` means the field had no valid data in any row.
    pub stats: Option<FieldStats>,
}

/// Per-field statistics for a whole run.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub rows: usize,
    pub fields: Vec<FieldSummary>,
}

impl Summary {
    pub fn from_samples(samples: &[Sample]) -> Self {
        let fields = Field::ALL
            .iter()
            .map(|&field| FieldSummary {
                field,
                stats: FieldStats::from_values(&present_values(samples, field)),
            })
            .collect();
        Self {
            rows: samples.len(),
            fields,
        }
    }

    pub fn field(&self, field: Field) -> Option<&FieldSummary> {
        self.fields.iter().find(|f| f.field == field)
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Summary ({} samples)", self.rows)?;
        writeln!(
            f,
            "{:<30} {:>7} {:>10} {:>10} {:>10}",
            "Field", "Count", "Min", "Mean", "Max"
        )?;
        writeln!(f, "{}", "-".repeat(71))?;
        for fs in &self.fields {
            let name = fs.field.to_string();
            match fs.stats {
                Some(s) => writeln!(
                    f,
                    "{:<30} {:>7} {:>10.2} {:>10.2} {:>10.2}",
                    name, s.count, s.min, s.mean, s.max
                )?,
                None => writeln!(f, "{name:<30} no valid data")?,
            }
        }
        Ok(())
    }
}

/// Present values of `field`, in row order.
pub fn present_values(samples: &[Sample], field: Field) -> Vec<f64> {
    samples.iter().filter_map(|s| s.value(field)).collect()
}

/// Read every data row of a recorded file.
pub fn load_samples(path: impl AsRef<Path>) -> Result<Vec<Sample>> {
    let mut rdr = csv::Reader::from_path(path)?;
    let mut samples = Vec::new();
    for row in rdr.deserialize::<Sample>() {
        samples.push(row?);
    }
    Ok(samples)
}

/// Load a recorded file and compute its summary.
pub fn summarize(path: impl AsRef<Path>) -> Result<(Vec<Sample>, Summary)> {
    let samples = load_samples(path)?;
    let summary = Summary::from_samples(&samples);
    Ok((samples, summary))
}
