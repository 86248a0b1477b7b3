//! Long-format measurement rows, the read-only input to every check.

use serde::{Deserialize, Serialize};

/// Acquisition row category, from the instrument export's `Type` column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleType {
    /// Ordinary sample reading (`Samp` / `Sample`). Only these rows enter
    /// the pivot and are eligible for drift correction.
    Sample,
    /// Calibration standard (`Std` / `Standard`); passes through untouched.
    Standard,
    /// Blank reading (`Blk` / `Blank`); passes through untouched.
    Blank,
    /// Anything else the export contains, preserved verbatim.
    Other(String),
}

impl SampleType {
    /// Parse the raw `Type` cell.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("samp") || trimmed.eq_ignore_ascii_case("sample") {
            SampleType::Sample
        } else if trimmed.eq_ignore_ascii_case("std") || trimmed.eq_ignore_ascii_case("standard") {
            SampleType::Standard
        } else if trimmed.eq_ignore_ascii_case("blk") || trimmed.eq_ignore_ascii_case("blank") {
            SampleType::Blank
        } else {
            SampleType::Other(trimmed.to_string())
        }
    }

    pub fn is_sample(&self) -> bool {
        matches!(self, SampleType::Sample)
    }
}

/// One element reading in acquisition order.
///
/// `original_index` is assigned exactly once when the input table is built
/// and is the sole ordering key used by every derived structure; it is
/// never recomputed from a table position afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRow {
    pub label: String,
    pub element: String,
    pub sample_type: SampleType,
    /// Numeric reading; `None` when the source cell was empty or failed
    /// numeric coercion.
    pub value: Option<f64>,
    pub original_index: usize,
}
