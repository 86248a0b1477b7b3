//! Outcome structures returned by engine operations, and the cumulative
//! drift report consumed by downstream reporting.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::pivot::PivotTable;
use crate::reference::{ReferenceTable, Segment};
use crate::row::MeasurementRow;

/// Key of one drift-report entry: which label's rows were scaled, in which
/// pivot column.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DriftKey {
    pub label: String,
    pub element: String,
}

/// One serialized drift-report line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftEntry {
    pub label: String,
    pub element: String,
    pub ratio: f64,
}

/// Applied drift ratios per (label, element), accumulated across passes.
///
/// For a uniform pass the stored value is the pair ratio itself; for a
/// stepwise pass it is the step multiplier actually applied to that
/// label's last affected row. Serializes as a flat entry list so the
/// report collaborator can consume it as JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<DriftEntry>", into = "Vec<DriftEntry>")]
pub struct DriftReport {
    entries: BTreeMap<DriftKey, f64>,
}

impl DriftReport {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn record(&mut self, label: impl Into<String>, element: impl Into<String>, ratio: f64) {
        self.entries.insert(
            DriftKey {
                label: label.into(),
                element: element.into(),
            },
            ratio,
        );
    }

    pub fn get(&self, label: &str, element: &str) -> Option<f64> {
        self.entries
            .get(&DriftKey {
                label: label.to_string(),
                element: element.to_string(),
            })
            .copied()
    }

    /// Merge another report in; later entries win per key.
    pub fn merge(&mut self, other: &DriftReport) {
        for (key, ratio) in &other.entries {
            self.entries.insert(key.clone(), *ratio);
        }
    }

    /// Entries in key order.
    pub fn entries(&self) -> Vec<DriftEntry> {
        self.entries
            .iter()
            .map(|(key, ratio)| DriftEntry {
                label: key.label.clone(),
                element: key.element.clone(),
                ratio: *ratio,
            })
            .collect()
    }
}

impl From<Vec<DriftEntry>> for DriftReport {
    fn from(entries: Vec<DriftEntry>) -> Self {
        let mut report = DriftReport::default();
        for entry in entries {
            report.record(entry.label, entry.element, entry.ratio);
        }
        report
    }
}

impl From<DriftReport> for Vec<DriftEntry> {
    fn from(report: DriftReport) -> Self {
        report.entries()
    }
}

/// Result of a check pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub pivot: PivotTable,
    pub reference: ReferenceTable,
    pub segments: Vec<Segment>,
    /// Sample rows after the Base keep-filter, values still uncorrected.
    pub corrected: Vec<MeasurementRow>,
}

/// Result of a drift pass or an undo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyOutcome {
    pub corrected: Vec<MeasurementRow>,
    pub reference: ReferenceTable,
    pub drift: DriftReport,
}
