//! Drift-ratio computation and distribution.
//!
//! For each reference point past a segment's anchor, the ratio of its
//! current to its initial value is pushed onto the ordinary sample rows
//! measured between it and the preceding point, either uniformly or as a
//! linear ramp. Reference points themselves are anchors, not samples:
//! their corrected-table rows are overwritten with the current value
//! instead of being ratio-adjusted.

use rmdrift_model::{DriftReport, MeasurementRow, ReferenceTable, Segment, SegmentPoint};

use crate::label::is_bare_reference_label;

/// A resolved pivot column for one drift pass.
#[derive(Debug, Clone)]
pub struct ElementColumn {
    /// Position in the reference-table columns.
    pub position: usize,
    /// Base element name; corrected rows are matched on this.
    pub base: String,
    /// Display name; drift-report entries are keyed on this.
    pub display: String,
}

/// current / initial for one reference point, with the degenerate cases
/// folded in: a zero initial value yields exactly 1.0 (legitimate but
/// flat reference), a missing side or a non-positive or non-finite ratio
/// yields `None` (the pair is skipped).
fn pair_ratio(initial: Option<f64>, current: Option<f64>) -> Option<f64> {
    let initial = initial?;
    if initial == 0.0 {
        return Some(1.0);
    }
    let current = current?;
    let ratio = current / initial;
    if ratio.is_finite() && ratio > 0.0 {
        Some(ratio)
    } else {
        None
    }
}

/// Step multiplier for the `index`-th of `count` affected rows (0-based):
/// ramps from just above 1 up to exactly `ratio` at the last row.
fn step_multiplier(ratio: f64, count: usize, index: usize) -> f64 {
    let step = (ratio - 1.0) / count as f64;
    1.0 + step * (index as f64 + 1.0)
}

/// Apply one segment's drift corrections for one element column.
///
/// `corrected` must be ordered ascending by `original_index`;
/// `corrected_groups` carries each row's occurrence-group ordinal within
/// its label, parallel to `corrected`. Every multiplier actually applied
/// is recorded in `report`, keyed by the affected row's label.
pub fn apply_segment_drift(
    segment: &Segment,
    reference: &ReferenceTable,
    corrected: &mut [MeasurementRow],
    corrected_groups: &[usize],
    keyword: &str,
    column: &ElementColumn,
    stepwise: bool,
    report: &mut DriftReport,
) {
    let valid: Vec<&SegmentPoint> = segment
        .points
        .iter()
        .filter(|p| p.number >= segment.ref_number)
        .collect();
    let start = valid
        .iter()
        .position(|p| p.number == segment.ref_number)
        .unwrap_or(0);
    if start + 1 >= valid.len() {
        return;
    }

    for span in &valid[start + 1..] {
        let point = &reference.points[span.point];
        let initial = point.initial.get(column.position).copied().flatten();
        let current = point.current.get(column.position).copied().flatten();
        let Some(ratio) = pair_ratio(initial, current) else {
            continue;
        };

        let affected: Vec<usize> = corrected
            .iter()
            .enumerate()
            .filter(|(_, row)| {
                let index = row.original_index as i64;
                index > span.bounds.min
                    && index < span.bounds.max
                    && row.element == column.base
                    && row.value.is_some()
                    && !is_bare_reference_label(&row.label, keyword)
            })
            .map(|(idx, _)| idx)
            .collect();
        if affected.is_empty() {
            continue;
        }

        for (j, &idx) in affected.iter().enumerate() {
            let multiplier = if stepwise {
                step_multiplier(ratio, affected.len(), j)
            } else {
                ratio
            };
            let row = &mut corrected[idx];
            if let Some(value) = row.value {
                row.value = Some(value * multiplier);
            }
            report.record(row.label.clone(), column.display.clone(), multiplier);
        }
    }

    // Anchor refresh: each point past the anchor pins its own corrected
    // rows to its current value, whatever happened to the pair ratio.
    for span in &valid[start + 1..] {
        let point = &reference.points[span.point];
        let Some(current) = point.current.get(column.position).copied().flatten() else {
            continue;
        };
        for (idx, row) in corrected.iter_mut().enumerate() {
            if row.label == point.label
                && row.element == column.base
                && corrected_groups[idx] == point.group_index
            {
                row.value = Some(current);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_ratio_cases() {
        assert_eq!(pair_ratio(Some(100.0), Some(110.0)), Some(1.1));
        assert_eq!(pair_ratio(Some(0.0), Some(110.0)), Some(1.0));
        assert_eq!(pair_ratio(Some(0.0), None), Some(1.0));
        assert_eq!(pair_ratio(None, Some(110.0)), None);
        assert_eq!(pair_ratio(Some(100.0), None), None);
        assert_eq!(pair_ratio(Some(100.0), Some(-5.0)), None);
    }

    #[test]
    fn step_multiplier_reaches_ratio_at_last_row() {
        let ratio = 1.1;
        assert!((step_multiplier(ratio, 3, 2) - 1.1).abs() < 1e-12);
        assert!((step_multiplier(ratio, 3, 0) - (1.0 + 0.1 / 3.0)).abs() < 1e-12);
    }
}
