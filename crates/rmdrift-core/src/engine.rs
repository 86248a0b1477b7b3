//! The correction engine: check, drift passes, edits, undo.
//!
//! The engine owns all mutable state — corrected table, reference table,
//! cumulative drift report, undo stack — and returns explicit outcome
//! structures from every operation. It never talks to storage or UI.

use std::collections::HashSet;

use tracing::{debug, info};

use rmdrift_model::{
    ApplyOutcome, CheckError, CheckOptions, CheckOutcome, DriftOptions, DriftReport,
    MeasurementRow, PivotTable, ReferenceTable, Result, Segment,
};

use crate::drift::{ElementColumn, apply_segment_drift};
use crate::label::clean_reference_label;
use crate::pivot::{build_pivot, occurrence_groups};
use crate::segment::{base_keep_flags, build_reference_table, build_segments};
use crate::task::TaskContext;

/// Immutable copy of everything a drift pass may change, pushed before
/// each pass and restored verbatim on undo.
#[derive(Debug, Clone)]
pub struct CorrectionSnapshot {
    corrected: Vec<MeasurementRow>,
    reference: ReferenceTable,
    drift: DriftReport,
}

/// State derived by a check pass.
struct CheckedState {
    pivot: PivotTable,
    reference: ReferenceTable,
    segments: Vec<Segment>,
    /// Sample rows after the Base keep-filter, ascending original index;
    /// values mutate through drift passes and edits.
    corrected: Vec<MeasurementRow>,
    /// Occurrence-group ordinal per corrected row. Row membership never
    /// changes after check, so this stays valid across passes.
    corrected_groups: Vec<usize>,
    /// Non-sample rows, untouched, for re-merging into the final output.
    passthrough: Vec<MeasurementRow>,
    drift: DriftReport,
    undo_stack: Vec<CorrectionSnapshot>,
}

pub struct CorrectionEngine {
    options: CheckOptions,
    state: Option<CheckedState>,
}

impl CorrectionEngine {
    pub fn new(options: CheckOptions) -> Self {
        Self {
            options,
            state: None,
        }
    }

    pub fn keyword(&self) -> &str {
        &self.options.keyword
    }

    /// Run the full check pipeline: filter, group, pivot, classify,
    /// segment. Replaces any previous state, clearing the undo history.
    pub fn check(&mut self, table: Vec<MeasurementRow>) -> Result<CheckOutcome> {
        self.check_with(table, &mut TaskContext::new())
    }

    pub fn check_with(
        &mut self,
        table: Vec<MeasurementRow>,
        ctx: &mut TaskContext,
    ) -> Result<CheckOutcome> {
        ctx.checkpoint()?;
        if table.is_empty() {
            return Err(CheckError::EmptyData("no data loaded".to_string()));
        }

        let keyword = self.options.keyword.clone();
        let mut samples = Vec::new();
        let mut passthrough = Vec::new();
        for row in table {
            if row.sample_type.is_sample() {
                samples.push(row);
            } else {
                passthrough.push(row);
            }
        }
        if samples.is_empty() {
            return Err(CheckError::EmptyData(
                "no rows with a sample type".to_string(),
            ));
        }
        for row in &mut samples {
            let cleaned = clean_reference_label(&row.label, &keyword);
            if cleaned != row.label {
                debug!(from = %row.label, to = %cleaned, "normalized reference label");
                row.label = cleaned;
            }
        }

        ctx.report(20, "pivot");
        ctx.checkpoint()?;
        let groups = occurrence_groups(&samples);
        let pivot = build_pivot(&samples)?;

        ctx.report(55, "classify");
        ctx.checkpoint()?;
        let reference = build_reference_table(&pivot, &keyword)?;

        ctx.report(75, "segment");
        ctx.checkpoint()?;
        let segments = build_segments(&reference.points);

        // Base keep-filter: out-of-order Base occurrences lose their rows
        // in the corrected table; the reference table keeps every point.
        let keep = base_keep_flags(&reference.points);
        let dropped: HashSet<(&str, usize)> = reference
            .points
            .iter()
            .zip(&keep)
            .filter(|(_, kept)| !**kept)
            .map(|(point, _)| (point.label.as_str(), point.group_index))
            .collect();
        let mut corrected = Vec::with_capacity(samples.len());
        let mut corrected_groups = Vec::with_capacity(samples.len());
        for (row, group) in samples.iter().zip(&groups) {
            if dropped.contains(&(row.label.as_str(), *group)) {
                continue;
            }
            corrected.push(row.clone());
            corrected_groups.push(*group);
        }
        if !dropped.is_empty() {
            info!(
                dropped = dropped.len(),
                "dropped out-of-order base occurrences from corrected table"
            );
        }

        ctx.checkpoint()?;
        ctx.report(100, "done");
        info!(
            rows = corrected.len(),
            points = reference.points.len(),
            segments = segments.len(),
            "check complete"
        );

        let outcome = CheckOutcome {
            pivot: pivot.clone(),
            reference: reference.clone(),
            segments: segments.clone(),
            corrected: corrected.clone(),
        };
        self.state = Some(CheckedState {
            pivot,
            reference,
            segments,
            corrected,
            corrected_groups,
            passthrough,
            drift: DriftReport::default(),
            undo_stack: Vec::new(),
        });
        Ok(outcome)
    }

    /// Apply one drift pass for an element across all segments. The
    /// pre-pass state is pushed onto the undo stack first; a cancelled
    /// pass is rolled back and commits nothing.
    pub fn apply_drift(&mut self, options: &DriftOptions) -> Result<ApplyOutcome> {
        self.apply_drift_with(options, &mut TaskContext::new())
    }

    pub fn apply_drift_with(
        &mut self,
        options: &DriftOptions,
        ctx: &mut TaskContext,
    ) -> Result<ApplyOutcome> {
        let keyword = self.options.keyword.clone();
        let state = self.state.as_mut().ok_or(CheckError::NotChecked)?;

        let position = state
            .reference
            .column_position_by_name(&options.element)
            .ok_or_else(|| CheckError::UnknownElement(options.element.clone()))?;
        if !state
            .reference
            .points
            .iter()
            .any(|p| p.info.number == options.ref_number)
        {
            return Err(CheckError::UnknownReference(options.ref_number));
        }
        let column = ElementColumn {
            position,
            base: state.reference.columns[position].base.clone(),
            display: state.reference.columns[position].to_string(),
        };

        state.undo_stack.push(CorrectionSnapshot {
            corrected: state.corrected.clone(),
            reference: state.reference.clone(),
            drift: state.drift.clone(),
        });

        let total = state.segments.len().max(1);
        let mut pass = DriftReport::default();
        for (done, segment) in state.segments.iter().enumerate() {
            if ctx.checkpoint().is_err() {
                if let Some(snapshot) = state.undo_stack.pop() {
                    state.corrected = snapshot.corrected;
                    state.reference = snapshot.reference;
                    state.drift = snapshot.drift;
                }
                return Err(CheckError::Cancelled);
            }
            apply_segment_drift(
                segment,
                &state.reference,
                &mut state.corrected,
                &state.corrected_groups,
                &keyword,
                &column,
                options.stepwise,
                &mut pass,
            );
            ctx.report((((done + 1) * 100) / total) as u8, "drift");
        }

        state.drift.merge(&pass);
        info!(
            element = %column.display,
            ratios = pass.len(),
            stepwise = options.stepwise,
            "drift pass applied"
        );
        Ok(ApplyOutcome {
            corrected: state.corrected.clone(),
            reference: state.reference.clone(),
            drift: state.drift.clone(),
        })
    }

    /// Restore the most recent pre-pass snapshot.
    pub fn undo(&mut self) -> Result<ApplyOutcome> {
        let state = self.state.as_mut().ok_or(CheckError::NotChecked)?;
        let snapshot = state.undo_stack.pop().ok_or(CheckError::NothingToUndo)?;
        state.corrected = snapshot.corrected;
        state.reference = snapshot.reference;
        state.drift = snapshot.drift;
        info!(remaining = state.undo_stack.len(), "correction undone");
        Ok(ApplyOutcome {
            corrected: state.corrected.clone(),
            reference: state.reference.clone(),
            drift: state.drift.clone(),
        })
    }

    /// Hand-edit a reference point's current value; the edit is written
    /// through to the matching corrected-table cells so the next drift
    /// pass reads it as "current".
    pub fn set_reference_value(
        &mut self,
        pivot_index: usize,
        element: &str,
        value: f64,
    ) -> Result<()> {
        let state = self.state.as_mut().ok_or(CheckError::NotChecked)?;
        let position = state
            .reference
            .column_position_by_name(element)
            .ok_or_else(|| CheckError::UnknownElement(element.to_string()))?;
        let base = state.reference.columns[position].base.clone();
        let point = state
            .reference
            .points
            .iter_mut()
            .find(|p| p.pivot_index == pivot_index)
            .ok_or(CheckError::UnknownPoint(pivot_index))?;
        point.current[position] = Some(value);

        let label = point.label.clone();
        let group = point.group_index;
        for (idx, row) in state.corrected.iter_mut().enumerate() {
            if row.label == label && row.element == base && state.corrected_groups[idx] == group {
                row.value = Some(value);
            }
        }
        Ok(())
    }

    /// Flatten each segment's reference series for one element to its
    /// first valid value. Returns the number of segments touched.
    pub fn optimize_flat(&mut self, element: &str) -> Result<usize> {
        let state = self.state.as_mut().ok_or(CheckError::NotChecked)?;
        let position = state
            .reference
            .column_position_by_name(element)
            .ok_or_else(|| CheckError::UnknownElement(element.to_string()))?;

        let mut touched = 0usize;
        for segment in &state.segments {
            let first = segment.points.iter().find_map(|sp| {
                state.reference.points[sp.point]
                    .current
                    .get(position)
                    .copied()
                    .flatten()
            });
            let Some(first) = first else { continue };
            for sp in &segment.points {
                let current = &mut state.reference.points[sp.point].current[position];
                if current.is_some() {
                    *current = Some(first);
                }
            }
            touched += 1;
        }
        Ok(touched)
    }

    /// Iteratively remove the fitted linear trend from each segment's
    /// reference series for one element (at most 10 rounds, stopping when
    /// |slope| < 1e-6). Segments with fewer than 2 valid points are
    /// skipped. Returns the number of segments touched.
    pub fn optimize_slope_to_zero(&mut self, element: &str) -> Result<usize> {
        let state = self.state.as_mut().ok_or(CheckError::NotChecked)?;
        let position = state
            .reference
            .column_position_by_name(element)
            .ok_or_else(|| CheckError::UnknownElement(element.to_string()))?;

        let mut touched = 0usize;
        for segment in &state.segments {
            let mut series: Vec<(usize, f64, f64)> = Vec::new();
            for (x, sp) in segment.points.iter().enumerate() {
                if let Some(y) = state.reference.points[sp.point]
                    .current
                    .get(position)
                    .copied()
                    .flatten()
                {
                    series.push((sp.point, x as f64, y));
                }
            }
            if series.len() < 2 {
                continue;
            }
            for _ in 0..10 {
                let slope = fit_slope(&series);
                if slope.abs() < 1e-6 {
                    break;
                }
                for (_, x, y) in &mut series {
                    *y -= slope * *x;
                }
            }
            for (point, _, y) in &series {
                state.reference.points[*point].current[position] = Some(*y);
            }
            touched += 1;
        }
        Ok(touched)
    }

    /// Corrected sample rows re-merged with the untouched non-sample
    /// rows, in original acquisition order.
    pub fn merged_output(&self) -> Result<Vec<MeasurementRow>> {
        let state = self.state.as_ref().ok_or(CheckError::NotChecked)?;
        let mut merged: Vec<MeasurementRow> = state
            .corrected
            .iter()
            .chain(&state.passthrough)
            .cloned()
            .collect();
        merged.sort_by_key(|row| row.original_index);
        Ok(merged)
    }

    pub fn pivot(&self) -> Option<&PivotTable> {
        self.state.as_ref().map(|s| &s.pivot)
    }

    pub fn reference(&self) -> Option<&ReferenceTable> {
        self.state.as_ref().map(|s| &s.reference)
    }

    pub fn segments(&self) -> Option<&[Segment]> {
        self.state.as_ref().map(|s| s.segments.as_slice())
    }

    pub fn drift(&self) -> Option<&DriftReport> {
        self.state.as_ref().map(|s| &s.drift)
    }

    pub fn can_undo(&self) -> bool {
        self.state
            .as_ref()
            .is_some_and(|s| !s.undo_stack.is_empty())
    }

    /// Pivot column display names, the valid `element` arguments.
    pub fn element_names(&self) -> Vec<String> {
        self.state
            .as_ref()
            .map(|s| s.pivot.column_names())
            .unwrap_or_default()
    }
}

/// Least-squares slope of (x, y) pairs.
fn fit_slope(series: &[(usize, f64, f64)]) -> f64 {
    let n = series.len() as f64;
    let sum_x: f64 = series.iter().map(|(_, x, _)| x).sum();
    let sum_y: f64 = series.iter().map(|(_, _, y)| y).sum();
    let sum_xy: f64 = series.iter().map(|(_, x, y)| x * y).sum();
    let sum_xx: f64 = series.iter().map(|(_, x, _)| x * x).sum();
    let denominator = n * sum_xx - sum_x * sum_x;
    if denominator == 0.0 {
        0.0
    } else {
        (n * sum_xy - sum_x * sum_y) / denominator
    }
}
