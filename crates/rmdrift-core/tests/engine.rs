//! End-to-end tests of the correction engine: check, edit, apply, undo.

use rmdrift_core::{CancelToken, CorrectionEngine, TaskContext, spawn_check};
use rmdrift_model::{
    CheckError, CheckOptions, DriftOptions, MeasurementRow, SampleType,
};

fn row(label: &str, value: f64, index: usize) -> MeasurementRow {
    MeasurementRow {
        label: label.to_string(),
        element: "Cu".to_string(),
        sample_type: SampleType::Sample,
        value: Some(value),
        original_index: index,
    }
}

/// A run with two reference points and three samples between them.
fn run_rows() -> Vec<MeasurementRow> {
    vec![
        row("RM1", 100.0, 0),
        row("Soil 1", 50.0, 1),
        row("Soil 2", 60.0, 2),
        row("Soil 3", 70.0, 3),
        row("RM2", 100.0, 4),
    ]
}

fn engine() -> CorrectionEngine {
    CorrectionEngine::new(CheckOptions::default())
}

fn corrected_values(rows: &[MeasurementRow]) -> Vec<f64> {
    rows.iter().filter_map(|r| r.value).collect()
}

#[test]
fn check_classifies_and_segments() {
    let mut engine = engine();
    let outcome = engine.check(run_rows()).unwrap();

    assert_eq!(outcome.pivot.record_count(), 5);
    assert_eq!(outcome.reference.points.len(), 2);
    assert_eq!(outcome.segments.len(), 1);
    assert_eq!(outcome.segments[0].ref_number, 1);
    assert_eq!(outcome.corrected.len(), 5);
    assert_eq!(engine.element_names(), vec!["Cu"]);
}

#[test]
fn edited_reference_value_drives_a_uniform_pass() {
    let mut engine = engine();
    engine.check(run_rows()).unwrap();
    // RM2 sits at pivot index 4; raise its current value by 10%.
    engine.set_reference_value(4, "Cu", 110.0).unwrap();

    let outcome = engine
        .apply_drift(&DriftOptions::uniform("Cu", 1))
        .unwrap();
    let values = corrected_values(&outcome.corrected);
    let expected = [100.0, 55.0, 66.0, 77.0, 110.0];
    for (got, want) in values.iter().zip(expected) {
        assert!((got - want).abs() < 1e-9, "{values:?}");
    }
    assert!((outcome.drift.get("Soil 2", "Cu").unwrap() - 1.1).abs() < 1e-12);
}

#[test]
fn stepwise_pass_ramps_linearly() {
    let mut engine = engine();
    engine.check(run_rows()).unwrap();
    engine.set_reference_value(4, "Cu", 110.0).unwrap();

    let outcome = engine
        .apply_drift(&DriftOptions::stepwise("Cu", 1))
        .unwrap();
    let values = corrected_values(&outcome.corrected);
    assert!((values[1] - 50.0 * (1.0 + 0.1 / 3.0)).abs() < 1e-9);
    assert!((values[2] - 64.0).abs() < 1e-9);
    assert!((values[3] - 77.0).abs() < 1e-9);
}

#[test]
fn undo_restores_the_exact_pre_pass_state() {
    let mut engine = engine();
    engine.check(run_rows()).unwrap();
    engine.set_reference_value(4, "Cu", 110.0).unwrap();

    let before_corrected = engine.merged_output().unwrap();
    let before_reference = engine.reference().unwrap().clone();
    let before_drift = engine.drift().unwrap().clone();

    engine.apply_drift(&DriftOptions::uniform("Cu", 1)).unwrap();
    assert!(engine.can_undo());
    let restored = engine.undo().unwrap();

    assert_eq!(engine.merged_output().unwrap(), before_corrected);
    assert_eq!(restored.reference, before_reference);
    assert_eq!(restored.drift, before_drift);
    assert!(!engine.can_undo());
}

#[test]
fn undo_with_empty_history_fails() {
    let mut engine = engine();
    engine.check(run_rows()).unwrap();
    assert_eq!(engine.undo().unwrap_err(), CheckError::NothingToUndo);
}

#[test]
fn operations_before_check_fail() {
    let mut engine = engine();
    assert_eq!(
        engine
            .apply_drift(&DriftOptions::uniform("Cu", 1))
            .unwrap_err(),
        CheckError::NotChecked
    );
    assert_eq!(engine.undo().unwrap_err(), CheckError::NotChecked);
}

#[test]
fn empty_table_and_missing_samples_are_distinct_conditions() {
    let mut engine = engine();
    assert!(matches!(
        engine.check(Vec::new()).unwrap_err(),
        CheckError::EmptyData(_)
    ));

    let mut standards = run_rows();
    for r in &mut standards {
        r.sample_type = SampleType::Standard;
    }
    assert!(matches!(
        engine.check(standards).unwrap_err(),
        CheckError::EmptyData(_)
    ));
}

#[test]
fn wrong_keyword_is_not_found() {
    let mut engine = CorrectionEngine::new(CheckOptions::with_keyword("CRM"));
    assert!(matches!(
        engine.check(run_rows()).unwrap_err(),
        CheckError::KeywordNotFound { .. }
    ));
}

#[test]
fn unknown_element_and_reference_are_rejected() {
    let mut engine = engine();
    engine.check(run_rows()).unwrap();
    assert_eq!(
        engine
            .apply_drift(&DriftOptions::uniform("Pb", 1))
            .unwrap_err(),
        CheckError::UnknownElement("Pb".to_string())
    );
    assert_eq!(
        engine
            .apply_drift(&DriftOptions::uniform("Cu", 9))
            .unwrap_err(),
        CheckError::UnknownReference(9)
    );
}

#[test]
fn out_of_order_base_rows_leave_the_corrected_table() {
    let rows = vec![
        row("RM1", 100.0, 0),
        row("Soil 1", 50.0, 1),
        row("RM3", 100.0, 2),
        row("Soil 2", 60.0, 3),
        row("RM2", 100.0, 4),
    ];
    let mut engine = engine();
    let outcome = engine.check(rows).unwrap();

    // RM2 decreases from RM3 without a wraparound restart: its rows are
    // dropped from the corrected table, but it remains a reference point.
    assert_eq!(outcome.reference.points.len(), 3);
    let labels: Vec<&str> = outcome
        .corrected
        .iter()
        .map(|r| r.label.as_str())
        .collect();
    assert_eq!(labels, vec!["RM1", "Soil 1", "RM3", "Soil 2"]);
    assert_eq!(engine.merged_output().unwrap().len(), 4);
}

#[test]
fn non_sample_rows_pass_through_merged_output() {
    let mut rows = run_rows();
    rows.push(MeasurementRow {
        label: "Cal Std 1".to_string(),
        element: "Cu".to_string(),
        sample_type: SampleType::Standard,
        value: Some(999.0),
        original_index: 5,
    });
    let mut engine = engine();
    let outcome = engine.check(rows).unwrap();
    // Standards never enter the pivot...
    assert_eq!(outcome.pivot.record_count(), 5);
    // ...but come back untouched in acquisition order.
    let merged = engine.merged_output().unwrap();
    assert_eq!(merged.len(), 6);
    assert_eq!(merged[5].label, "Cal Std 1");
    assert_eq!(merged[5].value, Some(999.0));
}

#[test]
fn labels_are_normalized_before_grouping() {
    let rows = vec![
        row("RM - 1", 100.0, 0),
        row("Soil 1", 50.0, 1),
        row("RM2", 100.0, 2),
    ];
    let mut engine = engine();
    let outcome = engine.check(rows).unwrap();
    assert_eq!(outcome.reference.points[0].label, "RM1");
}

#[test]
fn flat_optimization_pins_the_segment_to_its_first_value() {
    let rows = vec![
        row("RM1", 100.0, 0),
        row("Soil 1", 50.0, 1),
        row("RM2", 104.0, 2),
        row("Soil 2", 60.0, 3),
        row("RM3", 108.0, 4),
    ];
    let mut engine = engine();
    engine.check(rows).unwrap();
    let touched = engine.optimize_flat("Cu").unwrap();
    assert_eq!(touched, 1);
    let reference = engine.reference().unwrap();
    let currents: Vec<Option<f64>> = reference.points.iter().map(|p| p.current[0]).collect();
    assert_eq!(currents, vec![Some(100.0), Some(100.0), Some(100.0)]);
    // Initial values are untouched; ratios now expose the drift.
    assert!((reference.points[2].ratio(0).unwrap() - 100.0 / 108.0).abs() < 1e-12);
}

#[test]
fn slope_optimization_flattens_a_linear_trend() {
    let rows = vec![
        row("RM1", 100.0, 0),
        row("RM2", 110.0, 1),
        row("RM3", 120.0, 2),
    ];
    let mut engine = engine();
    engine.check(rows).unwrap();
    let touched = engine.optimize_slope_to_zero("Cu").unwrap();
    assert_eq!(touched, 1);
    let reference = engine.reference().unwrap();
    let y: Vec<f64> = reference
        .points
        .iter()
        .map(|p| p.current[0].unwrap())
        .collect();
    // Slope removed: the series is flat at the fitted intercept.
    assert!((y[0] - y[1]).abs() < 1e-6);
    assert!((y[1] - y[2]).abs() < 1e-6);
}

#[test]
fn cancelled_check_commits_nothing() {
    let cancel = CancelToken::new();
    cancel.cancel();
    let mut ctx = TaskContext::with_cancel(cancel);
    let mut engine = engine();
    assert_eq!(
        engine.check_with(run_rows(), &mut ctx).unwrap_err(),
        CheckError::Cancelled
    );
    assert!(engine.reference().is_none());
}

#[test]
fn cancelled_apply_rolls_back() {
    let mut engine = engine();
    engine.check(run_rows()).unwrap();
    engine.set_reference_value(4, "Cu", 110.0).unwrap();
    let before = engine.merged_output().unwrap();

    let cancel = CancelToken::new();
    cancel.cancel();
    let mut ctx = TaskContext::with_cancel(cancel);
    assert_eq!(
        engine
            .apply_drift_with(&DriftOptions::uniform("Cu", 1), &mut ctx)
            .unwrap_err(),
        CheckError::Cancelled
    );
    assert_eq!(engine.merged_output().unwrap(), before);
    assert!(!engine.can_undo());
}

#[test]
fn background_check_reports_progress_and_returns_the_engine() {
    use std::sync::{Arc, Mutex};

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let task = spawn_check(run_rows(), CheckOptions::default(), move |update| {
        if let Ok(mut guard) = sink.lock() {
            guard.push(update.percent);
        }
    });
    let (engine, outcome) = task.join().unwrap();

    assert_eq!(outcome.reference.points.len(), 2);
    assert_eq!(engine.element_names(), vec!["Cu"]);
    let percents = seen.lock().unwrap().clone();
    assert_eq!(percents.last(), Some(&100));
}
