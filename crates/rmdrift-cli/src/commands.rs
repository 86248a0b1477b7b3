//! Command implementations: check, correct, elements.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use indicatif::ProgressBar;
use tracing::info;

use rmdrift_core::{CorrectionEngine, TaskContext, build_pivot};
use rmdrift_ingest::{CsvTable, format_numeric, measurement_rows_from_table, read_csv_table};
use rmdrift_model::{
    CheckOptions, CheckOutcome, DriftOptions, MeasurementRow, PivotTable, ReferenceTable,
};

use crate::cli::{CheckArgs, CorrectArgs, ElementsArgs};
use crate::summary::{print_check_summary, print_drift_summary};

fn load_checked(
    input: &Path,
    keyword: &str,
    value_column: rmdrift_model::ValueColumn,
) -> Result<(CsvTable, CorrectionEngine, CheckOutcome)> {
    let table = read_csv_table(input)?;
    let rows = measurement_rows_from_table(&table, value_column)
        .with_context(|| format!("ingest: {}", input.display()))?;
    let mut engine = CorrectionEngine::new(CheckOptions::with_keyword(keyword));
    let outcome = engine
        .check(rows)
        .with_context(|| format!("check: {}", input.display()))?;
    Ok((table, engine, outcome))
}

pub fn run_check(args: &CheckArgs) -> Result<()> {
    let (_, _, outcome) = load_checked(&args.input, &args.keyword, args.value_column.into())?;
    print_check_summary(&outcome, &args.keyword);
    if let Some(dir) = &args.output_dir {
        fs::create_dir_all(dir).with_context(|| format!("create: {}", dir.display()))?;
        let pivot_path = dir.join("pivot.csv");
        write_pivot_csv(&pivot_path, &outcome.pivot)?;
        let reference_path = dir.join("reference.csv");
        write_reference_csv(&reference_path, &outcome.reference)?;
        println!(
            "Wrote {} and {}",
            pivot_path.display(),
            reference_path.display()
        );
    }
    Ok(())
}

pub fn run_correct(args: &CorrectArgs) -> Result<()> {
    let (table, mut engine, outcome) =
        load_checked(&args.input, &args.keyword, args.value_column.into())?;

    let elements = if args.elements.is_empty() {
        engine.element_names()
    } else {
        args.elements.clone()
    };
    if elements.is_empty() {
        bail!("no element columns to correct");
    }
    let ref_number = match args.ref_number {
        Some(number) => number,
        None => outcome
            .reference
            .sequence_numbers()
            .first()
            .copied()
            .unwrap_or(0),
    };

    let bar = ProgressBar::new((elements.len() * 100) as u64);
    for (pass, element) in elements.iter().enumerate() {
        let options = DriftOptions {
            element: element.clone(),
            ref_number,
            stepwise: args.stepwise,
        };
        let tick = bar.clone();
        let base = (pass * 100) as u64;
        let mut ctx = TaskContext::new()
            .on_progress(move |update| tick.set_position(base + u64::from(update.percent)));
        engine
            .apply_drift_with(&options, &mut ctx)
            .with_context(|| format!("drift pass: {element}"))?;
    }
    bar.finish_and_clear();

    let merged = engine.merged_output()?;
    let output_path = corrected_path(&args.input, args.output_dir.as_deref());
    if let Some(parent) = output_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).with_context(|| format!("create: {}", parent.display()))?;
    }
    write_corrected_csv(&output_path, &table, &merged, args.value_column.into())?;
    info!(path = %output_path.display(), rows = merged.len(), "corrected table written");
    println!("Corrected table: {}", output_path.display());

    if let Some(report_path) = &args.report {
        let report = engine.drift().cloned().unwrap_or_default();
        let file = fs::File::create(report_path)
            .with_context(|| format!("create: {}", report_path.display()))?;
        serde_json::to_writer_pretty(file, &report)
            .with_context(|| format!("write report: {}", report_path.display()))?;
        println!("Drift report: {}", report_path.display());
    }

    if let Some(report) = engine.drift() {
        print_drift_summary(report);
    }
    Ok(())
}

pub fn run_elements(args: &ElementsArgs) -> Result<()> {
    let table = read_csv_table(&args.input)?;
    let rows = measurement_rows_from_table(&table, args.value_column.into())
        .with_context(|| format!("ingest: {}", args.input.display()))?;
    let samples: Vec<MeasurementRow> = rows
        .into_iter()
        .filter(|row| row.sample_type.is_sample())
        .collect();
    if samples.is_empty() {
        bail!("no rows with a sample type");
    }
    let pivot = build_pivot(&samples)?;
    for name in pivot.column_names() {
        println!("{name}");
    }
    Ok(())
}

/// `<stem>_corrected.csv`, in the output dir or alongside the input.
fn corrected_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let name = format!("{stem}_corrected.csv");
    match output_dir {
        Some(dir) => dir.join(name),
        None => input.with_file_name(name),
    }
}

fn format_cell(value: Option<f64>) -> String {
    value.map(format_numeric).unwrap_or_default()
}

fn write_pivot_csv(path: &Path, pivot: &PivotTable) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("write: {}", path.display()))?;
    let mut headers = vec!["Solution Label".to_string()];
    headers.extend(pivot.column_names());
    headers.push("Original Index".to_string());
    writer.write_record(&headers)?;
    for row in &pivot.rows {
        let mut record = vec![row.label.clone()];
        record.extend(row.values.iter().map(|v| format_cell(*v)));
        record.push(row.original_index.to_string());
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_reference_csv(path: &Path, reference: &ReferenceTable) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("write: {}", path.display()))?;
    let mut headers = vec![
        "Solution Label".to_string(),
        "Seq".to_string(),
        "Role".to_string(),
        "Original Index".to_string(),
    ];
    headers.extend(reference.columns.iter().map(ToString::to_string));
    writer.write_record(&headers)?;
    for point in &reference.points {
        let mut record = vec![
            point.label.clone(),
            point.info.number.to_string(),
            point.info.role.to_string(),
            point.original_index.to_string(),
        ];
        record.extend(point.current.iter().map(|v| format_cell(*v)));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Splice corrected values (and normalized labels) back into the raw
/// table, preserving the input's column shape. Rows dropped by the Base
/// keep-filter are omitted.
fn write_corrected_csv(
    path: &Path,
    table: &CsvTable,
    merged: &[MeasurementRow],
    value_column: rmdrift_model::ValueColumn,
) -> Result<()> {
    let value_col = table
        .column(value_column.column_name())
        .context("value column disappeared from table")?;
    let label_col = table
        .column("Solution Label")
        .context("label column disappeared from table")?;
    let by_index: HashMap<usize, &MeasurementRow> =
        merged.iter().map(|row| (row.original_index, row)).collect();

    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("write: {}", path.display()))?;
    writer.write_record(&table.headers)?;
    for (index, raw) in table.rows.iter().enumerate() {
        let Some(row) = by_index.get(&index) else {
            continue;
        };
        let mut record = raw.clone();
        if let Some(cell) = record.get_mut(label_col) {
            *cell = row.label.clone();
        }
        if let Some(value) = row.value
            && let Some(cell) = record.get_mut(value_col)
        {
            *cell = format_numeric(value);
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}
