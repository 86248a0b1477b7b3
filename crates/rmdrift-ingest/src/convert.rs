//! Typed conversion from an untyped table into measurement rows.
//!
//! Required columns are `Solution Label`, `Element`, `Type`, and the
//! chosen value column. Cells that fail numeric coercion become null and
//! are reported through a single warning per pass rather than aborting.

use tracing::warn;

use rmdrift_model::{CheckError, MeasurementRow, Result, SampleType, ValueColumn};

use crate::csv_table::CsvTable;

/// Parse a string as f64, returning None for invalid or empty strings.
pub fn parse_f64(value: &str) -> Option<f64> {
    if value.trim().is_empty() {
        return None;
    }
    value.trim().parse::<f64>().ok()
}

/// Formats a floating-point number as a string without trailing zeros.
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Convert an untyped table into measurement rows, assigning each row its
/// permanent `original_index`.
///
/// Fails with `MissingColumns` when any required header is absent. Cells
/// that are non-empty but not numeric coerce to null; their count is
/// logged once.
pub fn measurement_rows_from_table(
    table: &CsvTable,
    value_column: ValueColumn,
) -> Result<Vec<MeasurementRow>> {
    let required = ["Solution Label", "Element", "Type", value_column.column_name()];
    let missing: Vec<String> = required
        .iter()
        .filter(|name| table.column(name).is_none())
        .map(|name| (*name).to_string())
        .collect();
    if !missing.is_empty() {
        return Err(CheckError::MissingColumns(missing));
    }

    let label_col = table.column("Solution Label").unwrap_or_default();
    let element_col = table.column("Element").unwrap_or_default();
    let type_col = table.column("Type").unwrap_or_default();
    let value_col = table.column(value_column.column_name()).unwrap_or_default();

    let mut coercion_failures = 0usize;
    let mut rows = Vec::with_capacity(table.rows.len());
    for (index, record) in table.rows.iter().enumerate() {
        let cell = |col: usize| record.get(col).map(String::as_str).unwrap_or("");
        let raw_value = cell(value_col);
        let value = parse_f64(raw_value);
        if value.is_none() && !raw_value.trim().is_empty() {
            coercion_failures += 1;
        }
        rows.push(MeasurementRow {
            label: cell(label_col).to_string(),
            element: cell(element_col).to_string(),
            sample_type: SampleType::parse(cell(type_col)),
            value,
            original_index: index,
        });
    }
    if coercion_failures > 0 {
        warn!(
            column = value_column.column_name(),
            cells = coercion_failures,
            "non-numeric cells coerced to null"
        );
    }
    Ok(rows)
}
