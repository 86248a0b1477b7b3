//! Polars DataFrame boundary.
//!
//! The surrounding review application hands its working table over as a
//! DataFrame; this module lowers it into typed measurement rows with the
//! same column contract and coercion rules as the CSV path.

use polars::prelude::{AnyValue, Column, DataFrame};
use tracing::warn;

use rmdrift_model::{CheckError, MeasurementRow, Result, SampleType, ValueColumn};

use crate::convert::{format_numeric, parse_f64};

/// Converts a Polars AnyValue to a String representation.
/// Returns empty string for Null, properly formats numeric types.
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int8(v) => v.to_string(),
        AnyValue::Int16(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt8(v) => v.to_string(),
        AnyValue::UInt16(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Boolean(b) => if b { "Y" } else { "N" }.to_string(),
        other => other.to_string(),
    }
}

/// Converts an AnyValue to f64, returning None for non-numeric or null values.
pub fn any_to_f64(value: AnyValue<'_>) -> Option<f64> {
    match value {
        AnyValue::Null => None,
        AnyValue::Int8(v) => Some(f64::from(v)),
        AnyValue::Int16(v) => Some(f64::from(v)),
        AnyValue::Int32(v) => Some(f64::from(v)),
        AnyValue::Int64(v) => Some(v as f64),
        AnyValue::UInt8(v) => Some(f64::from(v)),
        AnyValue::UInt16(v) => Some(f64::from(v)),
        AnyValue::UInt32(v) => Some(f64::from(v)),
        AnyValue::UInt64(v) => Some(v as f64),
        AnyValue::Float32(v) => Some(f64::from(v)),
        AnyValue::Float64(v) => Some(v),
        AnyValue::String(s) => parse_f64(s),
        AnyValue::StringOwned(s) => parse_f64(&s),
        _ => None,
    }
}

fn required_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| CheckError::MissingColumns(vec![name.to_string()]))
}

/// Convert a DataFrame into measurement rows, assigning each row its
/// permanent `original_index` from the frame position.
pub fn measurement_rows_from_frame(
    df: &DataFrame,
    value_column: ValueColumn,
) -> Result<Vec<MeasurementRow>> {
    let required = ["Solution Label", "Element", "Type", value_column.column_name()];
    let missing: Vec<String> = required
        .iter()
        .filter(|name| df.column(name).is_err())
        .map(|name| (*name).to_string())
        .collect();
    if !missing.is_empty() {
        return Err(CheckError::MissingColumns(missing));
    }

    let labels = required_column(df, "Solution Label")?;
    let elements = required_column(df, "Element")?;
    let types = required_column(df, "Type")?;
    let values = required_column(df, value_column.column_name())?;

    let mut coercion_failures = 0usize;
    let mut rows = Vec::with_capacity(df.height());
    for index in 0..df.height() {
        let raw_value = values.get(index).unwrap_or(AnyValue::Null);
        let value = any_to_f64(raw_value.clone());
        if value.is_none() && !any_to_string(raw_value).trim().is_empty() {
            coercion_failures += 1;
        }
        rows.push(MeasurementRow {
            label: any_to_string(labels.get(index).unwrap_or(AnyValue::Null))
                .trim()
                .to_string(),
            element: any_to_string(elements.get(index).unwrap_or(AnyValue::Null))
                .trim()
                .to_string(),
            sample_type: SampleType::parse(&any_to_string(
                types.get(index).unwrap_or(AnyValue::Null),
            )),
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
