//! Tests for the DataFrame boundary.

use polars::prelude::{DataFrame, NamedFrom, Series};

use rmdrift_ingest::measurement_rows_from_frame;
use rmdrift_model::{CheckError, SampleType, ValueColumn};

fn frame() -> DataFrame {
    DataFrame::new(vec![
        Series::new(
            "Solution Label".into(),
            vec!["RM1", "Soil 1", "Cal Std"],
        )
        .into(),
        Series::new("Element".into(), vec!["Cu", "Cu", "Cu"]).into(),
        Series::new("Type".into(), vec!["Samp", "Samp", "Std"]).into(),
        Series::new("Corr Con".into(), vec![Some(100.0), None, Some(500.0)]).into(),
    ])
    .unwrap()
}

#[test]
fn lowers_a_frame_into_typed_rows() {
    let rows = measurement_rows_from_frame(&frame(), ValueColumn::CorrCon).unwrap();

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].label, "RM1");
    assert_eq!(rows[0].value, Some(100.0));
    assert_eq!(rows[1].value, None);
    assert_eq!(rows[2].sample_type, SampleType::Standard);
    let indices: Vec<usize> = rows.iter().map(|r| r.original_index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
}

#[test]
fn string_value_cells_are_coerced() {
    let df = DataFrame::new(vec![
        Series::new("Solution Label".into(), vec!["Soil 1", "Soil 2"]).into(),
        Series::new("Element".into(), vec!["Cu", "Cu"]).into(),
        Series::new("Type".into(), vec!["Samp", "Samp"]).into(),
        Series::new("Corr Con".into(), vec!["12.5", "over range"]).into(),
    ])
    .unwrap();
    let rows = measurement_rows_from_frame(&df, ValueColumn::CorrCon).unwrap();
    assert_eq!(rows[0].value, Some(12.5));
    assert_eq!(rows[1].value, None);
}

#[test]
fn missing_columns_fail_the_conversion() {
    let df = DataFrame::new(vec![
        Series::new("Solution Label".into(), vec!["Soil 1"]).into(),
        Series::new("Element".into(), vec!["Cu"]).into(),
    ])
    .unwrap();
    let err = measurement_rows_from_frame(&df, ValueColumn::CorrCon).unwrap_err();
    assert_eq!(
        err,
        CheckError::MissingColumns(vec!["Type".to_string(), "Corr Con".to_string()])
    );
}
