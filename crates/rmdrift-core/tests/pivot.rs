//! Tests for long-to-wide reshaping.

use rmdrift_core::{build_pivot, occurrence_groups};
use rmdrift_model::{MeasurementRow, SampleType};

fn row(label: &str, element: &str, value: f64, index: usize) -> MeasurementRow {
    MeasurementRow {
        label: label.to_string(),
        element: element.to_string(),
        sample_type: SampleType::Sample,
        value: Some(value),
        original_index: index,
    }
}

fn table(entries: &[(&str, &str, f64)]) -> Vec<MeasurementRow> {
    entries
        .iter()
        .enumerate()
        .map(|(index, (label, element, value))| row(label, element, *value, index))
        .collect()
}

#[test]
fn direct_reshape_one_row_per_group() {
    let rows = table(&[
        ("Soil 1", "Cu", 10.0),
        ("Soil 1", "Zn", 20.0),
        ("Soil 1", "Cu", 11.0),
        ("Soil 1", "Zn", 21.0),
        ("Soil 2", "Cu", 30.0),
        ("Soil 2", "Zn", 40.0),
    ]);
    let pivot = build_pivot(&rows).unwrap();

    assert_eq!(pivot.column_names(), vec!["Cu", "Zn"]);
    assert_eq!(pivot.rows.len(), 3);
    assert_eq!(pivot.rows[0].label, "Soil 1");
    assert_eq!(pivot.rows[0].values, vec![Some(10.0), Some(20.0)]);
    assert_eq!(pivot.rows[1].values, vec![Some(11.0), Some(21.0)]);
    assert_eq!(pivot.rows[2].label, "Soil 2");
    assert_eq!(pivot.rows[2].values, vec![Some(30.0), Some(40.0)]);
}

#[test]
fn pivot_rows_follow_acquisition_order_with_interleaved_labels() {
    let rows = table(&[
        ("A", "Cu", 1.0),
        ("B", "Cu", 2.0),
        ("A", "Zn", 3.0),
        ("B", "Zn", 4.0),
    ]);
    let pivot = build_pivot(&rows).unwrap();

    // A's group starts at index 0, B's at index 1.
    let labels: Vec<&str> = pivot.rows.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, vec!["A", "B"]);
    assert_eq!(pivot.rows[0].original_index, 0);
    assert_eq!(pivot.rows[1].original_index, 1);
    let pivot_indices: Vec<usize> = pivot.rows.iter().map(|r| r.pivot_index).collect();
    assert_eq!(pivot_indices, vec![0, 1]);
}

#[test]
fn repeated_elements_get_ordinal_columns() {
    let rows = table(&[
        ("Ore", "Cu", 1.0),
        ("Ore", "Cu", 2.0),
        ("Ore", "Zn", 3.0),
        ("Ore", "Cu", 4.0),
        ("Ore", "Cu", 5.0),
        ("Ore", "Zn", 6.0),
    ]);
    let pivot = build_pivot(&rows).unwrap();

    assert_eq!(pivot.column_names(), vec!["Cu", "Cu_2", "Zn"]);
    assert_eq!(pivot.rows.len(), 2);
    assert_eq!(
        pivot.rows[0].values,
        vec![Some(1.0), Some(2.0), Some(3.0)]
    );
    assert_eq!(
        pivot.rows[1].values,
        vec![Some(4.0), Some(5.0), Some(6.0)]
    );
}

#[test]
fn repeats_and_direct_branches_agree_for_clean_labels() {
    // "Plain" has no duplicate elements; alone it takes the direct branch.
    let plain = &[("Plain", "Cu", 7.0), ("Plain", "Zn", 8.0)];
    let direct = build_pivot(&table(plain)).unwrap();

    // Adding a label with an in-group duplicate forces the repeats branch
    // for the whole table; Plain's columns and values must not change.
    let mixed = table(&[
        ("Plain", "Cu", 7.0),
        ("Plain", "Zn", 8.0),
        ("Dup", "Cu", 1.0),
        ("Dup", "Cu", 2.0),
        ("Dup", "Zn", 3.0),
    ]);
    let repeats = build_pivot(&mixed).unwrap();

    let plain_row = repeats
        .rows
        .iter()
        .find(|r| r.label == "Plain")
        .expect("plain row");
    for (key, value) in direct.columns.iter().zip(&direct.rows[0].values) {
        let position = repeats.column_position(key).expect("shared column");
        assert_eq!(plain_row.values[position], *value);
    }
}

#[test]
fn occurrence_groups_number_groups_within_label() {
    let rows = table(&[
        ("A", "Cu", 1.0),
        ("A", "Zn", 2.0),
        ("B", "Cu", 3.0),
        ("A", "Cu", 4.0),
        ("A", "Zn", 5.0),
    ]);
    // A: size 2 -> groups 0, 0, 1, 1; B: single group.
    assert_eq!(occurrence_groups(&rows), vec![0, 0, 0, 1, 1]);
}

#[test]
fn empty_input_gives_empty_table() {
    let pivot = build_pivot(&[]).unwrap();
    assert!(pivot.rows.is_empty());
    assert!(pivot.columns.is_empty());
}

#[test]
fn null_values_survive_reshaping_as_nulls() {
    let mut rows = table(&[("S", "Cu", 0.0), ("S", "Zn", 2.0)]);
    rows[0].value = None;
    let pivot = build_pivot(&rows).unwrap();
    assert_eq!(pivot.rows[0].values, vec![None, Some(2.0)]);
}
