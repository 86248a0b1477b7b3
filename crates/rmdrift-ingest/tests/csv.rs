//! Tests for CSV reading and typed conversion.

use std::io::Write;

use rmdrift_ingest::{measurement_rows_from_table, read_csv_table};
use rmdrift_model::{SampleType, ValueColumn};

fn write_temp(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(content.as_bytes()).expect("write temp");
    file
}

#[test]
fn reads_a_plain_export() {
    let file = write_temp(
        "Solution Label,Element,Type,Corr Con\n\
         RM1,Cu,Samp,100.0\n\
         Soil 1,Cu,Samp,50.0\n",
    );
    let table = read_csv_table(file.path()).unwrap();
    assert_eq!(
        table.headers,
        vec!["Solution Label", "Element", "Type", "Corr Con"]
    );
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[0][0], "RM1");
}

#[test]
fn skips_preamble_lines_before_the_header() {
    let file = write_temp(
        "ICP Expert Report\n\
         Solution Label,Element,Type,Corr Con\n\
         RM1,Cu,Samp,100.0\n",
    );
    let table = read_csv_table(file.path()).unwrap();
    assert_eq!(table.headers[0], "Solution Label");
    assert_eq!(table.rows.len(), 1);
}

#[test]
fn drops_fully_empty_lines() {
    let file = write_temp(
        "Solution Label,Element,Type,Corr Con\n\
         ,,,\n\
         RM1,Cu,Samp,100.0\n",
    );
    let table = read_csv_table(file.path()).unwrap();
    assert_eq!(table.rows.len(), 1);
}

#[test]
fn conversion_types_rows_end_to_end() {
    let file = write_temp(
        "Solution Label,Element,Type,Corr Con\n\
         RM1,Cu,Samp,100.0\n\
         Soil 1,Cu,Samp,not-a-number\n\
         Cal Std,Cu,Std,500.0\n",
    );
    let table = read_csv_table(file.path()).unwrap();
    let rows = measurement_rows_from_table(&table, ValueColumn::CorrCon).unwrap();

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].value, Some(100.0));
    assert_eq!(rows[1].value, None);
    assert_eq!(rows[2].sample_type, SampleType::Standard);
    let indices: Vec<usize> = rows.iter().map(|r| r.original_index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
}
