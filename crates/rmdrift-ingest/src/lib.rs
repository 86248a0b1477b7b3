//! Input-table boundary for drift review.
//!
//! Two entry points converge on the same typed rows:
//!
//! - **csv_table**: untyped CSV reading with header-row detection
//! - **convert**: untyped table -> `MeasurementRow`s with column
//!   validation and numeric coercion
//! - **frame**: the same lowering from a Polars `DataFrame`, for callers
//!   that already hold one

pub mod convert;
pub mod csv_table;
pub mod frame;

pub use convert::{format_numeric, measurement_rows_from_table, parse_f64};
pub use csv_table::{CsvTable, read_csv_table};
pub use frame::{any_to_f64, any_to_string, measurement_rows_from_frame};
