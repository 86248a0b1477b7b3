//! Wide-format pivot table: one row per occurrence group, one column per
//! element (with duplicate ordinals where a group reads an element twice).

use serde::{Deserialize, Serialize};

use crate::column::ColumnKey;

/// One occurrence group reshaped into a wide row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotRow {
    pub label: String,
    /// Occurrence ordinal of this group within its label (0-based).
    pub group_index: usize,
    /// Minimum original index of the contributing input rows; preserves
    /// run order after reshaping.
    pub original_index: usize,
    /// Dense position after the final ordering sort.
    pub pivot_index: usize,
    /// Values aligned with [`PivotTable::columns`].
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PivotTable {
    pub columns: Vec<ColumnKey>,
    pub rows: Vec<PivotRow>,
}

impl PivotTable {
    pub fn record_count(&self) -> usize {
        self.rows.len()
    }

    /// Position of a column by structured key.
    pub fn column_position(&self, key: &ColumnKey) -> Option<usize> {
        self.columns.iter().position(|c| c == key)
    }

    /// Position of a column by its display name (`Cu`, `Cu_2`, ...).
    pub fn column_position_by_name(&self, name: &str) -> Option<usize> {
        self.column_position(&ColumnKey::parse(name))
    }

    pub fn value(&self, row: usize, column: usize) -> Option<f64> {
        self.rows.get(row).and_then(|r| r.values.get(column).copied().flatten())
    }

    /// Column display names in table order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(ToString::to_string).collect()
    }
}
