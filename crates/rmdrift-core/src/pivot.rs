//! Long-to-wide reshaping of repeated measurements.
//!
//! Rows sharing a label are cut into occurrence groups of the inferred
//! size, then each group becomes one wide row. Two regimes exist: when no
//! group reads the same element twice the reshape is direct; otherwise
//! duplicate readings get ordinal column keys and every label is aligned
//! to the column set of its first full-size ("valid") group, so partial or
//! corrupted trailing groups cannot invent columns.

use std::collections::HashMap;

use tracing::debug;

use rmdrift_model::{CheckError, ColumnKey, MeasurementRow, PivotRow, PivotTable, Result};

use crate::group_size::infer_group_size;

/// Per-label bookkeeping: row positions in input order plus the inferred
/// occurrence-group size.
struct LabelRun {
    positions: Vec<usize>,
    group_size: usize,
}

/// Reshape the sample rows into a pivot table ordered by original index.
///
/// The input must already be restricted to ordinary sample rows; ordering
/// must be ascending by `original_index` (acquisition order).
pub fn build_pivot(rows: &[MeasurementRow]) -> Result<PivotTable> {
    if rows.is_empty() {
        return Ok(PivotTable::default());
    }

    let (label_order, runs) = collect_runs(rows);

    if has_repeats(rows, &label_order, &runs) {
        build_with_repeats(rows, &label_order, &runs)
    } else {
        build_direct(rows, &label_order, &runs)
    }
}

/// Occurrence-group ordinal of each row within its label, parallel to the
/// input slice, using the same inferred group sizes as the pivot. The
/// corrected table carries these ordinals so reference rows can be
/// re-identified after filtering.
pub fn occurrence_groups(rows: &[MeasurementRow]) -> Vec<usize> {
    let (label_order, runs) = collect_runs(rows);
    let mut groups = vec![0usize; rows.len()];
    for label in label_order {
        let run = &runs[label];
        let size = run.group_size.max(1);
        for (within, &pos) in run.positions.iter().enumerate() {
            groups[pos] = within / size;
        }
    }
    groups
}

fn collect_runs<'a>(
    rows: &'a [MeasurementRow],
) -> (Vec<&'a str>, HashMap<&'a str, LabelRun>) {
    let mut label_order: Vec<&str> = Vec::new();
    let mut positions: HashMap<&str, Vec<usize>> = HashMap::new();
    for (idx, row) in rows.iter().enumerate() {
        let entry = positions.entry(row.label.as_str()).or_insert_with(|| {
            label_order.push(row.label.as_str());
            Vec::new()
        });
        entry.push(idx);
    }
    let runs = positions
        .into_iter()
        .map(|(label, positions)| {
            let group_size =
                infer_group_size(positions.iter().map(|&i| rows[i].element.as_str()));
            (label, LabelRun {
                positions,
                group_size,
            })
        })
        .collect();
    (label_order, runs)
}

/// True when any (label, group, element) combination holds more than one
/// reading.
fn has_repeats(
    rows: &[MeasurementRow],
    label_order: &[&str],
    runs: &HashMap<&str, LabelRun>,
) -> bool {
    for label in label_order {
        let run = &runs[label];
        let mut counts: HashMap<(usize, &str), usize> = HashMap::new();
        for (within, &pos) in run.positions.iter().enumerate() {
            let group = within / run.group_size.max(1);
            let count = counts.entry((group, rows[pos].element.as_str())).or_insert(0);
            *count += 1;
            if *count > 1 {
                return true;
            }
        }
    }
    false
}

/// Direct reshape: one column per distinct element, first occurrence wins.
fn build_direct(
    rows: &[MeasurementRow],
    label_order: &[&str],
    runs: &HashMap<&str, LabelRun>,
) -> Result<PivotTable> {
    let mut columns: Vec<ColumnKey> = Vec::new();
    let mut column_pos: HashMap<&str, usize> = HashMap::new();
    for row in rows {
        if !column_pos.contains_key(row.element.as_str()) {
            column_pos.insert(row.element.as_str(), columns.len());
            columns.push(ColumnKey::new(row.element.clone()));
        }
    }

    let mut out: Vec<PivotRow> = Vec::new();
    for label in label_order {
        let run = &runs[label];
        for (group_index, chunk) in run.positions.chunks(run.group_size.max(1)).enumerate() {
            let mut values: Vec<Option<f64>> = vec![None; columns.len()];
            for &pos in chunk {
                let row = &rows[pos];
                let col = column_pos[row.element.as_str()];
                if values[col].is_none() {
                    values[col] = row.value;
                }
            }
            out.push(PivotRow {
                label: (*label).to_string(),
                group_index,
                original_index: rows[chunk[0]].original_index,
                pivot_index: 0,
                values,
            });
        }
    }

    Ok(finish(columns, out))
}

/// Reshape with duplicate-element ordinals and expected-column alignment.
fn build_with_repeats(
    rows: &[MeasurementRow],
    label_order: &[&str],
    runs: &HashMap<&str, LabelRun>,
) -> Result<PivotTable> {
    // Keyed rows per label: (group, column key, value) in input order.
    struct Keyed {
        group_index: usize,
        key: ColumnKey,
        value: Option<f64>,
        original_index: usize,
    }

    let mut columns: Vec<ColumnKey> = Vec::new();
    let mut column_pos: HashMap<ColumnKey, usize> = HashMap::new();
    let mut out: Vec<PivotRow> = Vec::new();
    let mut any_valid = false;

    for label in label_order {
        let run = &runs[label];
        let size = run.group_size.max(1);

        // Assign duplicate ordinals within each (group, element).
        let mut keyed: Vec<Keyed> = Vec::with_capacity(run.positions.len());
        let mut seen: HashMap<(usize, &str), u32> = HashMap::new();
        let mut group_rows: HashMap<usize, usize> = HashMap::new();
        for (within, &pos) in run.positions.iter().enumerate() {
            let row = &rows[pos];
            let group_index = within / size;
            let ordinal = seen
                .entry((group_index, row.element.as_str()))
                .and_modify(|o| *o += 1)
                .or_insert(1);
            *group_rows.entry(group_index).or_insert(0) += 1;
            keyed.push(Keyed {
                group_index,
                key: ColumnKey::with_ordinal(row.element.clone(), *ordinal),
                value: row.value,
                original_index: row.original_index,
            });
        }

        // Expected column set: taken from the first group whose row count
        // matches the inferred size; labels with no such group are dropped.
        let group_count = run.positions.len().div_ceil(size);
        let valid_group = (0..group_count)
            .find(|g| group_rows.get(g).copied().unwrap_or(0) == size);
        let Some(valid_group) = valid_group else {
            debug!(label = *label, "no full-size occurrence group; label dropped from pivot");
            continue;
        };
        any_valid = true;

        let expected: Vec<ColumnKey> = keyed
            .iter()
            .filter(|k| k.group_index == valid_group)
            .map(|k| k.key.clone())
            .collect();
        for key in &expected {
            if !column_pos.contains_key(key) {
                column_pos.insert(key.clone(), columns.len());
                columns.push(key.clone());
            }
        }

        // Emit every group of the label, aligned to the expected columns.
        for group_index in 0..group_count {
            let mut values: Vec<Option<f64>> = vec![None; columns.len()];
            let mut min_index: Option<usize> = None;
            for k in keyed.iter().filter(|k| k.group_index == group_index) {
                min_index = Some(min_index.map_or(k.original_index, |m| m.min(k.original_index)));
                if !expected.contains(&k.key) {
                    continue;
                }
                let col = column_pos[&k.key];
                if values[col].is_none() {
                    values[col] = k.value;
                }
            }
            let Some(original_index) = min_index else {
                continue;
            };
            out.push(PivotRow {
                label: (*label).to_string(),
                group_index,
                original_index,
                pivot_index: 0,
                values,
            });
        }
    }

    if !any_valid {
        return Err(CheckError::NoValidGroups);
    }

    Ok(finish(columns, out))
}

/// Sort by original index, pad value vectors to the final column count,
/// and assign dense pivot indices.
fn finish(columns: Vec<ColumnKey>, mut rows: Vec<PivotRow>) -> PivotTable {
    for row in &mut rows {
        row.values.resize(columns.len(), None);
    }
    rows.sort_by_key(|r| r.original_index);
    for (idx, row) in rows.iter_mut().enumerate() {
        row.pivot_index = idx;
    }
    PivotTable { columns, rows }
}
