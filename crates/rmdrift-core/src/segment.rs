//! Reference-point extraction and calibration segmentation.
//!
//! The pivot rows whose label carries the reference keyword become the
//! reference table. Walking those points in run order, every `Cone`
//! (recalibration) opens a new segment; within a segment the anchor
//! sequence number is the first `Base`/`Check` encountered. Each point
//! also records the interval of original indices between itself and the
//! preceding point, which is where drift corrections later apply.

use tracing::debug;

use rmdrift_model::{
    CheckError, PivotTable, PositionBounds, ReferencePoint, ReferenceTable, Result, RmRole,
    Segment, SegmentPoint,
};

use crate::label::{extract_rm_info, is_reference_label};

/// Lift the reference-material rows out of the pivot table.
///
/// Points keep pivot order (ascending original index). Initial values are
/// captured here; `current` starts as a copy and diverges through edits.
pub fn build_reference_table(pivot: &PivotTable, keyword: &str) -> Result<ReferenceTable> {
    let mut points = Vec::new();
    for row in &pivot.rows {
        if !is_reference_label(&row.label, keyword) {
            continue;
        }
        points.push(ReferencePoint {
            label: row.label.clone(),
            info: extract_rm_info(&row.label, keyword),
            group_index: row.group_index,
            original_index: row.original_index,
            pivot_index: row.pivot_index,
            initial: row.values.clone(),
            current: row.values.clone(),
        });
    }
    if points.is_empty() {
        let mut labels: Vec<String> = Vec::new();
        for row in &pivot.rows {
            if !labels.contains(&row.label) {
                labels.push(row.label.clone());
            }
            if labels.len() >= 10 {
                break;
            }
        }
        return Err(CheckError::KeywordNotFound {
            keyword: keyword.to_string(),
            labels,
        });
    }
    debug!(count = points.len(), keyword, "classified reference points");
    Ok(ReferenceTable {
        columns: pivot.columns.clone(),
        points,
    })
}

/// Which reference occurrences survive the Base ordering filter.
///
/// Base sequence numbers must be non-decreasing in run order. A decrease
/// is dropped, with one documented exception: a drop to exactly 1 right
/// after the overall maximum is treated as a numbering restart
/// (RM1, RM2, RM3, RM1 keeps the second RM1). Check and Cone points are
/// never dropped. The filter governs only which rows stay in the
/// corrected sample table; segmentation still sees every point.
pub fn base_keep_flags(points: &[ReferencePoint]) -> Vec<bool> {
    let max_base = points
        .iter()
        .filter(|p| p.info.role == RmRole::Base)
        .map(|p| p.info.number)
        .max()
        .unwrap_or(0);

    let mut prev = 0u32;
    points
        .iter()
        .map(|point| {
            if point.info.role != RmRole::Base {
                return true;
            }
            let num = point.info.number;
            if num >= prev || (num == 1 && prev == max_base) {
                prev = num;
                true
            } else {
                false
            }
        })
        .collect()
}

/// Partition the reference points into calibration segments.
pub fn build_segments(points: &[ReferencePoint]) -> Vec<Segment> {
    let mut segments: Vec<Segment> = Vec::new();
    let mut current_id = 0u32;
    let mut ref_number: Option<u32> = None;
    let mut prev_index: i64 = -1;

    for (idx, point) in points.iter().enumerate() {
        if point.info.role == RmRole::Cone {
            current_id += 1;
            ref_number = None;
        }
        if ref_number.is_none() && matches!(point.info.role, RmRole::Base | RmRole::Check) {
            ref_number = Some(point.info.number);
        }
        let segment_point = SegmentPoint {
            point: idx,
            number: point.info.number,
            role: point.info.role,
            bounds: PositionBounds {
                min: prev_index,
                max: point.original_index as i64,
            },
        };
        prev_index = point.original_index as i64;

        match segments.last_mut() {
            Some(segment) if segment.id == current_id => segment.points.push(segment_point),
            _ => segments.push(Segment {
                id: current_id,
                ref_number: ref_number.unwrap_or(point.info.number),
                points: vec![segment_point],
            }),
        }
    }

    debug!(segments = segments.len(), "built calibration segments");
    segments
}
