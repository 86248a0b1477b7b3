//! Reference-material points, position bounds, and calibration segments.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::column::ColumnKey;

/// Role of a reference-material reading within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RmRole {
    /// Ordinary calibration check point.
    Base,
    /// Secondary verification check.
    Check,
    /// Full recalibration event; resets drift tracking.
    Cone,
}

impl fmt::Display for RmRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RmRole::Base => "Base",
            RmRole::Check => "Check",
            RmRole::Cone => "Cone",
        };
        write!(f, "{name}")
    }
}

/// Parsed identity of a reference label: sequence number plus role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RmInfo {
    pub number: u32,
    pub role: RmRole,
}

/// One reference-material occurrence, lifted out of the pivot table.
///
/// `current` starts as a copy of `initial` and may diverge through hand
/// edits or optimization before a drift pass reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferencePoint {
    pub label: String,
    pub info: RmInfo,
    /// Occurrence ordinal of the backing group within its label (0-based).
    pub group_index: usize,
    pub original_index: usize,
    pub pivot_index: usize,
    /// Values as first inferred, aligned with the reference table columns.
    pub initial: Vec<Option<f64>>,
    /// Values as currently edited, same alignment.
    pub current: Vec<Option<f64>>,
}

impl ReferencePoint {
    /// current / initial for one column; `None` when either side is
    /// missing or the initial value is zero.
    pub fn ratio(&self, column: usize) -> Option<f64> {
        let initial = self.initial.get(column).copied().flatten()?;
        let current = self.current.get(column).copied().flatten()?;
        if initial == 0.0 {
            None
        } else {
            Some(current / initial)
        }
    }
}

/// All classified reference points, in run order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceTable {
    pub columns: Vec<ColumnKey>,
    pub points: Vec<ReferencePoint>,
}

impl ReferenceTable {
    pub fn column_position(&self, key: &ColumnKey) -> Option<usize> {
        self.columns.iter().position(|c| c == key)
    }

    pub fn column_position_by_name(&self, name: &str) -> Option<usize> {
        self.column_position(&ColumnKey::parse(name))
    }

    /// Distinct reference sequence numbers, ascending.
    pub fn sequence_numbers(&self) -> Vec<u32> {
        let mut numbers: Vec<u32> = self.points.iter().map(|p| p.info.number).collect();
        numbers.sort_unstable();
        numbers.dedup();
        numbers
    }
}

/// Half-open interval of original indices claimed by one reference point:
/// everything strictly between the previous point and this one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionBounds {
    /// Original index of the previous reference point, `-1` for the very
    /// first point in the run.
    pub min: i64,
    /// Original index of this point.
    pub max: i64,
}

/// A reference point's placement within a segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentPoint {
    /// Index into [`ReferenceTable::points`].
    pub point: usize,
    pub number: u32,
    pub role: RmRole,
    pub bounds: PositionBounds,
}

/// A calibration segment: the stretch of a run between Cone events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: u32,
    /// Anchor sequence number: the first Base/Check seen in this segment.
    pub ref_number: u32,
    pub points: Vec<SegmentPoint>,
}
