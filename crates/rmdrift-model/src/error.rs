use thiserror::Error;

/// Errors surfaced by the check / correction pipeline.
///
/// Numeric coercion failures are deliberately absent: a cell that fails to
/// parse becomes null and is excluded from ratio math instead of aborting
/// the pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    /// Required input columns are missing; aborts the check immediately.
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// A filtered subset came out empty (clean data, nothing to review).
    #[error("no data: {0}")]
    EmptyData(String),

    /// No labels begin with the configured reference keyword; usually a
    /// configuration problem rather than clean data.
    #[error("no '{keyword}' rows found; labels seen: {}", labels.join(", "))]
    KeywordNotFound {
        keyword: String,
        labels: Vec<String>,
    },

    /// The repeats branch found no group matching the expected size for
    /// any label, so no pivot columns could be established.
    #[error("no valid occurrence groups; cannot build pivot")]
    NoValidGroups,

    /// Requested element is not a pivot column.
    #[error("unknown element column: {0}")]
    UnknownElement(String),

    /// Requested reference sequence number was never classified.
    #[error("unknown reference sequence number: {0}")]
    UnknownReference(u32),

    /// No reference point sits at the given pivot position.
    #[error("no reference point at pivot index {0}")]
    UnknownPoint(usize),

    /// `apply_drift` or a reference edit was called before `check`.
    #[error("check has not been run")]
    NotChecked,

    /// `undo` was called with an empty correction history.
    #[error("nothing to undo")]
    NothingToUndo,

    /// The caller cancelled the pass; no partial state was committed.
    #[error("cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, CheckError>;
