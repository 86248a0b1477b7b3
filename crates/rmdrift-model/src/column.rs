//! Structured pivot column keys.
//!
//! When an occurrence group reads the same element more than once, each
//! occurrence becomes its own pivot column. The duplicate ordinal is kept
//! as data and only projected to a display string (`Cu`, `Cu_2`, ...) at
//! the output boundary.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Pivot column identity: element name plus duplicate ordinal (1-based).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColumnKey {
    pub base: String,
    pub ordinal: u32,
}

impl ColumnKey {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            ordinal: 1,
        }
    }

    pub fn with_ordinal(base: impl Into<String>, ordinal: u32) -> Self {
        Self {
            base: base.into(),
            ordinal,
        }
    }

    /// Parse a display name back into a key (`Cu_2` -> (`Cu`, 2)).
    ///
    /// A trailing `_<digits>` segment is read as the ordinal; anything else
    /// is a plain first-occurrence column.
    pub fn parse(display: &str) -> Self {
        if let Some((base, tail)) = display.rsplit_once('_')
            && !base.is_empty()
            && let Ok(ordinal) = tail.parse::<u32>()
            && ordinal >= 2
        {
            return Self::with_ordinal(base, ordinal);
        }
        Self::new(display)
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ordinal <= 1 {
            write!(f, "{}", self.base)
        } else {
            write!(f, "{}_{}", self.base, self.ordinal)
        }
    }
}
