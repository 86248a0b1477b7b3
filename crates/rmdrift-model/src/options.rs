//! Caller-facing knobs for the check and correction passes.

use serde::{Deserialize, Serialize};

/// Which numeric column of the instrument export feeds the pivot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueColumn {
    /// Corrected concentration (`Corr Con`), the default.
    #[default]
    CorrCon,
    /// Raw intensity (`Int`).
    Intensity,
}

impl ValueColumn {
    /// Header name of the column in the export.
    pub fn column_name(self) -> &'static str {
        match self {
            ValueColumn::CorrCon => "Corr Con",
            ValueColumn::Intensity => "Int",
        }
    }
}

/// Options for a check pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOptions {
    /// Reference-material label keyword.
    pub keyword: String,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            keyword: "RM".to_string(),
        }
    }
}

impl CheckOptions {
    pub fn with_keyword(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
        }
    }
}

/// Options for one drift pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftOptions {
    /// Pivot column to correct, by display name (`Cu`, `Cu_2`, ...).
    pub element: String,
    /// Reference sequence number selected by the caller from the
    /// classified points. Each segment still anchors on its own first
    /// Base/Check number during application.
    pub ref_number: u32,
    /// Ramp the correction linearly across the affected rows instead of
    /// applying the full ratio uniformly.
    pub stepwise: bool,
}

impl DriftOptions {
    pub fn uniform(element: impl Into<String>, ref_number: u32) -> Self {
        Self {
            element: element.into(),
            ref_number,
            stepwise: false,
        }
    }

    pub fn stepwise(element: impl Into<String>, ref_number: u32) -> Self {
        Self {
            element: element.into(),
            ref_number,
            stepwise: true,
        }
    }
}
