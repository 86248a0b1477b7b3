//! Data model for reference-material drift review.
//!
//! Long-format measurement rows come in, wide pivot tables, classified
//! reference points, calibration segments and drift reports come out. The
//! processing itself lives in `rmdrift-core`; this crate only defines the
//! shapes and the error taxonomy shared across the workspace.

pub mod column;
pub mod error;
pub mod options;
pub mod pivot;
pub mod reference;
pub mod report;
pub mod row;

pub use column::ColumnKey;
pub use error::{CheckError, Result};
pub use options::{CheckOptions, DriftOptions, ValueColumn};
pub use pivot::{PivotRow, PivotTable};
pub use reference::{
    PositionBounds, ReferencePoint, ReferenceTable, RmInfo, RmRole, Segment, SegmentPoint,
};
pub use report::{ApplyOutcome, CheckOutcome, DriftEntry, DriftKey, DriftReport};
pub use row::{MeasurementRow, SampleType};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drift_report_merge_overwrites_per_key() {
        let mut first = DriftReport::default();
        first.record("Sample A", "Cu", 1.05);
        first.record("Sample B", "Cu", 1.10);

        let mut second = DriftReport::default();
        second.record("Sample B", "Cu", 1.20);

        first.merge(&second);
        assert_eq!(first.get("Sample A", "Cu"), Some(1.05));
        assert_eq!(first.get("Sample B", "Cu"), Some(1.20));
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn reference_point_ratio_guards_zero_initial() {
        let point = ReferencePoint {
            label: "RM1".to_string(),
            info: RmInfo {
                number: 1,
                role: RmRole::Base,
            },
            group_index: 0,
            original_index: 4,
            pivot_index: 1,
            initial: vec![Some(100.0), Some(0.0), None],
            current: vec![Some(110.0), Some(5.0), Some(1.0)],
        };
        assert_eq!(point.ratio(0), Some(1.1));
        assert_eq!(point.ratio(1), None); // zero initial
        assert_eq!(point.ratio(2), None); // missing initial
    }

    #[test]
    fn outcome_serializes() {
        let outcome = ApplyOutcome {
            corrected: vec![MeasurementRow {
                label: "Soil 1".to_string(),
                element: "Cu".to_string(),
                sample_type: SampleType::Sample,
                value: Some(55.0),
                original_index: 0,
            }],
            reference: ReferenceTable::default(),
            drift: DriftReport::default(),
        };
        let json = serde_json::to_string(&outcome).expect("serialize outcome");
        let round: ApplyOutcome = serde_json::from_str(&json).expect("deserialize outcome");
        assert_eq!(round, outcome);
    }
}
