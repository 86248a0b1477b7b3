//! Repeat-group pivoting and reference-material drift correction.
//!
//! This crate turns a long-format table of repeated element readings into
//! per-occurrence wide rows, classifies the reference-material points
//! embedded in the sample stream, cuts the run into calibration segments,
//! and distributes drift-correction ratios onto the samples between
//! reference points:
//!
//! - **group_size**: GCD-based inference of rows-per-occurrence
//! - **pivot**: long-to-wide reshaping with duplicate-element ordinals
//! - **label**: reference-label parsing and normalization
//! - **segment**: keep-filter and Cone segmentation
//! - **drift**: ratio computation, uniform and stepwise distribution
//! - **engine**: the stateful orchestrator with undo history
//! - **task**: cancellable background execution with progress reports

pub mod drift;
pub mod engine;
pub mod group_size;
pub mod label;
pub mod pivot;
pub mod segment;
pub mod task;

pub use engine::{CorrectionEngine, CorrectionSnapshot};
pub use group_size::infer_group_size;
pub use label::{clean_reference_label, extract_rm_info, is_bare_reference_label, is_reference_label};
pub use pivot::{build_pivot, occurrence_groups};
pub use segment::{base_keep_flags, build_reference_table, build_segments};
pub use task::{
    ApplyTask, CancelToken, CheckTask, ProgressUpdate, TaskContext, TaskError, spawn_apply,
    spawn_check,
};
