//! Cancellable background execution of check and drift passes.
//!
//! The engine's scans are a single sequential fold over ordered data, so
//! the concurrency story is deliberately small: one computation at a time
//! per engine, run on a worker thread, with coarse progress callbacks and
//! a cooperative cancel flag checked between stages and segments. A
//! cancelled pass commits nothing.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use thiserror::Error;

use rmdrift_model::{
    ApplyOutcome, CheckError, CheckOptions, CheckOutcome, DriftOptions, MeasurementRow, Result,
};

use crate::engine::CorrectionEngine;

/// Clonable cancellation handle shared between caller and worker.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Coarse progress report delivered between checkpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressUpdate {
    /// 0..=100.
    pub percent: u8,
    /// Stage label, e.g. `"pivot"` or `"drift"`.
    pub stage: &'static str,
}

type ProgressFn = Box<dyn FnMut(ProgressUpdate) + Send>;

/// Execution context handed to engine passes: a cancel flag plus an
/// optional progress sink.
#[derive(Default)]
pub struct TaskContext {
    cancel: CancelToken,
    progress: Option<ProgressFn>,
}

impl TaskContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancel(cancel: CancelToken) -> Self {
        Self {
            cancel,
            progress: None,
        }
    }

    pub fn on_progress(mut self, callback: impl FnMut(ProgressUpdate) + Send + 'static) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    pub(crate) fn report(&mut self, percent: u8, stage: &'static str) {
        if let Some(callback) = self.progress.as_mut() {
            callback(ProgressUpdate { percent, stage });
        }
    }

    /// Err(Cancelled) once the caller has requested cancellation.
    pub(crate) fn checkpoint(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            Err(CheckError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Errors from a spawned pass: the pass itself failed, or its thread died.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error(transparent)]
    Check(#[from] CheckError),
    #[error("worker thread panicked")]
    Panicked,
}

/// A check pass running on a worker thread.
///
/// Joining yields the engine (now holding the checked state) together
/// with the outcome, so ownership itself serializes subsequent passes.
pub struct CheckTask {
    cancel: CancelToken,
    handle: thread::JoinHandle<Result<(CorrectionEngine, CheckOutcome)>>,
}

impl CheckTask {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn join(self) -> std::result::Result<(CorrectionEngine, CheckOutcome), TaskError> {
        match self.handle.join() {
            Ok(result) => result.map_err(TaskError::Check),
            Err(_) => Err(TaskError::Panicked),
        }
    }
}

/// Run a check pass in the background.
pub fn spawn_check(
    table: Vec<MeasurementRow>,
    options: CheckOptions,
    progress: impl FnMut(ProgressUpdate) + Send + 'static,
) -> CheckTask {
    let cancel = CancelToken::new();
    let mut ctx = TaskContext::with_cancel(cancel.clone()).on_progress(progress);
    let handle = thread::spawn(move || {
        let mut engine = CorrectionEngine::new(options);
        let outcome = engine.check_with(table, &mut ctx)?;
        Ok((engine, outcome))
    });
    CheckTask { cancel, handle }
}

/// A drift pass running on a worker thread.
pub struct ApplyTask {
    cancel: CancelToken,
    handle: thread::JoinHandle<(CorrectionEngine, Result<ApplyOutcome>)>,
}

impl ApplyTask {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// The engine always comes back; the outcome reports how the pass
    /// ended. On cancellation the engine state is exactly as before the
    /// pass started.
    pub fn join(self) -> std::result::Result<(CorrectionEngine, Result<ApplyOutcome>), TaskError> {
        self.handle.join().map_err(|_| TaskError::Panicked)
    }
}

/// Run one drift pass in the background, taking the engine with it.
pub fn spawn_apply(
    mut engine: CorrectionEngine,
    options: DriftOptions,
    progress: impl FnMut(ProgressUpdate) + Send + 'static,
) -> ApplyTask {
    let cancel = CancelToken::new();
    let mut ctx = TaskContext::with_cancel(cancel.clone()).on_progress(progress);
    let handle = thread::spawn(move || {
        let outcome = engine.apply_drift_with(&options, &mut ctx);
        (engine, outcome)
    });
    ApplyTask { cancel, handle }
}
