//! Progress/status interface and the pipeline state machine.
//!
//! The pipeline runs as one sequential unit of work and reports back to the
//! invoking context through [`ProgressReporter`]. The calls are plain
//! synchronous trait calls; the caller is responsible for any cross-thread
//! marshalling needed to reflect them in a display.

/// Callbacks consumed by the invoking context (CLI, GUI, ...).
///
/// Every method has a no-op default so callers implement only what they
/// display. None of these may block the pipeline.
pub trait ProgressReporter {
    /// Human-readable stage/status message.
    fn status(&self, _message: &str) {}

    /// Percent complete of the current countable stage, 0..=100.
    fn progress(&self, _percent: f64) {}

    /// A stage with no meaningful progress granularity began (publish).
    fn indeterminate_start(&self) {}

    /// The indeterminate stage ended.
    fn indeterminate_stop(&self) {}

    /// The run reached a terminal state.
    fn finished(&self, _success: bool) {}
}

/// Silent reporter for embedding and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl ProgressReporter for NullReporter {}

/// States of one conversion run.
///
/// `Done` and `Failed` are terminal for a run; the controller returns to
/// `Idle` afterward. Only one run may occupy a non-idle, non-terminal state
/// at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Resolving,
    Staging,
    Reading,
    Merging,
    Exporting,
    Summarizing,
    Publishing,
    Done,
    Failed,
}

impl RunState {
    /// True while a run occupies the pipeline.
    pub fn is_active(self) -> bool {
        !matches!(self, RunState::Idle | RunState::Done | RunState::Failed)
    }
}
