//! The error taxonomy shared by every pipeline stage, per spec §7.

use thiserror::Error;

/// Errors a pipeline stage handler can produce. Each variant maps to one of
/// the propagation strategies in spec §7: retry, record-and-continue, or
/// abort the unit.
#[derive(Debug, Error)]
pub enum StageError {
    /// DB deadlock, broker unavailable, HTTP 5xx from a collaborator.
    /// Retried with exponential backoff by the Orchestrator.
    #[error("transient I/O error: {0}")]
    TransientIo(String),

    /// Deterministic inability to parse raw input. Recorded on the
    /// `RawListing`, not retried.
    #[error("extraction failed: {0}")]
    Extract(String),

    /// A data-model contract from §3 was violated (duplicate-pointer
    /// cycle, orphan RawListing, etc). Non-retryable.
    #[error("invariant violated: {0}")]
    Invariant(String),

    /// The LLM or notification collaborator failed. Recorded on the
    /// listing's Evaluation/Score; the pipeline continues with degraded
    /// output.
    #[error("external collaborator error: {0}")]
    ExternalService(String),
}

impl StageError {
    /// Whether the Orchestrator should retry the stage invocation that
    /// produced this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StageError::TransientIo(_))
    }
}

/// Not an error: a [`carscout_model::Comparables`] computation came up
/// short of the minimum sample size. A first-class signal the Scorer
/// handles explicitly rather than an exceptional condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Insufficient {
    /// The sample size that was actually available.
    pub sample_size: usize,
}
