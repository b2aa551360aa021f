//! The Orchestrator's aggregate error type.
//!
//! Grounded on `market_data_ingestor::errors::Error`: a `snafu` enum at the
//! top-level binding together the per-component `thiserror` boundaries.

use carscout_shared::StageError;
use carscout_storage::RepoError;
use snafu::Snafu;

/// Errors the Orchestrator's stage-running loop can surface.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum OrchestratorError {
    /// A stage handler failed; `retryable` mirrors `StageError::is_retryable`.
    #[snafu(display("stage {stage} failed for {listing_id}: {source}"))]
    Stage {
        /// Name of the stage that failed.
        stage: String,
        /// The listing (or raw listing) id the stage unit was for.
        listing_id: uuid::Uuid,
        /// The underlying stage error.
        source: StageError,
    },

    /// A stage handler did not complete within its soft timeout.
    #[snafu(display("stage {stage} timed out for {listing_id}"))]
    SoftTimeout {
        /// Name of the stage that timed out.
        stage: String,
        /// The listing (or raw listing) id the stage unit was for.
        listing_id: uuid::Uuid,
    },

    /// The durable queue itself failed (lease, complete, or fail update).
    #[snafu(display("stage queue error: {source}"))]
    Queue {
        /// The underlying repository error.
        source: RepoError,
    },
}

impl From<RepoError> for OrchestratorError {
    fn from(source: RepoError) -> Self {
        OrchestratorError::Queue { source }
    }
}
