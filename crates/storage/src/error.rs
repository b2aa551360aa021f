//! Storage-layer error taxonomy.

use thiserror::Error;

/// Errors produced by the Storage Gateway.
///
/// `Invariant` violations are non-retryable per spec §7; every other
/// variant is a `TransientIo`-class failure the Orchestrator retries with
/// backoff.
#[derive(Debug, Error)]
pub enum RepoError {
    /// A data-model invariant from §3 was violated at write time (e.g. a
    /// duplicate-pointer cycle, or a duplicate whose canonical target is
    /// itself a duplicate).
    #[error("invariant violated: {0}")]
    Invariant(String),

    /// An optimistic-concurrency write lost the race: the row's version
    /// counter had already moved past the expected value.
    #[error("version conflict: expected {expected}, row has moved on")]
    VersionConflict {
        /// The version the caller expected to still be current.
        expected: i64,
    },

    /// The referenced row does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Connection pool exhaustion, deadlock, or any other transient
    /// database failure.
    #[error("transient storage I/O error: {0}")]
    TransientIo(String),
}

impl From<diesel::result::Error> for RepoError {
    fn from(e: diesel::result::Error) -> Self {
        match e {
            diesel::result::Error::NotFound => RepoError::NotFound("row not found".to_string()),
            other => RepoError::TransientIo(other.to_string()),
        }
    }
}

impl From<RepoError> for carscout_shared::StageError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Invariant(msg) => carscout_shared::StageError::Invariant(msg),
            RepoError::VersionConflict { expected } => {
                carscout_shared::StageError::Invariant(format!(
                    "version conflict, expected {expected}"
                ))
            }
            RepoError::NotFound(msg) => carscout_shared::StageError::Invariant(msg),
            RepoError::TransientIo(msg) => carscout_shared::StageError::TransientIo(msg),
        }
    }
}
