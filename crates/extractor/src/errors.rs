//! Errors an [`crate::Extractor`] implementation can produce.

use thiserror::Error;

/// A deterministic inability to turn raw input into a [`carscout_model::FieldMap`].
///
/// Recorded on the owning `RawListing`'s `parse_errors`; never retried, per
/// spec §7 (`ExtractError`).
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The document's markup did not match any known layout for this
    /// source.
    #[error("unrecognized document layout: {0}")]
    UnrecognizedLayout(String),

    /// A required selector matched no nodes.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A field was present but could not be parsed into its expected type.
    #[error("malformed field {field}: {reason}")]
    Malformed {
        /// Name of the field that failed to parse.
        field: String,
        /// Human-readable parse failure reason.
        reason: String,
    },
}
