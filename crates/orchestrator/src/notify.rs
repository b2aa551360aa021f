//! The outbound notification collaborator seam, per spec §6.
//!
//! The collaborator itself (a messaging bot) is an explicit Non-goal; what
//! belongs here is the trait boundary and idempotency-key contract the
//! Scorer's fan-out relies on.

use async_trait::async_trait;
use carscout_model::{Comparables, Score};

/// A notification collaborator: renders and delivers an approved listing
/// to end users. The core's contract is at-most-once delivery per
/// `(listing, score-revision)`, keyed by [`Score::notification_idempotency_key`].
#[async_trait]
pub trait NotificationCollaborator: Send + Sync {
    /// Notifies the collaborator of a newly approved listing.
    async fn post_approved(
        &self,
        listing_id: uuid::Uuid,
        score: &Score,
        comparables_summary: Option<&Comparables>,
    );
}

/// A collaborator stand-in that only logs; there is no real transport in
/// this workspace (outbound notification transport is out of scope), but
/// the fan-out and idempotency-key contract are still exercised end to end.
pub struct LoggingNotifier;

#[async_trait]
impl NotificationCollaborator for LoggingNotifier {
    async fn post_approved(
        &self,
        listing_id: uuid::Uuid,
        score: &Score,
        comparables_summary: Option<&Comparables>,
    ) {
        tracing::info!(
            listing_id = %listing_id,
            score = score.value,
            idempotency_key = %score.notification_idempotency_key(),
            sample_size = comparables_summary.map(|c| c.sample_size),
            reasons = ?score.reasons,
            "approved listing ready for notification"
        );
    }
}
