//! The `Evaluation` entity: risk classification per listing.

use crate::ids::NormalizedListingId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coarse risk classification surfaced alongside a [`crate::Score`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// No red flags and high rule-confidence.
    Low,
    /// Ambiguous signals; may warrant LLM review.
    Medium,
    /// A red flag fired, or rule-confidence is very low.
    High,
}

/// Risk classification for a single [`crate::NormalizedListing`].
///
/// Produced by the Scorer's red-flag gate, optionally refined by the LLM
/// collaborator when rule-confidence is low or risk is medium (§6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// The listing this evaluation describes.
    pub listing_id: NormalizedListingId,
    /// Red flags that fired, as stable identifiers (e.g. "leasing",
    /// "right_hand_drive").
    pub red_flags: Vec<String>,
    /// Overall risk level.
    pub risk_level: RiskLevel,
    /// Optional natural-language summary from the LLM collaborator.
    pub llm_summary: Option<String>,
    /// Confidence of the rule-based classification, in `[0, 1]`.
    pub rule_confidence: f64,
    /// Confidence reported by the LLM collaborator, when consulted.
    pub llm_confidence: Option<f64>,
    /// Identifier of the rule set version used.
    pub rule_model_version: String,
    /// Identifier of the LLM model used, when consulted.
    pub llm_model_version: Option<String>,
    /// When this evaluation was produced.
    pub evaluated_at: DateTime<Utc>,
}

impl Evaluation {
    /// Whether the LLM collaborator should be consulted for this
    /// evaluation, per §6: rule-confidence below 0.7, or medium risk.
    pub fn warrants_llm_review(&self) -> bool {
        self.rule_confidence < 0.7 || self.risk_level == RiskLevel::Medium
    }
}
