//! The Monitor: the periodic re-entry path described in §4.9.
//!
//! Does not scrape. Reads recent database activity (a fresh `RawListing`
//! observation or a `PriceHistory` insert within the window), applies a
//! coarse prefilter, and re-invokes Comparables+Score for anything that
//! passes. Grounded on `mag1cfrog-stock_trading_bot`'s `asset_sync`
//! binary: a scheduled read-modify-score loop over a DB-resident working
//! set, not a scrape itself.

use carscout_model::{FinalState, NormalizedListing, NormalizedListingId};
use carscout_scorer::Scorer;
use carscout_shared::config::MonitorConfig;
use carscout_shared::StageError;
use carscout_storage::Storage;
use chrono::{Duration, Utc};
use tracing::info;

/// Histogram buckets for the per-run score distribution log, `[0,10]` in
/// width-2 bands.
const SCORE_BUCKETS: [(f64, f64); 5] =
    [(0.0, 2.0), (2.0, 4.0), (4.0, 6.0), (6.0, 8.0), (8.0, 10.01)];

/// The Monitor's periodic pass.
pub struct Monitor {
    storage: Storage,
    scorer: Scorer,
    config: MonitorConfig,
}

/// Outcome of one [`Monitor::run_pass`] invocation, for logging/testing.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PassSummary {
    /// Candidates returned by the recent-activity query.
    pub candidates: usize,
    /// Candidates that survived the coarse prefilter.
    pub prefiltered: usize,
    /// Candidates actually (re)scored this pass.
    pub scored: usize,
    /// Candidates newly approved this pass (notification already
    /// enqueued by the Scorer).
    pub approved: usize,
    /// Score values for everything scored this pass, in processing order.
    pub score_values: Vec<f64>,
}

impl Monitor {
    /// Builds a `Monitor` over a storage handle, an already-constructed
    /// [`Scorer`], and the monitor's own policy knobs.
    pub fn new(storage: Storage, scorer: Scorer, config: MonitorConfig) -> Self {
        Self {
            storage,
            scorer,
            config,
        }
    }

    /// Coarse prefilter: mileage present and within the configured
    /// ceiling, price and year both present. Keeps the pass from wasting
    /// a full Comparables+Score round on obviously-incomplete listings.
    fn passes_prefilter(&self, listing: &NormalizedListing) -> bool {
        let Some(mileage) = listing.mileage else {
            return false;
        };
        if mileage > self.config.prefilter_max_mileage {
            return false;
        }
        listing.price.is_some() && listing.year.is_some()
    }

    /// Runs one pass: selects listings active within the window, applies
    /// the prefilter, and (re)scores each until `max_posts_per_run`
    /// newly-approved listings have been produced this pass. Remaining
    /// candidates are left for the next scheduled pass rather than
    /// flooding a single run with notifications.
    pub async fn run_pass(&self) -> Result<PassSummary, StageError> {
        let now = Utc::now();
        let window_start = now - Duration::minutes(self.config.window_minutes);
        let max_age_cutoff = now - Duration::days(self.config.max_listing_age_days);

        let candidate_ids = self
            .storage
            .select_recent_activity(window_start, max_age_cutoff)
            .await
            .map_err(StageError::from)?;

        let mut summary = PassSummary {
            candidates: candidate_ids.len(),
            ..Default::default()
        };

        for id in candidate_ids {
            if summary.approved >= self.config.max_posts_per_run {
                break;
            }
            if !self.score_one(id, &mut summary).await? {
                continue;
            }
        }

        info!(
            candidates = summary.candidates,
            prefiltered = summary.prefiltered,
            scored = summary.scored,
            approved = summary.approved,
            histogram = ?histogram(&summary.score_values),
            "monitor pass complete"
        );
        Ok(summary)
    }

    async fn score_one(
        &self,
        id: NormalizedListingId,
        summary: &mut PassSummary,
    ) -> Result<bool, StageError> {
        let listing = self
            .storage
            .get_normalized_listing(id)
            .await
            .map_err(StageError::from)?;
        if !self.passes_prefilter(&listing) {
            return Ok(false);
        }
        summary.prefiltered += 1;

        let score = self.scorer.score(id).await?;
        summary.scored += 1;
        summary.score_values.push(score.value);
        if score.final_state == FinalState::Approved {
            summary.approved += 1;
        }
        Ok(true)
    }
}

/// Buckets `values` into [`SCORE_BUCKETS`], returning `(label, count)`
/// pairs in bucket order.
fn histogram(values: &[f64]) -> Vec<(String, usize)> {
    SCORE_BUCKETS
        .iter()
        .map(|(lo, hi)| {
            let count = values.iter().filter(|v| **v >= *lo && **v < *hi).count();
            (format!("[{lo},{hi})"), count)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_buckets_scores_into_bands() {
        let h = histogram(&[1.0, 3.5, 3.9, 7.0, 9.9]);
        assert_eq!(h[0].1, 1); // [0,2)
        assert_eq!(h[1].1, 2); // [2,4)
        assert_eq!(h[3].1, 1); // [6,8)
        assert_eq!(h[4].1, 1); // [8,10.01)
    }

    #[test]
    fn empty_pass_has_empty_histogram_counts() {
        let h = histogram(&[]);
        assert!(h.iter().all(|(_, count)| *count == 0));
    }
}
