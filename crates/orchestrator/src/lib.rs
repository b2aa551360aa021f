//! The Orchestrator: the Pipeline Orchestrator named in spec §4.8.
//!
//! Drives every internal stage off the durable `stage_queue` work-queue,
//! applying the retry/backoff/timeout policy from [`retry`] uniformly
//! across stages, and runs the periodic rescore-stale job described in
//! §4.8's "time-based re-entry" clause. Grounded on
//! `mag1cfrog-stock_trading_bot`'s worker-loop shape: lease a batch,
//! process each unit independently, record success/failure, repeat.

pub mod error;
pub mod notify;
pub mod retry;
pub mod stage;

use carscout_shared::config::PipelineConfig;
use carscout_shared::StageError;
use carscout_storage::Storage;
use chrono::Utc;
use error::OrchestratorError;
use stage::StageHandler;
use std::sync::Arc;
use std::time::Duration as StdDuration;
use tracing::{info, warn};
use uuid::Uuid;

/// The stage names the Orchestrator dispatches, in pipeline order.
pub const STAGE_EXTRACT: &str = "extract";
pub const STAGE_NORMALIZE: &str = "normalize";
pub const STAGE_DEDUPE: &str = "dedupe";
pub const STAGE_COMPARABLES: &str = "comparables";
pub const STAGE_NOTIFY: &str = "notify";

/// Drives the durable stage queue: leases a batch for `stage`, invokes
/// `handler` for each unit with the configured soft timeout, and records
/// completion or a backed-off retry/permanent failure.
///
/// Returns the number of units processed (successes and failures alike),
/// so callers can decide whether to keep polling or back off themselves.
pub async fn run_stage_once(
    storage: &Storage,
    config: &PipelineConfig,
    owner: &str,
    stage: &str,
    handler: &dyn StageHandler,
    limit: i64,
) -> Result<usize, OrchestratorError> {
    let ttl = retry::lease_ttl(&config.retry);
    let leased = storage
        .lease_stage_units(stage.to_string(), owner.to_string(), limit, ttl)
        .await?;

    let processed = leased.len();
    for (unit_id, listing_id, attempts) in leased {
        let outcome = tokio::time::timeout(
            retry::soft_timeout(&config.retry),
            handler.handle(listing_id),
        )
        .await;

        match outcome {
            Ok(Ok(())) => {
                storage.complete_stage_unit(unit_id).await?;
            }
            Ok(Err(stage_err)) => {
                handle_failure(storage, config, stage, unit_id, listing_id, attempts, stage_err)
                    .await?;
            }
            Err(_) => {
                warn!(stage, %listing_id, "stage handler exceeded soft timeout");
                handle_failure(
                    storage,
                    config,
                    stage,
                    unit_id,
                    listing_id,
                    attempts,
                    StageError::TransientIo("soft timeout exceeded".to_string()),
                )
                .await?;
            }
        }
    }
    Ok(processed)
}

async fn handle_failure(
    storage: &Storage,
    config: &PipelineConfig,
    stage: &str,
    unit_id: Uuid,
    listing_id: Uuid,
    attempts: i32,
    err: StageError,
) -> Result<(), OrchestratorError> {
    let retryable = err.is_retryable() && !retry::exhausted(attempts as u32, &config.retry);
    let available_at = if retryable {
        Utc::now() + retry::backoff_for(attempts as u32, &config.retry)
    } else {
        Utc::now()
    };
    warn!(stage, %listing_id, attempts, retryable, error = %err, "stage unit failed");
    storage
        .fail_stage_unit(unit_id, retryable, available_at, err.to_string())
        .await?;
    Ok(())
}

/// Bundles every per-stage handler and runs one polling pass across all
/// five stages, in pipeline order. A single pass is cheap to call
/// repeatedly from the worker's scheduler tick.
pub struct Orchestrator {
    storage: Storage,
    config: PipelineConfig,
    owner: String,
    extract: stage::ExtractStage,
    normalize: stage::NormalizeStage,
    dedupe: stage::DedupeStage,
    comparables: stage::ComparablesScoreStage,
    notify: stage::NotifyStage,
}

impl Orchestrator {
    /// Builds an `Orchestrator` from its already-constructed stage
    /// handlers. `owner` identifies this worker process in stage-queue
    /// lease ownership (for observability; leases are reclaimed purely by
    /// TTL expiry, not by owner identity).
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        storage: Storage,
        config: PipelineConfig,
        owner: String,
        extract: stage::ExtractStage,
        normalize: stage::NormalizeStage,
        dedupe: stage::DedupeStage,
        comparables: stage::ComparablesScoreStage,
        notify: stage::NotifyStage,
    ) -> Self {
        Self {
            storage,
            config,
            owner,
            extract,
            normalize,
            dedupe,
            comparables,
            notify,
        }
    }

    /// Runs one lease-and-process pass over every stage, each bounded to
    /// `limit` units. Stages are visited in DAG order so a freshly
    /// extracted listing has a chance to flow all the way to `notify`
    /// within the same pass, though nothing requires that: each stage is
    /// independently durable and will be picked up on the next pass.
    pub async fn run_pass(&self, limit: i64) -> Result<(), OrchestratorError> {
        let stages: [(&str, &dyn StageHandler); 5] = [
            (STAGE_EXTRACT, &self.extract),
            (STAGE_NORMALIZE, &self.normalize),
            (STAGE_DEDUPE, &self.dedupe),
            (STAGE_COMPARABLES, &self.comparables),
            (STAGE_NOTIFY, &self.notify),
        ];
        for (name, handler) in stages {
            let n = run_stage_once(&self.storage, &self.config, &self.owner, name, handler, limit)
                .await?;
            if n > 0 {
                info!(stage = name, processed = n, "stage pass complete");
            }
        }
        Ok(())
    }

    /// Runs the hourly rescore-stale job described in §4.8: re-enqueues
    /// `comparables` for every approved listing whose score is older than
    /// `rescore_stale_after_hours` and whose listing is still within
    /// `max_listing_age_days`, so market drift is reflected without a
    /// fresh scrape.
    pub async fn rescore_stale(&self) -> Result<usize, OrchestratorError> {
        let now = Utc::now();
        let staler_than = now - chrono::Duration::hours(self.config.rescore.rescore_stale_after_hours as i64);
        let youngest_first_seen =
            now - chrono::Duration::days(self.config.rescore.max_listing_age_days as i64);
        let stale = self
            .storage
            .select_stale_approved(staler_than, youngest_first_seen)
            .await?;
        let count = stale.len();
        for listing_id in stale {
            self.storage
                .enqueue_stage(STAGE_COMPARABLES.to_string(), listing_id.as_uuid())
                .await?;
        }
        if count > 0 {
            info!(count, "re-enqueued stale approved listings for rescoring");
        }
        Ok(count)
    }

    /// Polls stages on a fixed interval, with the rescore-stale job
    /// checked once per `rescore_check_every` ticks, until the process is
    /// told to stop. Intended to be spawned as a long-lived task by the
    /// worker binary.
    pub async fn run_forever(
        self: Arc<Self>,
        poll_interval: StdDuration,
        limit: i64,
        rescore_check_every: u32,
    ) {
        let mut tick: u32 = 0;
        loop {
            if let Err(e) = self.run_pass(limit).await {
                warn!(error = %e, "orchestrator pass failed");
            }
            tick = tick.wrapping_add(1);
            if rescore_check_every > 0 && tick % rescore_check_every == 0 {
                if let Err(e) = self.rescore_stale().await {
                    warn!(error = %e, "rescore-stale job failed");
                }
            }
            tokio::time::sleep(poll_interval).await;
        }
    }
}
