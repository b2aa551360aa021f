//! `carscout-worker`: the binary that runs migrations and drives the
//! Orchestrator and Monitor on a schedule.
//!
//! CLI shape grounded on `market_data_ingestor`'s `clap::Parser`-derived
//! `Cli`/`Commands` pattern.

use carscout_dedup::Deduplicator;
use carscout_extractor::PassthroughExtractor;
use carscout_monitor::Monitor;
use carscout_normalizer::Normalizer;
use carscout_orchestrator::notify::LoggingNotifier;
use carscout_orchestrator::stage::{
    ComparablesScoreStage, DedupeStage, ExtractStage, ExtractorRegistry, NormalizeStage,
    NotifyStage,
};
use carscout_orchestrator::Orchestrator;
use carscout_scorer::Scorer;
use carscout_shared::config::PipelineConfig;
use carscout_shared::env::get_env_var_or;
use carscout_storage::{migrate, Pool, Storage};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};

#[derive(Parser)]
#[command(name = "carscout-worker", about = "CarScout pipeline worker")]
struct Cli {
    /// Path to the pipeline config TOML. Missing file falls back to
    /// every section's documented default.
    #[arg(long, env = "CARSCOUT_CONFIG")]
    config: Option<PathBuf>,

    /// Comma-separated marketplace source names to register against the
    /// (currently sole) passthrough extractor. Real per-marketplace
    /// extraction is supplied by pluggable scraper collaborators, out of
    /// scope for this workspace.
    #[arg(long, env = "CARSCOUT_SOURCES", default_value = "mobile.bg")]
    sources: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Runs pending database migrations and exits.
    Migrate,
    /// Runs the pipeline worker loop: Orchestrator passes on a fixed
    /// interval, plus the hourly rescore-stale and 5-minute monitor jobs.
    Serve {
        /// Seconds between Orchestrator polling passes.
        #[arg(long, default_value_t = 5)]
        poll_interval_secs: u64,
        /// Units leased per stage per pass.
        #[arg(long, default_value_t = 20)]
        batch_limit: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    carscout_shared::init_tracing();
    let cli = Cli::parse();

    let database_url = get_env_var_or("DATABASE_URL", "postgres://localhost/carscout");
    let pool_size: u32 = get_env_var_or("CARSCOUT_POOL_SIZE", "8").parse()?;

    match cli.command {
        Commands::Migrate => {
            migrate::run(&database_url)?;
            tracing::info!("migrations applied");
        }
        Commands::Serve {
            poll_interval_secs,
            batch_limit,
        } => {
            migrate::run(&database_url)?;

            let pool = Pool::connect(&database_url, pool_size)?;
            let storage = Storage::new(pool);
            let config = match &cli.config {
                Some(path) => PipelineConfig::from_toml_path(path)?,
                None => PipelineConfig::default(),
            };

            let mut registry = ExtractorRegistry::new();
            for name in cli.sources.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                let source = storage
                    .upsert_source(carscout_model::Source {
                        id: carscout_model::SourceId::from_uuid(uuid::Uuid::new_v4()),
                        name: name.to_string(),
                        base_url: String::new(),
                        enabled: true,
                        crawl_cadence_seconds: 300,
                    })
                    .await?;
                registry.register(source.id, Arc::new(PassthroughExtractor));
            }

            let normalizer = Normalizer::load(storage.clone()).await?;
            let deduplicator = Deduplicator::new(storage.clone(), config.clone());
            let scorer = Scorer::new(storage.clone(), config.clone());
            let monitor_scorer = Scorer::new(storage.clone(), config.clone());
            let notifier: Arc<dyn carscout_orchestrator::notify::NotificationCollaborator> =
                Arc::new(LoggingNotifier);

            let orchestrator = Arc::new(Orchestrator::new(
                storage.clone(),
                config.clone(),
                hostname(),
                ExtractStage::new(storage.clone(), registry),
                NormalizeStage::new(storage.clone(), normalizer),
                DedupeStage::new(deduplicator),
                ComparablesScoreStage::new(scorer),
                NotifyStage::new(storage.clone(), notifier),
            ));

            let monitor = Arc::new(Monitor::new(storage.clone(), monitor_scorer, config.monitor.clone()));

            let scheduler = JobScheduler::new().await?;
            let monitor_for_job = monitor.clone();
            scheduler
                .add(Job::new_async("0 */5 * * * *", move |_, _| {
                    let monitor = monitor_for_job.clone();
                    Box::pin(async move {
                        if let Err(e) = monitor.run_pass().await {
                            tracing::warn!(error = %e, "monitor pass failed");
                        }
                    })
                })?)
                .await?;

            let orchestrator_for_job = orchestrator.clone();
            scheduler
                .add(Job::new_async("0 0 * * * *", move |_, _| {
                    let orchestrator = orchestrator_for_job.clone();
                    Box::pin(async move {
                        if let Err(e) = orchestrator.rescore_stale().await {
                            tracing::warn!(error = %e, "rescore-stale job failed");
                        }
                    })
                })?)
                .await?;

            scheduler.start().await?;

            tracing::info!(poll_interval_secs, batch_limit, "worker serving");
            orchestrator
                .run_forever(
                    std::time::Duration::from_secs(poll_interval_secs),
                    batch_limit,
                    0,
                )
                .await;
        }
    }

    Ok(())
}

fn hostname() -> String {
    get_env_var_or("HOSTNAME", "carscout-worker")
}
