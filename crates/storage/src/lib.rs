//! The Storage Gateway: typed CRUD over every entity in §3, with
//! transactional write boundaries and the data-model invariants enforced
//! at write time (violations surface as [`error::RepoError::Invariant`],
//! which the calling stage treats as non-retryable per §7).
//!
//! Grounded on `asset_sync`'s `db::connection`/`db::migrate`/`manifest::repo`
//! modules: embedded Diesel migrations, `ON CONFLICT ... DO UPDATE`
//! upserts, an explicit `version` column for optimistic concurrency, and a
//! `immediate_transaction`-style leasing query for the durable work queue
//! (here, `stage_queue`, used by `carscout-orchestrator`).

#![deny(missing_docs)]

pub mod connection;
pub mod error;
pub mod migrate;
pub mod models;
pub mod repo;
pub mod schema;

pub use connection::Pool;
pub use error::RepoError;
pub use repo::Storage;
