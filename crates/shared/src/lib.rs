//! Ambient stack shared by every crate in the workspace: configuration,
//! the error taxonomy, environment helpers, and logging setup.
//!
//! Per the "no ambient global settings object" design note, nothing here is
//! a process-wide singleton; [`config::PipelineConfig`] is constructed once
//! and threaded explicitly into whatever needs it.

#![deny(missing_docs)]

pub mod config;
pub mod env;
pub mod error;
pub mod tracing_init;

pub use config::PipelineConfig;
pub use error::{Insufficient, StageError};
pub use tracing_init::init_tracing;
