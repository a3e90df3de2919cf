//! Export staging for sources and source versions
//!
//! Rebuilds the `export.*` staging collections consumed by the downstream
//! export: full records for a fixed set of organizations, plus an
//! `{_id, uri}` index spanning every source and source version so that
//! cross-references out of the staged subset can still be resolved.
//!
//! ## Modules
//!
//! - **config**: CLI and environment configuration
//! - **db**: MongoDB and in-memory document stores
//! - **staging**: reset, scope resolution, copy and report phases

pub mod config;
pub mod db;
pub mod staging;
pub mod types;

pub use config::Args;
pub use staging::{Stager, StagingConfig, StagingReport, StagingScope};
pub use types::{Result, StagingError};
