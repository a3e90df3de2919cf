//! Configuration for export staging
//!
//! CLI arguments and environment variable handling using clap. Only the
//! connection and output settings are configurable; the organizations to
//! stage are fixed in [`crate::staging::DEFAULT_ORG_MNEMONICS`].

use clap::Parser;

use crate::db::schemas::StagingCollections;
use crate::staging::{StagingConfig, DEFAULT_BATCH_SIZE};
use crate::types::{Result, StagingError};

/// Stage organization-scoped sources and source versions for export
#[derive(Parser, Debug, Clone)]
#[command(name = "export-staging")]
#[command(about = "Rebuild the export staging collections from the live database")]
pub struct Args {
    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "ocl")]
    pub mongodb_db: String,

    /// Namespace prefix of the staging collections
    #[arg(long, env = "STAGING_PREFIX", default_value = "export")]
    pub staging_prefix: String,

    /// Documents per insert batch
    #[arg(long, env = "STAGING_BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON", default_value = "false")]
    pub log_json: bool,
}

impl Args {
    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.mongodb_uri.trim().is_empty() {
            return Err(StagingError::Config("MONGODB_URI must not be empty".to_string()));
        }

        if self.mongodb_db.trim().is_empty() {
            return Err(StagingError::Config("MONGODB_DB must not be empty".to_string()));
        }

        if self.staging_prefix.trim().is_empty() {
            return Err(StagingError::Config(
                "STAGING_PREFIX must not be empty".to_string(),
            ));
        }

        if self.batch_size == 0 {
            return Err(StagingError::Config(
                "STAGING_BATCH_SIZE must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Staging settings derived from the arguments
    pub fn staging_config(&self) -> StagingConfig {
        StagingConfig {
            collections: StagingCollections::with_prefix(&self.staging_prefix),
            batch_size: self.batch_size,
        }
    }
}
