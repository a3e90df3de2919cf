//! Staging pipeline
//!
//! Rebuilds the export staging collections in one linear pass:
//!
//! 1. **Reset** drops the four staging collections
//! 2. **Scope** resolves organization mnemonics to organization and source ids
//! 3. **Scoped copy** stages full sources and non-HEAD source versions in scope
//! 4. **Index copy** stages `{_id, uri}` for every source and non-HEAD version
//! 5. **Report** counts what was staged
//!
//! Every phase runs on every invocation. A failure aborts the run and leaves
//! the staging collections as far as they got; re-running rebuilds them.

mod copy;
mod report;
mod reset;
mod scope;

pub use copy::{copy_documents, index_projection, CopyJob, CopyOutcome};
pub use report::StagingReport;
pub use reset::reset_staging;
pub use scope::{resolve_scope, ResolvedScope, StagingScope, DEFAULT_ORG_MNEMONICS};

use bson::doc;
use tracing::{info, warn};

use crate::db::schemas::{
    StagingCollections, HEAD_MNEMONIC, SOURCE_COLLECTION, SOURCE_VERSION_COLLECTION,
};
use crate::db::DocumentStore;
use crate::types::Result;

/// Default number of documents per `insert_many`
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Where and how staging writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingConfig {
    pub collections: StagingCollections,
    pub batch_size: usize,
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            collections: StagingCollections::default(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Runs the staging phases against a document store
pub struct Stager<S: DocumentStore> {
    store: S,
    scope: StagingScope,
    config: StagingConfig,
}

impl<S: DocumentStore> Stager<S> {
    pub fn new(store: S, scope: StagingScope, config: StagingConfig) -> Self {
        Self {
            store,
            scope,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn scope(&self) -> &StagingScope {
        &self.scope
    }

    /// Run every phase in order and report the resulting counts
    pub async fn run(&self) -> Result<StagingReport> {
        if self.scope.is_empty() {
            warn!("Staging scope has no organizations; only the index collections will be filled");
        }

        reset_staging(&self.store, &self.config.collections).await?;
        let resolved = resolve_scope(&self.store, &self.scope).await?;
        self.copy_scoped(&resolved).await?;
        self.copy_index().await?;

        let report = StagingReport::collect(&self.store, &self.config.collections).await?;
        info!(
            sources = report.sources,
            source_versions = report.source_versions,
            source_ids = report.source_ids,
            source_version_ids = report.source_version_ids,
            "Staging complete"
        );
        Ok(report)
    }

    /// Copy full source and non-HEAD source version records in scope
    pub async fn copy_scoped(&self, resolved: &ResolvedScope) -> Result<()> {
        let names = &self.config.collections;

        let sources = CopyJob::full(
            SOURCE_COLLECTION,
            &names.sources,
            scope::sources_owned_by(&resolved.org_ids),
        );
        copy_documents(&self.store, &sources, self.config.batch_size).await?;

        let versions = CopyJob::full(
            SOURCE_VERSION_COLLECTION,
            &names.source_versions,
            doc! {
                "versioned_object_id": { "$in": resolved.source_ids.membership_values() },
                "mnemonic": { "$ne": HEAD_MNEMONIC },
            },
        );
        copy_documents(&self.store, &versions, self.config.batch_size).await?;

        Ok(())
    }

    /// Copy `{_id, uri}` of every source and every non-HEAD source version
    pub async fn copy_index(&self) -> Result<()> {
        let names = &self.config.collections;

        let sources = CopyJob::index(SOURCE_COLLECTION, &names.source_ids, doc! {});
        copy_documents(&self.store, &sources, self.config.batch_size).await?;

        let versions = CopyJob::index(
            SOURCE_VERSION_COLLECTION,
            &names.source_version_ids,
            doc! { "mnemonic": { "$ne": HEAD_MNEMONIC } },
        );
        copy_documents(&self.store, &versions, self.config.batch_size).await?;

        Ok(())
    }
}
