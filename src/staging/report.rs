//! End-of-run report

use std::fmt;

use crate::db::schemas::StagingCollections;
use crate::db::DocumentStore;
use crate::types::Result;

/// Document counts of the staging collections after a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StagingReport {
    pub sources: u64,
    pub source_versions: u64,
    pub source_ids: u64,
    pub source_version_ids: u64,
}

impl StagingReport {
    /// Count what is now present in each staging collection
    pub async fn collect<S: DocumentStore + ?Sized>(
        store: &S,
        collections: &StagingCollections,
    ) -> Result<Self> {
        Ok(Self {
            sources: store.count(&collections.sources).await?,
            source_versions: store.count(&collections.source_versions).await?,
            source_ids: store.count(&collections.source_ids).await?,
            source_version_ids: store.count(&collections.source_version_ids).await?,
        })
    }
}

/// The two human-readable summary lines printed at the end of a run
impl fmt::Display for StagingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} matching source found", self.sources)?;
        write!(f, "{} matching sourceversion found", self.source_versions)
    }
}
