//! Upstream and staging collection names

/// Organizations, keyed by `mnemonic`
pub const ORGANIZATION_COLLECTION: &str = "orgs_organization";

/// Sources, owned by an organization through `parent_id`
pub const SOURCE_COLLECTION: &str = "sources_source";

/// Source versions, owned by a source through `versioned_object_id`
pub const SOURCE_VERSION_COLLECTION: &str = "sources_sourceversion";

/// Version mnemonic of the mutable "current" pointer of a source
pub const HEAD_MNEMONIC: &str = "HEAD";

/// The four staging collections rebuilt on every run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingCollections {
    /// Full source records in scope
    pub sources: String,
    /// `{_id, uri}` for every source
    pub source_ids: String,
    /// Full non-HEAD source version records in scope
    pub source_versions: String,
    /// `{_id, uri}` for every non-HEAD source version
    pub source_version_ids: String,
}

impl StagingCollections {
    /// Staging collection names under the given namespace prefix
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            sources: format!("{}.sources", prefix),
            source_ids: format!("{}.source_ids", prefix),
            source_versions: format!("{}.sourceversions", prefix),
            source_version_ids: format!("{}.sourceversion_ids", prefix),
        }
    }

    /// All staging collections, in reset order
    pub fn all(&self) -> [&str; 4] {
        [
            &self.sources,
            &self.source_ids,
            &self.source_versions,
            &self.source_version_ids,
        ]
    }
}

impl Default for StagingCollections {
    fn default() -> Self {
        Self::with_prefix("export")
    }
}
