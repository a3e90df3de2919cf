//! Organization scope and its resolution to ids

use bson::{doc, Document};
use futures_util::StreamExt;
use std::collections::BTreeSet;
use tracing::{debug, info};

use crate::db::schemas::{IdSet, ORGANIZATION_COLLECTION, SOURCE_COLLECTION};
use crate::db::DocumentStore;
use crate::types::Result;

/// Organizations whose sources are staged for export
pub const DEFAULT_ORG_MNEMONICS: [&str; 3] = ["EthiopiaNHDD", "MSFOCP", "Malawi-Demo"];

/// Set of organization mnemonics selecting what gets staged.
///
/// Mnemonics are matched exactly and case-sensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingScope {
    mnemonics: BTreeSet<String>,
}

impl StagingScope {
    pub fn new<I, S>(mnemonics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            mnemonics: mnemonics.into_iter().map(Into::into).collect(),
        }
    }

    pub fn mnemonics(&self) -> impl Iterator<Item = &str> {
        self.mnemonics.iter().map(String::as_str)
    }

    pub fn contains(&self, mnemonic: &str) -> bool {
        self.mnemonics.contains(mnemonic)
    }

    pub fn is_empty(&self) -> bool {
        self.mnemonics.is_empty()
    }

    fn organization_filter(&self) -> Document {
        let mnemonics: Vec<&str> = self.mnemonics().collect();
        doc! { "mnemonic": { "$in": mnemonics } }
    }
}

impl Default for StagingScope {
    fn default() -> Self {
        Self::new(DEFAULT_ORG_MNEMONICS)
    }
}

/// Ids the scope resolved to
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedScope {
    /// Organizations whose mnemonic is in scope
    pub org_ids: IdSet,
    /// Sources owned by those organizations
    pub source_ids: IdSet,
}

/// Filter selecting sources owned by the given organizations
pub(crate) fn sources_owned_by(org_ids: &IdSet) -> Document {
    doc! { "parent_id": { "$in": org_ids.membership_values() } }
}

/// Collect the `_id` of every document matching `filter`
async fn collect_ids<S: DocumentStore + ?Sized>(
    store: &S,
    collection: &str,
    filter: Document,
) -> Result<IdSet> {
    let mut stream = store
        .find(collection, filter, Some(doc! { "_id": 1 }))
        .await?;

    let mut ids = IdSet::new();
    while let Some(doc) = stream.next().await {
        let doc = doc?;
        match doc.get("_id") {
            Some(id) => {
                ids.insert(id.clone());
            }
            None => debug!(collection = %collection, "Skipping document without _id"),
        }
    }
    Ok(ids)
}

/// Resolve organization mnemonics to organization ids, then to source ids
pub async fn resolve_scope<S: DocumentStore + ?Sized>(
    store: &S,
    scope: &StagingScope,
) -> Result<ResolvedScope> {
    let org_ids = collect_ids(store, ORGANIZATION_COLLECTION, scope.organization_filter()).await?;
    debug!(orgs = ?org_ids.keys().collect::<Vec<_>>(), "Resolved organizations");

    let source_ids = collect_ids(store, SOURCE_COLLECTION, sources_owned_by(&org_ids)).await?;

    info!(
        organizations = org_ids.len(),
        sources = source_ids.len(),
        "Scope resolved"
    );

    Ok(ResolvedScope {
        org_ids,
        source_ids,
    })
}
