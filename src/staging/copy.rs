//! Bulk copy between collections
//!
//! Documents are streamed from the upstream cursor and written in batches,
//! so memory use is bounded by the batch size.

use bson::{doc, Document};
use futures_util::StreamExt;
use tracing::{debug, info, warn};

use crate::db::DocumentStore;
use crate::types::Result;

/// Fields kept in the `{_id, uri}` index collections
pub fn index_projection() -> Document {
    doc! { "_id": 1, "uri": 1 }
}

/// One filter-and-copy step
#[derive(Debug, Clone)]
pub struct CopyJob {
    /// Upstream collection
    pub from: String,
    /// Staging collection
    pub to: String,
    pub filter: Document,
    /// `None` copies whole documents
    pub projection: Option<Document>,
}

impl CopyJob {
    /// Copy whole documents matching `filter`
    pub fn full(from: &str, to: &str, filter: Document) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            filter,
            projection: None,
        }
    }

    /// Copy the `{_id, uri}` projection of documents matching `filter`
    pub fn index(from: &str, to: &str, filter: Document) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            filter,
            projection: Some(index_projection()),
        }
    }
}

/// What a copy wrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyOutcome {
    pub copied: u64,
    pub batches: u64,
    /// Documents written without a `uri` field
    pub missing_uri: u64,
}

/// Run a copy job. Empty results write nothing.
pub async fn copy_documents<S: DocumentStore + ?Sized>(
    store: &S,
    job: &CopyJob,
    batch_size: usize,
) -> Result<CopyOutcome> {
    let batch_size = batch_size.max(1);
    let mut outcome = CopyOutcome::default();
    let mut stream = store
        .find(&job.from, job.filter.clone(), job.projection.clone())
        .await?;

    let mut batch = Vec::with_capacity(batch_size);
    while let Some(doc) = stream.next().await {
        let doc = doc?;
        if !doc.contains_key("uri") {
            outcome.missing_uri += 1;
        }
        batch.push(doc);

        if batch.len() >= batch_size {
            flush(store, &job.to, &mut batch, &mut outcome).await?;
        }
    }
    if !batch.is_empty() {
        flush(store, &job.to, &mut batch, &mut outcome).await?;
    }

    if outcome.missing_uri > 0 {
        warn!(
            from = %job.from,
            to = %job.to,
            missing = outcome.missing_uri,
            "Copied documents without a uri"
        );
    }
    info!(
        from = %job.from,
        to = %job.to,
        copied = outcome.copied,
        batches = outcome.batches,
        "Copy complete"
    );

    Ok(outcome)
}

async fn flush<S: DocumentStore + ?Sized>(
    store: &S,
    to: &str,
    batch: &mut Vec<Document>,
    outcome: &mut CopyOutcome,
) -> Result<()> {
    let docs = std::mem::take(batch);
    let size = docs.len();
    outcome.copied += store.insert_many(to, docs).await?;
    outcome.batches += 1;
    debug!(collection = %to, size, "Wrote batch");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    async fn store_with(count: usize) -> MemoryStore {
        let store = MemoryStore::new();
        store
            .seed(
                "upstream",
                (0..count).map(|i| doc! { "_id": i as i64, "uri": format!("/s/{}/", i), "n": i as i64 }),
            )
            .await;
        store
    }

    #[tokio::test]
    async fn test_copy_in_batches() {
        let store = store_with(5).await;
        let job = CopyJob::full("upstream", "staged", doc! {});

        let outcome = copy_documents(&store, &job, 2).await.unwrap();

        assert_eq!(
            outcome,
            CopyOutcome {
                copied: 5,
                batches: 3,
                missing_uri: 0
            }
        );
        assert_eq!(store.documents("staged").await, store.documents("upstream").await);
    }

    #[tokio::test]
    async fn test_empty_match_writes_nothing() {
        let store = store_with(3).await;
        let job = CopyJob::full("upstream", "staged", doc! { "n": -1_i64 });

        let outcome = copy_documents(&store, &job, 10).await.unwrap();

        assert_eq!(outcome, CopyOutcome::default());
        assert!(!store.has_collection("staged").await);
    }

    #[tokio::test]
    async fn test_index_copy_keeps_id_and_uri() {
        let store = store_with(1).await;
        store
            .seed("upstream", vec![doc! { "_id": 99_i64, "n": 99_i64 }])
            .await;
        let job = CopyJob::index("upstream", "staged", doc! {});

        let outcome = copy_documents(&store, &job, 0).await.unwrap();

        assert_eq!(outcome.copied, 2);
        assert_eq!(outcome.missing_uri, 1);
        assert_eq!(
            store.documents("staged").await,
            vec![doc! { "_id": 0_i64, "uri": "/s/0/" }, doc! { "_id": 99_i64 }]
        );
    }
}
