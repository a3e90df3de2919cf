//! Document store abstraction
//!
//! The staging pipeline only needs four primitives from the database. Keeping
//! them behind a trait lets the pipeline run against MongoDB in production
//! and against [`MemoryStore`](super::MemoryStore) in tests.

use bson::Document;
use futures_util::stream::BoxStream;

use crate::types::Result;

/// Stream of documents returned by [`DocumentStore::find`]
pub type DocumentStream = BoxStream<'static, Result<Document>>;

/// Trait for the collection operations used by staging (allows mocking in tests)
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Drop a collection. Dropping a missing collection succeeds.
    async fn drop_collection(&self, name: &str) -> Result<()>;

    /// Stream documents matching `filter`, optionally projected
    async fn find(
        &self,
        name: &str,
        filter: Document,
        projection: Option<Document>,
    ) -> Result<DocumentStream>;

    /// Insert a non-empty batch, returning the number of documents written
    async fn insert_many(&self, name: &str, docs: Vec<Document>) -> Result<u64>;

    /// Number of documents in a collection
    async fn count(&self, name: &str) -> Result<u64>;
}
