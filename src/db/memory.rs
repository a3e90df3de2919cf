//! In-memory document store
//!
//! Mirrors the MongoDB semantics the staging pipeline relies on: equality,
//! `$eq`, `$ne` and `$in` filters, inclusion projections, natural insertion
//! order, generated `_id`s, duplicate key rejection and empty-batch
//! rejection. Anything else is reported as an error rather than guessed.

use bson::{doc, oid::ObjectId, Bson, Document};
use futures_util::{stream, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::db::store::{DocumentStore, DocumentStream};
use crate::types::{Result, StagingError};

/// Collections held in memory, in insertion order
#[derive(Clone)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<String, Vec<Document>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            collections: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Append documents to a collection as-is, creating it if needed
    pub async fn seed(&self, name: &str, docs: impl IntoIterator<Item = Document>) {
        self.collections
            .write()
            .await
            .entry(name.to_string())
            .or_default()
            .extend(docs);
    }

    /// Snapshot of a collection's documents
    pub async fn documents(&self, name: &str) -> Vec<Document> {
        self.collections
            .read()
            .await
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    /// Whether a collection currently exists
    pub async fn has_collection(&self, name: &str) -> bool {
        self.collections.read().await.contains_key(name)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn drop_collection(&self, name: &str) -> Result<()> {
        self.collections.write().await.remove(name);
        Ok(())
    }

    async fn find(
        &self,
        name: &str,
        filter: Document,
        projection: Option<Document>,
    ) -> Result<DocumentStream> {
        let collections = self.collections.read().await;
        let mut found = Vec::new();

        for doc in collections.get(name).into_iter().flatten() {
            if matches_filter(doc, &filter)? {
                found.push(match &projection {
                    Some(projection) => project(doc, projection),
                    None => doc.clone(),
                });
            }
        }

        Ok(stream::iter(found.into_iter().map(Ok)).boxed())
    }

    async fn insert_many(&self, name: &str, docs: Vec<Document>) -> Result<u64> {
        if docs.is_empty() {
            return Err(StagingError::Database(
                "Invalid BulkOperation, Batch cannot be empty".to_string(),
            ));
        }

        let mut collections = self.collections.write().await;
        let collection = collections.entry(name.to_string()).or_default();

        let mut prepared: Vec<Document> = Vec::with_capacity(docs.len());
        for doc in docs {
            let doc = ensure_id(doc);
            let id = doc.get("_id");
            let duplicate = collection
                .iter()
                .chain(prepared.iter())
                .any(|existing| existing.get("_id") == id);
            if duplicate {
                return Err(StagingError::Database(format!(
                    "E11000 duplicate key error collection: {} dup key: {{ _id: {} }}",
                    name,
                    id.map(ToString::to_string).unwrap_or_default()
                )));
            }
            prepared.push(doc);
        }

        let inserted = prepared.len() as u64;
        collection.extend(prepared);
        Ok(inserted)
    }

    async fn count(&self, name: &str) -> Result<u64> {
        Ok(self
            .collections
            .read()
            .await
            .get(name)
            .map_or(0, |docs| docs.len() as u64))
    }
}

/// Give a document a generated `_id` (first, as the server does) if it has none
fn ensure_id(doc: Document) -> Document {
    if doc.contains_key("_id") {
        return doc;
    }
    let mut with_id = doc! { "_id": ObjectId::new() };
    with_id.extend(doc);
    with_id
}

fn is_operator_document(condition: &Bson) -> bool {
    match condition {
        Bson::Document(ops) => ops.keys().next().is_some_and(|k| k.starts_with('$')),
        _ => false,
    }
}

fn matches_filter(doc: &Document, filter: &Document) -> Result<bool> {
    for (field, condition) in filter {
        let value = doc.get(field);
        let matched = match condition {
            Bson::Document(ops) if is_operator_document(condition) => {
                matches_operators(value, ops)?
            }
            expected => value == Some(expected),
        };
        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

fn matches_operators(value: Option<&Bson>, ops: &Document) -> Result<bool> {
    for (op, operand) in ops {
        let matched = match op.as_str() {
            "$eq" => value == Some(operand),
            // A missing field is "not equal"
            "$ne" => value != Some(operand),
            "$in" => match operand {
                Bson::Array(candidates) => value.is_some_and(|v| candidates.contains(v)),
                _ => {
                    return Err(StagingError::Database("$in needs an array".to_string()));
                }
            },
            other => {
                return Err(StagingError::Database(format!(
                    "Unsupported query operator: {}",
                    other
                )));
            }
        };
        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

fn is_truthy(flag: &Bson) -> bool {
    match flag {
        Bson::Boolean(b) => *b,
        Bson::Int32(n) => *n != 0,
        Bson::Int64(n) => *n != 0,
        Bson::Double(n) => *n != 0.0,
        _ => true,
    }
}

/// Apply an inclusion projection; `_id` is kept unless excluded explicitly
fn project(doc: &Document, projection: &Document) -> Document {
    let mut projected = Document::new();

    if projection.get("_id").map_or(true, is_truthy) {
        if let Some(id) = doc.get("_id") {
            projected.insert("_id", id.clone());
        }
    }

    for (field, flag) in projection {
        if field == "_id" || !is_truthy(flag) {
            continue;
        }
        if let Some(value) = doc.get(field) {
            projected.insert(field.clone(), value.clone());
        }
    }

    projected
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::TryStreamExt;
    use tokio_test::{assert_err, assert_ok};

    async fn find_all(
        store: &MemoryStore,
        filter: Document,
        projection: Option<Document>,
    ) -> Vec<Document> {
        store
            .find("things", filter, projection)
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap()
    }

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .seed(
                "things",
                vec![
                    doc! { "_id": "a", "mnemonic": "HEAD", "uri": "/a/", "extra": 1 },
                    doc! { "_id": "b", "mnemonic": "1.0", "uri": "/b/" },
                    doc! { "_id": "c" },
                ],
            )
            .await;
        store
    }

    #[tokio::test]
    async fn test_equality_and_in_filters() {
        let store = seeded().await;

        let found = find_all(&store, doc! { "mnemonic": "1.0" }, None).await;
        assert_eq!(found, vec![doc! { "_id": "b", "mnemonic": "1.0", "uri": "/b/" }]);

        let found = find_all(&store, doc! { "_id": { "$in": ["a", "c", "z"] } }, None).await;
        let ids: Vec<_> = found.iter().map(|d| d.get_str("_id").unwrap()).collect();
        assert_eq!(ids, vec!["a", "c"]);

        let found = find_all(&store, doc! { "_id": { "$in": [] } }, None).await;
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_ne_matches_missing_field() {
        let store = seeded().await;
        let found = find_all(&store, doc! { "mnemonic": { "$ne": "HEAD" } }, None).await;
        let ids: Vec<_> = found.iter().map(|d| d.get_str("_id").unwrap()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[tokio::test]
    async fn test_inclusion_projection() {
        let store = seeded().await;
        let found = find_all(&store, doc! {}, Some(doc! { "_id": 1, "uri": 1 })).await;
        assert_eq!(
            found,
            vec![
                doc! { "_id": "a", "uri": "/a/" },
                doc! { "_id": "b", "uri": "/b/" },
                doc! { "_id": "c" },
            ]
        );

        let found = find_all(&store, doc! { "_id": "a" }, Some(doc! { "_id": 0, "uri": 1 })).await;
        assert_eq!(found, vec![doc! { "uri": "/a/" }]);
    }

    #[tokio::test]
    async fn test_unsupported_operator_is_an_error() {
        let store = seeded().await;
        let result = store.find("things", doc! { "n": { "$gt": 1 } }, None).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_missing_collection_reads_empty() {
        let store = MemoryStore::new();
        assert!(find_all(&store, doc! {}, None).await.is_empty());
        assert_eq!(store.count("things").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_insert_rejects_empty_batch_and_duplicates() {
        let store = seeded().await;
        assert_err!(store.insert_many("things", vec![]).await);
        assert_err!(store.insert_many("things", vec![doc! { "_id": "a" }]).await);
        assert_err!(
            store
                .insert_many("things", vec![doc! { "_id": "x" }, doc! { "_id": "x" }])
                .await
        );
        assert_eq!(store.count("things").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_insert_generates_leading_id() {
        let store = MemoryStore::new();
        let inserted = assert_ok!(store.insert_many("things", vec![doc! { "uri": "/x/" }]).await);
        assert_eq!(inserted, 1);

        let docs = store.documents("things").await;
        assert_eq!(docs[0].keys().next().map(String::as_str), Some("_id"));
        assert!(docs[0].get_object_id("_id").is_ok());
    }

    #[tokio::test]
    async fn test_drop_collection() {
        let store = seeded().await;
        assert!(store.has_collection("things").await);
        assert_ok!(store.drop_collection("things").await);
        assert!(!store.has_collection("things").await);
        // Dropping again is a no-op
        assert_ok!(store.drop_collection("things").await);
    }
}
