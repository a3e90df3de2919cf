//! Staging reset phase

use tracing::{debug, info};

use crate::db::schemas::StagingCollections;
use crate::db::DocumentStore;
use crate::types::Result;

/// Drop every staging collection. Missing collections are skipped silently.
pub async fn reset_staging<S: DocumentStore + ?Sized>(
    store: &S,
    collections: &StagingCollections,
) -> Result<()> {
    for name in collections.all() {
        store.drop_collection(name).await?;
        debug!(collection = %name, "Dropped staging collection");
    }
    info!("Staging collections reset");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use bson::doc;

    #[tokio::test]
    async fn test_reset_drops_existing_and_missing_collections() {
        let store = MemoryStore::new();
        let collections = StagingCollections::default();
        store
            .seed(&collections.sources, vec![doc! { "_id": "stale" }])
            .await;
        store.seed("sources_source", vec![doc! { "_id": "keep" }]).await;

        reset_staging(&store, &collections).await.unwrap();

        for name in collections.all() {
            assert!(!store.has_collection(name).await);
        }
        assert_eq!(store.count("sources_source").await.unwrap(), 1);
    }
}
