//! MongoDB client implementing [`DocumentStore`]

use bson::{doc, Document};
use futures_util::{StreamExt, TryStreamExt};
use mongodb::{error::ErrorKind, options::ClientOptions, Client, Collection};
use std::time::Duration;
use tracing::{debug, info};

use crate::db::store::{DocumentStore, DocumentStream};
use crate::types::{Result, StagingError};

/// Server error code for an unknown collection
const NAMESPACE_NOT_FOUND: i32 = 26;

/// Server selection and connect timeout unless the URI sets its own
const FAIL_FAST_TIMEOUT: Duration = Duration::from_secs(3);

/// MongoDB client wrapper bound to one database
#[derive(Clone)]
pub struct MongoClient {
    client: Client,
    db_name: String,
}

impl MongoClient {
    /// Connect and verify the connection with a `ping`
    pub async fn new(uri: &str, db_name: &str) -> Result<Self> {
        info!("Connecting to MongoDB at {}", uri);

        let mut options = ClientOptions::parse(uri)
            .await
            .map_err(|e| StagingError::Config(format!("Invalid MongoDB URI: {}", e)))?;
        apply_fail_fast_timeouts(&mut options);

        let client = Client::with_options(options)
            .map_err(|e| StagingError::Database(format!("Failed to connect to MongoDB: {}", e)))?;

        client
            .database(db_name)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| StagingError::Database(format!("MongoDB ping failed: {}", e)))?;

        info!("Connected to MongoDB database '{}'", db_name);

        Ok(Self {
            client,
            db_name: db_name.to_string(),
        })
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.client.database(&self.db_name).collection::<Document>(name)
    }

    /// Get the database name
    pub fn db_name(&self) -> &str {
        &self.db_name
    }
}

/// Default the server selection and connect timeouts so an unreachable
/// server fails in seconds instead of hanging. Values set in the URI win.
fn apply_fail_fast_timeouts(options: &mut ClientOptions) {
    options.server_selection_timeout.get_or_insert(FAIL_FAST_TIMEOUT);
    options.connect_timeout.get_or_insert(FAIL_FAST_TIMEOUT);
}

fn is_namespace_not_found(err: &mongodb::error::Error) -> bool {
    matches!(err.kind.as_ref(), ErrorKind::Command(cmd) if cmd.code == NAMESPACE_NOT_FOUND)
}

#[async_trait::async_trait]
impl DocumentStore for MongoClient {
    async fn drop_collection(&self, name: &str) -> Result<()> {
        match self.collection(name).drop().await {
            Ok(()) => Ok(()),
            Err(e) if is_namespace_not_found(&e) => {
                debug!(collection = %name, "Collection did not exist");
                Ok(())
            }
            Err(e) => Err(StagingError::Database(format!(
                "Drop of '{}' failed: {}",
                name, e
            ))),
        }
    }

    async fn find(
        &self,
        name: &str,
        filter: Document,
        projection: Option<Document>,
    ) -> Result<DocumentStream> {
        let collection = self.collection(name);
        let mut find = collection.find(filter);
        if let Some(projection) = projection {
            find = find.projection(projection);
        }

        let cursor = find
            .await
            .map_err(|e| StagingError::Database(format!("Find on '{}' failed: {}", name, e)))?;

        Ok(cursor
            .map_err(|e| StagingError::Database(format!("Error reading document: {}", e)))
            .boxed())
    }

    async fn insert_many(&self, name: &str, docs: Vec<Document>) -> Result<u64> {
        let result = self
            .collection(name)
            .insert_many(docs)
            .await
            .map_err(|e| StagingError::Database(format!("Insert into '{}' failed: {}", name, e)))?;

        Ok(result.inserted_ids.len() as u64)
    }

    async fn count(&self, name: &str) -> Result<u64> {
        self.collection(name)
            .count_documents(doc! {})
            .await
            .map_err(|e| StagingError::Database(format!("Count of '{}' failed: {}", name, e)))
    }
}
