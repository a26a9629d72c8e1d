//! # MongoDB Backend
//!
//! [`DocumentStore`] over the official `mongodb` driver. The driver's
//! `Client` is itself a connection pool, so one `MongoStore` is built at
//! startup and cloned into the router state; it is never re-created per
//! request.
//!
//! Every operation runs under `tokio::time::timeout`. When the bound
//! elapses the in-flight future is dropped and the caller receives
//! [`StoreError::Timeout`].

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, Document};
use mongodb::options::{ClientOptions, ServerApi, ServerApiVersion};
use mongodb::{Client, Database};

use crate::error::StoreError;
use crate::memory::with_id;
use crate::types::{Collection, InsertAck, SortOrder, UpdateOutcome};
use crate::DocumentStore;

/// Connection settings for [`MongoStore`].
///
/// Custom `Debug` redacts the connection string, which usually embeds
/// credentials.
#[derive(Clone)]
pub struct MongoConfig {
    /// `mongodb://` or `mongodb+srv://` connection string.
    pub uri: String,
    /// Database holding the `properties` and `reviews` collections.
    pub database: String,
    /// Application name reported to the server.
    pub app_name: String,
    /// Upper bound for each store operation.
    pub timeout: Duration,
}

impl std::fmt::Debug for MongoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MongoConfig")
            .field("uri", &"[REDACTED]")
            .field("database", &self.database)
            .field("app_name", &self.app_name)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// MongoDB-backed document store.
#[derive(Debug, Clone)]
pub struct MongoStore {
    client: Client,
    database: Database,
    timeout: Duration,
}

impl MongoStore {
    /// Build the client, then ping the server once so a bad URI or
    /// unreachable cluster fails startup instead of the first request.
    pub async fn connect(config: &MongoConfig) -> Result<Self, StoreError> {
        let mut options = ClientOptions::parse(&config.uri).await?;
        options.app_name = Some(config.app_name.clone());
        options.server_api = Some(
            ServerApi::builder()
                .version(ServerApiVersion::V1)
                .strict(true)
                .deprecation_errors(true)
                .build(),
        );

        let client = Client::with_options(options)?;
        let store = Self {
            database: client.database(&config.database),
            client,
            timeout: config.timeout,
        };

        store.ping().await?;
        tracing::info!(database = %config.database, "connected to MongoDB");
        Ok(store)
    }

    fn collection(&self, collection: Collection) -> mongodb::Collection<Document> {
        self.database.collection::<Document>(collection.as_str())
    }

    async fn bounded<T, F>(&self, operation: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, mongodb::error::Error>>,
    {
        match tokio::time::timeout(self.timeout, operation).await {
            Ok(result) => result.map_err(StoreError::from),
            Err(_) => Err(StoreError::Timeout(self.timeout)),
        }
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn insert_one(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<InsertAck, StoreError> {
        let id = ObjectId::new();
        let coll = self.collection(collection);
        let document = with_id(id, document);
        self.bounded(async { coll.insert_one(document).await }).await?;
        Ok(InsertAck::new(id))
    }

    async fn find(
        &self,
        collection: Collection,
        filter: Document,
        sort: SortOrder,
    ) -> Result<Vec<Document>, StoreError> {
        let coll = self.collection(collection);
        self.bounded(async {
            let mut find = coll.find(filter);
            if sort == SortOrder::NewestFirst {
                find = find.sort(doc! { "createdAt": -1 });
            }
            find.await?.try_collect::<Vec<Document>>().await
        })
        .await
    }

    async fn find_by_id(
        &self,
        collection: Collection,
        id: ObjectId,
    ) -> Result<Option<Document>, StoreError> {
        let coll = self.collection(collection);
        self.bounded(async { coll.find_one(doc! { "_id": id }).await })
            .await
    }

    async fn update_by_id(
        &self,
        collection: Collection,
        id: ObjectId,
        set: Document,
    ) -> Result<UpdateOutcome, StoreError> {
        let coll = self.collection(collection);
        let result = self
            .bounded(async { coll.update_one(doc! { "_id": id }, doc! { "$set": set }).await })
            .await?;
        Ok(UpdateOutcome {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    async fn delete_by_id(&self, collection: Collection, id: ObjectId) -> Result<u64, StoreError> {
        let coll = self.collection(collection);
        let result = self
            .bounded(async { coll.delete_one(doc! { "_id": id }).await })
            .await?;
        Ok(result.deleted_count)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let admin = self.client.database("admin");
        self.bounded(async { admin.run_command(doc! { "ping": 1 }).await })
            .await?;
        Ok(())
    }
}
