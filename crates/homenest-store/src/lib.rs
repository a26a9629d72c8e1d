//! # homenest-store: Document Store Adapter
//!
//! The persistence seam of the HomeNest API. Handlers talk to a
//! [`DocumentStore`] trait object and never to a database driver directly,
//! so the same handler code runs against MongoDB in production and an
//! in-memory backend in development and tests.
//!
//! ## Collections
//!
//! | Collection     | Holds                                   |
//! |----------------|-----------------------------------------|
//! | `properties`   | Property listings                       |
//! | `reviews`      | Reviews, referencing a property by id   |
//!
//! ## Backends
//!
//! - [`MemoryStore`]: `parking_lot::RwLock` over per-collection vectors.
//!   Insertion order is the natural order.
//! - [`MongoStore`]: the `mongodb` driver. One client is created at
//!   startup and shared by every request; each operation runs under a
//!   bounded timeout.
//!
//! ## Documents
//!
//! Documents are schema-free BSON. The [`codec`] module converts request
//! JSON into BSON and renders stored documents back to plain JSON
//! (`_id` as a 24-hex string, dates as ISO-8601 UTC).

pub mod codec;
pub mod error;
pub mod memory;
pub mod mongo;
pub mod types;

use async_trait::async_trait;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use mongo::{MongoConfig, MongoStore};
pub use mongodb::bson::oid::ObjectId;
pub use mongodb::bson::{doc, Bson, Document};
pub use types::{Collection, InsertAck, SortOrder, UpdateOutcome};

/// Operations the HTTP layer needs from a document database.
///
/// Every method maps to exactly one database round trip. Implementations
/// must be safe to share across concurrently running request handlers;
/// the API holds a single instance behind an `Arc` for the life of the
/// process.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Insert a document. The store assigns a fresh [`ObjectId`] as `_id`,
    /// replacing any `_id` already present.
    async fn insert_one(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<InsertAck, StoreError>;

    /// Return every document whose fields equal all pairs in `filter`.
    ///
    /// An empty filter matches the whole collection.
    async fn find(
        &self,
        collection: Collection,
        filter: Document,
        sort: SortOrder,
    ) -> Result<Vec<Document>, StoreError>;

    /// Look up a single document by identifier.
    async fn find_by_id(
        &self,
        collection: Collection,
        id: ObjectId,
    ) -> Result<Option<Document>, StoreError>;

    /// Overwrite the fields in `set` on the document with the given id,
    /// leaving all other fields untouched.
    async fn update_by_id(
        &self,
        collection: Collection,
        id: ObjectId,
        set: Document,
    ) -> Result<UpdateOutcome, StoreError>;

    /// Remove the document with the given id. Returns the deleted count.
    async fn delete_by_id(&self, collection: Collection, id: ObjectId) -> Result<u64, StoreError>;

    /// Round-trip to the backend to confirm it is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Parse a path segment as a store identifier.
///
/// Identifiers follow the 24-hex-character ObjectId convention. Anything
/// else is a [`StoreError::InvalidId`].
pub fn parse_object_id(raw: &str) -> Result<ObjectId, StoreError> {
    ObjectId::parse_str(raw).map_err(|_| StoreError::InvalidId(raw.to_string()))
}
