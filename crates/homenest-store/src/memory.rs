//! # In-Memory Backend
//!
//! A [`DocumentStore`] over `parking_lot::RwLock`-guarded vectors, one per
//! collection. Locks are never held across `.await` points.
//!
//! Data lives only as long as the process. Used when no database is
//! configured and as the backend for tests.

use std::sync::Arc;

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Bson, Document};
use parking_lot::RwLock;

use crate::codec::{created_at_millis, ID};
use crate::error::StoreError;
use crate::types::{Collection, InsertAck, SortOrder, UpdateOutcome};
use crate::DocumentStore;

/// Cheaply cloneable in-memory store. All clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    properties: RwLock<Vec<Document>>,
    reviews: RwLock<Vec<Document>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn collection(&self, collection: Collection) -> &RwLock<Vec<Document>> {
        match collection {
            Collection::Properties => &self.inner.properties,
            Collection::Reviews => &self.inner.reviews,
        }
    }

    /// Number of documents in a collection.
    pub fn len(&self, collection: Collection) -> usize {
        self.collection(collection).read().len()
    }

    /// Whether a collection holds no documents.
    pub fn is_empty(&self, collection: Collection) -> bool {
        self.len(collection) == 0
    }
}

/// Build the stored form of a document: `_id` first, followed by the
/// remaining fields in their original order.
pub(crate) fn with_id(id: ObjectId, document: Document) -> Document {
    let mut stored = Document::new();
    stored.insert(ID, id);
    for (key, value) in document {
        if key != ID {
            stored.insert(key, value);
        }
    }
    stored
}

fn matches(document: &Document, filter: &Document) -> bool {
    filter
        .iter()
        .all(|(key, expected)| document.get(key) == Some(expected))
}

fn has_id(document: &Document, id: &ObjectId) -> bool {
    matches!(document.get(ID), Some(Bson::ObjectId(stored)) if stored == id)
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_one(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<InsertAck, StoreError> {
        let id = ObjectId::new();
        self.collection(collection)
            .write()
            .push(with_id(id, document));
        Ok(InsertAck::new(id))
    }

    async fn find(
        &self,
        collection: Collection,
        filter: Document,
        sort: SortOrder,
    ) -> Result<Vec<Document>, StoreError> {
        let mut found: Vec<Document> = self
            .collection(collection)
            .read()
            .iter()
            .filter(|doc| matches(doc, &filter))
            .cloned()
            .collect();

        if sort == SortOrder::NewestFirst {
            // Stable sort: equal timestamps keep insertion order. `None`
            // orders below every date, so undated documents land last.
            found.sort_by(|a, b| created_at_millis(b).cmp(&created_at_millis(a)));
        }
        Ok(found)
    }

    async fn find_by_id(
        &self,
        collection: Collection,
        id: ObjectId,
    ) -> Result<Option<Document>, StoreError> {
        Ok(self
            .collection(collection)
            .read()
            .iter()
            .find(|doc| has_id(doc, &id))
            .cloned())
    }

    async fn update_by_id(
        &self,
        collection: Collection,
        id: ObjectId,
        set: Document,
    ) -> Result<UpdateOutcome, StoreError> {
        let mut guard = self.collection(collection).write();
        let Some(document) = guard.iter_mut().find(|doc| has_id(doc, &id)) else {
            return Ok(UpdateOutcome::default());
        };

        let mut changed = false;
        for (key, value) in set {
            if key == ID {
                continue;
            }
            if document.get(&key) != Some(&value) {
                document.insert(key, value);
                changed = true;
            }
        }

        Ok(UpdateOutcome {
            matched: 1,
            modified: u64::from(changed),
        })
    }

    async fn delete_by_id(&self, collection: Collection, id: ObjectId) -> Result<u64, StoreError> {
        let mut guard = self.collection(collection).write();
        match guard.iter().position(|doc| has_id(doc, &id)) {
            Some(index) => {
                guard.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{datetime, CREATED_AT};
    use chrono::{Duration, Utc};
    use mongodb::bson::doc;

    #[tokio::test]
    async fn insert_assigns_fresh_id_first() {
        let store = MemoryStore::new();
        let client_id = ObjectId::new();
        let ack = store
            .insert_one(
                Collection::Properties,
                doc! { "name": "Flat", "_id": client_id },
            )
            .await
            .unwrap();
        assert!(ack.acknowledged);
        assert_ne!(ack.inserted_id, client_id);

        let stored = store
            .find_by_id(Collection::Properties, ack.inserted_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.keys().next().map(String::as_str), Some("_id"));
        assert_eq!(stored.get_str("name").unwrap(), "Flat");
    }

    #[tokio::test]
    async fn collections_are_independent() {
        let store = MemoryStore::new();
        store
            .insert_one(Collection::Reviews, doc! { "rating": 5 })
            .await
            .unwrap();
        assert!(store.is_empty(Collection::Properties));
        assert_eq!(store.len(Collection::Reviews), 1);
    }

    #[tokio::test]
    async fn find_filters_by_equality() {
        let store = MemoryStore::new();
        for email in ["a@x.com", "b@x.com", "a@x.com"] {
            store
                .insert_one(Collection::Properties, doc! { "userEmail": email })
                .await
                .unwrap();
        }

        let mine = store
            .find(
                Collection::Properties,
                doc! { "userEmail": "a@x.com" },
                SortOrder::Natural,
            )
            .await
            .unwrap();
        assert_eq!(mine.len(), 2);

        let all = store
            .find(Collection::Properties, doc! {}, SortOrder::Natural)
            .await
            .unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn natural_order_is_insertion_order() {
        let store = MemoryStore::new();
        for name in ["first", "second", "third"] {
            store
                .insert_one(Collection::Properties, doc! { "name": name })
                .await
                .unwrap();
        }
        let names: Vec<String> = store
            .find(Collection::Properties, doc! {}, SortOrder::Natural)
            .await
            .unwrap()
            .iter()
            .map(|d| d.get_str("name").unwrap().to_string())
            .collect();
        assert_eq!(names, ["first", "second", "third"]);
    }

    #[tokio::test]
    async fn newest_first_sorts_by_created_at_descending() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let rows = [
            ("old", Some(now - Duration::days(2))),
            ("undated", None),
            ("new", Some(now)),
            ("mid", Some(now - Duration::days(1))),
        ];
        for (name, at) in rows {
            let mut doc = doc! { "name": name };
            if let Some(at) = at {
                doc.insert(CREATED_AT, datetime(at));
            }
            store.insert_one(Collection::Properties, doc).await.unwrap();
        }

        let names: Vec<String> = store
            .find(Collection::Properties, doc! {}, SortOrder::NewestFirst)
            .await
            .unwrap()
            .iter()
            .map(|d| d.get_str("name").unwrap().to_string())
            .collect();
        assert_eq!(names, ["new", "mid", "old", "undated"]);
    }

    #[tokio::test]
    async fn update_reports_matched_and_modified() {
        let store = MemoryStore::new();
        let ack = store
            .insert_one(Collection::Properties, doc! { "name": "Flat", "price": 100 })
            .await
            .unwrap();

        let changed = store
            .update_by_id(
                Collection::Properties,
                ack.inserted_id,
                doc! { "price": 120 },
            )
            .await
            .unwrap();
        assert_eq!(changed, UpdateOutcome { matched: 1, modified: 1 });

        let unchanged = store
            .update_by_id(
                Collection::Properties,
                ack.inserted_id,
                doc! { "price": 120 },
            )
            .await
            .unwrap();
        assert_eq!(unchanged, UpdateOutcome { matched: 1, modified: 0 });

        let stored = store
            .find_by_id(Collection::Properties, ack.inserted_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.get_str("name").unwrap(), "Flat");
        assert_eq!(stored.get_i32("price").unwrap(), 120);
    }

    #[tokio::test]
    async fn update_missing_id_matches_nothing() {
        let store = MemoryStore::new();
        let outcome = store
            .update_by_id(Collection::Properties, ObjectId::new(), doc! { "a": 1 })
            .await
            .unwrap();
        assert_eq!(outcome, UpdateOutcome::default());
    }

    #[tokio::test]
    async fn delete_removes_once() {
        let store = MemoryStore::new();
        let ack = store
            .insert_one(Collection::Properties, doc! { "name": "Flat" })
            .await
            .unwrap();

        assert_eq!(
            store
                .delete_by_id(Collection::Properties, ack.inserted_id)
                .await
                .unwrap(),
            1
        );
        assert_eq!(
            store
                .delete_by_id(Collection::Properties, ack.inserted_id)
                .await
                .unwrap(),
            0
        );
        assert!(store.is_empty(Collection::Properties));
    }

    #[tokio::test]
    async fn clones_share_data() {
        let store = MemoryStore::new();
        let clone = store.clone();
        store
            .insert_one(Collection::Reviews, doc! { "propertyId": "p1" })
            .await
            .unwrap();
        assert_eq!(clone.len(Collection::Reviews), 1);
    }
}
