//! Value types shared by every store backend.

use mongodb::bson::oid::ObjectId;
use serde::{Serialize, Serializer};

/// The two collections of the HomeNest database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Properties,
    Reviews,
}

impl Collection {
    /// Collection name in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Properties => "properties",
            Self::Reviews => "reviews",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result ordering for [`DocumentStore::find`](crate::DocumentStore::find).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Whatever order the backend returns (insertion order in memory).
    #[default]
    Natural,
    /// `createdAt` descending. Documents without `createdAt` come last.
    NewestFirst,
}

/// Acknowledgment of a successful insert.
///
/// Serializes as `{"acknowledged": true, "insertedId": "<24 hex>"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertAck {
    pub acknowledged: bool,
    #[serde(serialize_with = "serialize_hex")]
    pub inserted_id: ObjectId,
}

impl InsertAck {
    pub fn new(inserted_id: ObjectId) -> Self {
        Self {
            acknowledged: true,
            inserted_id,
        }
    }
}

fn serialize_hex<S: Serializer>(id: &ObjectId, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&id.to_hex())
}

/// Counts reported by an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateOutcome {
    /// Documents that matched the id.
    pub matched: u64,
    /// Documents whose contents actually changed.
    pub modified: u64,
}
