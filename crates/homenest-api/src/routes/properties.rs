//! # Property Listings
//!
//! Routes:
//! - POST   /properties: Create a listing (identity header required)
//! - GET    /properties: List listings, `?userEmail=` filter, `?sort=newest`
//! - GET    /properties/{id}: Fetch one listing
//! - PUT    /properties/{id}: Overwrite the six listing fields
//! - DELETE /properties/{id}: Remove a listing
//!
//! Listings are schema-free documents. Only update validates its body.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use homenest_store::codec;
use homenest_store::{parse_object_id, Collection, Document, InsertAck, SortOrder};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::Acknowledgement;
use crate::auth::{self, CallerIdentity};
use crate::error::{AppError, ErrorBody, Operation};
use crate::extractors::{
    extract_json, extract_query, extract_validated_json, is_truthy, non_empty, JsonObject,
    Validate,
};
use crate::state::AppState;

/// Fields an update must carry, all truthy.
pub const REQUIRED_FIELDS: [&str; 6] = [
    "name",
    "description",
    "category",
    "price",
    "location",
    "imageURL",
];

/// A stored property listing, as rendered to clients.
///
/// Documented shape only; documents may carry further fields.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Property {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: f64,
    pub location: String,
    #[serde(rename = "imageURL")]
    pub image_url: String,
    #[serde(rename = "userEmail", default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Response to a successful create.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PropertyCreated {
    pub success: bool,
    pub message: String,
    /// `{acknowledged, insertedId}`
    #[schema(value_type = Object)]
    pub data: InsertAck,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PropertyQuery {
    /// Only listings owned by this email. Empty means no filter.
    #[serde(rename = "userEmail")]
    pub user_email: Option<String>,
    /// `newest` orders by `createdAt` descending.
    pub sort: Option<String>,
}

impl PropertyQuery {
    fn sort_order(&self) -> SortOrder {
        match self.sort.as_deref() {
            Some("newest") => SortOrder::NewestFirst,
            _ => SortOrder::Natural,
        }
    }
}

/// Update body. Any JSON object; [`REQUIRED_FIELDS`] must all be truthy.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct PropertyUpdate(pub JsonObject);

impl Validate for PropertyUpdate {
    fn validate(&self) -> Result<(), &'static str> {
        if REQUIRED_FIELDS
            .iter()
            .all(|field| is_truthy(self.0.get(*field)))
        {
            Ok(())
        } else {
            Err("All fields are required!")
        }
    }
}

impl PropertyUpdate {
    /// The `$set` document: the required fields and nothing else.
    pub fn into_set(mut self) -> Document {
        let mut set = Document::new();
        for field in REQUIRED_FIELDS {
            if let Some(value) = self.0.remove(field) {
                set.insert(field, codec::bson_from_json(value));
            }
        }
        set
    }
}

/// Build the property router. The create route sits behind the access guard.
pub fn router(state: AppState) -> Router<AppState> {
    let guarded_create =
        post(create_property).route_layer(from_fn_with_state(state, auth::require_identity));

    Router::new()
        .route("/properties", get(list_properties).merge(guarded_create))
        .route(
            "/properties/{id}",
            get(get_property)
                .put(update_property)
                .delete(delete_property),
        )
}

/// POST /properties: Create a property listing.
#[utoipa::path(
    post,
    path = "/properties",
    request_body = Property,
    security(("identity_header" = [])),
    responses(
        (status = 201, description = "Property added", body = PropertyCreated),
        (status = 400, description = "Malformed JSON", body = ErrorBody),
        (status = 401, description = "Missing identity header", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody),
    ),
    tag = "properties"
)]
pub async fn create_property(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<JsonObject>, JsonRejection>,
) -> Result<(StatusCode, Json<PropertyCreated>), AppError> {
    let mut document = codec::document_from_json(extract_json(body)?);
    codec::stamp_created_at(&mut document, Utc::now());

    let ack = state
        .store
        .insert_one(Collection::Properties, document)
        .await
        .map_err(Operation::AddProperty.failed())?;

    tracing::info!(property_id = %ack.inserted_id, caller = %caller.email, "property added");

    Ok((
        StatusCode::CREATED,
        Json(PropertyCreated {
            success: true,
            message: "Property added".to_string(),
            data: ack,
        }),
    ))
}

/// GET /properties: List property listings.
#[utoipa::path(
    get,
    path = "/properties",
    params(PropertyQuery),
    responses(
        (status = 200, description = "Matching listings", body = Vec<Property>),
        (status = 400, description = "Malformed query string", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody),
    ),
    tag = "properties"
)]
pub async fn list_properties(
    State(state): State<AppState>,
    query: Result<Query<PropertyQuery>, QueryRejection>,
) -> Result<Json<Vec<JsonObject>>, AppError> {
    let query = extract_query(query)?;
    let sort = query.sort_order();

    let mut filter = Document::new();
    if let Some(email) = non_empty(query.user_email) {
        filter.insert("userEmail", email);
    }

    let documents = state
        .store
        .find(Collection::Properties, filter, sort)
        .await
        .map_err(Operation::ListProperties.failed())?;

    Ok(Json(
        documents.into_iter().map(codec::document_to_json).collect(),
    ))
}

/// GET /properties/{id}: Fetch one listing.
///
/// A malformed id is a store failure (500), not a 404.
#[utoipa::path(
    get,
    path = "/properties/{id}",
    params(("id" = String, Path, description = "24-hex document id")),
    responses(
        (status = 200, description = "Listing found", body = Property),
        (status = 404, description = "Not found", body = ErrorBody),
        (status = 500, description = "Malformed id or store failure", body = ErrorBody),
    ),
    tag = "properties"
)]
pub async fn get_property(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JsonObject>, AppError> {
    let id = parse_object_id(&id).map_err(Operation::GetProperty.failed())?;

    state
        .store
        .find_by_id(Collection::Properties, id)
        .await
        .map_err(Operation::GetProperty.failed())?
        .map(|document| Json(codec::document_to_json(document)))
        .ok_or(AppError::NotFound(Operation::GetProperty))
}

/// PUT /properties/{id}: Overwrite the listing fields.
///
/// Not found and "nothing changed" both answer 404.
#[utoipa::path(
    put,
    path = "/properties/{id}",
    params(("id" = String, Path, description = "24-hex document id")),
    request_body = Property,
    responses(
        (status = 200, description = "Property updated", body = Acknowledgement),
        (status = 400, description = "Missing required field", body = ErrorBody),
        (status = 404, description = "Not found or no changes", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody),
    ),
    tag = "properties"
)]
pub async fn update_property(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<PropertyUpdate>, JsonRejection>,
) -> Result<Json<Acknowledgement>, AppError> {
    let update = extract_validated_json(body)?;
    let id = parse_object_id(&id).map_err(Operation::UpdateProperty.failed())?;

    let outcome = state
        .store
        .update_by_id(Collection::Properties, id, update.into_set())
        .await
        .map_err(Operation::UpdateProperty.failed())?;

    if outcome.modified == 0 {
        return Err(AppError::NotFound(Operation::UpdateProperty));
    }

    tracing::info!(property_id = %id, "property updated");
    Ok(Json(Acknowledgement::message("Property updated successfully!")))
}

/// DELETE /properties/{id}: Remove a listing.
#[utoipa::path(
    delete,
    path = "/properties/{id}",
    params(("id" = String, Path, description = "24-hex document id")),
    responses(
        (status = 200, description = "Property deleted", body = Acknowledgement),
        (status = 404, description = "Not found", body = ErrorBody),
        (status = 500, description = "Malformed id or store failure", body = ErrorBody),
    ),
    tag = "properties"
)]
pub async fn delete_property(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Acknowledgement>, AppError> {
    let id = parse_object_id(&id).map_err(Operation::DeleteProperty.failed())?;

    let deleted = state
        .store
        .delete_by_id(Collection::Properties, id)
        .await
        .map_err(Operation::DeleteProperty.failed())?;

    if deleted == 0 {
        return Err(AppError::NotFound(Operation::DeleteProperty));
    }

    tracing::info!(property_id = %id, "property deleted");
    Ok(Json(Acknowledgement::success("Property deleted")))
}
