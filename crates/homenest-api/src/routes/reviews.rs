//! # Reviews
//!
//! Routes:
//! - POST /reviews: Add a review (no access guard)
//! - GET  /reviews: List reviews, `?propertyId=` filter
//!
//! `propertyId` is stored as given; it is not checked against `properties`.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use homenest_store::codec::{self, ID};
use homenest_store::{Collection, Document, SortOrder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::error::{AppError, ErrorBody, Operation};
use crate::extractors::{extract_json, extract_query, non_empty, JsonObject};
use crate::state::AppState;

/// A stored review. Reviews carry arbitrary content fields besides these.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Review {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "propertyId")]
    pub property_id: String,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Response to a successful create. `data` echoes the stored review.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReviewCreated {
    pub success: bool,
    pub message: String,
    #[schema(value_type = Review)]
    pub data: JsonObject,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReviewQuery {
    /// Only reviews of this property. Empty means no filter.
    #[serde(rename = "propertyId")]
    pub property_id: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/reviews", get(list_reviews).post(create_review))
}

/// POST /reviews: Add a review.
#[utoipa::path(
    post,
    path = "/reviews",
    request_body = Review,
    responses(
        (status = 201, description = "Review added", body = ReviewCreated),
        (status = 400, description = "Malformed JSON", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody),
    ),
    tag = "reviews"
)]
pub async fn create_review(
    State(state): State<AppState>,
    body: Result<Json<JsonObject>, JsonRejection>,
) -> Result<(StatusCode, Json<ReviewCreated>), AppError> {
    let mut document = codec::document_from_json(extract_json(body)?);
    document.remove(ID);
    codec::stamp_created_at(&mut document, Utc::now());

    let ack = state
        .store
        .insert_one(Collection::Reviews, document.clone())
        .await
        .map_err(Operation::AddReview.failed())?;

    let mut data = codec::document_to_json(document);
    data.insert(ID.to_string(), Value::String(ack.inserted_id.to_hex()));

    tracing::info!(review_id = %ack.inserted_id, "review added");

    Ok((
        StatusCode::CREATED,
        Json(ReviewCreated {
            success: true,
            message: "Review added".to_string(),
            data,
        }),
    ))
}

/// GET /reviews: List reviews.
#[utoipa::path(
    get,
    path = "/reviews",
    params(ReviewQuery),
    responses(
        (status = 200, description = "Matching reviews", body = Vec<Review>),
        (status = 400, description = "Malformed query string", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody),
    ),
    tag = "reviews"
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    query: Result<Query<ReviewQuery>, QueryRejection>,
) -> Result<Json<Vec<JsonObject>>, AppError> {
    let query = extract_query(query)?;

    let mut filter = Document::new();
    if let Some(property_id) = non_empty(query.property_id) {
        filter.insert("propertyId", property_id);
    }

    let documents = state
        .store
        .find(Collection::Reviews, filter, SortOrder::Natural)
        .await
        .map_err(Operation::ListReviews.failed())?;

    Ok(Json(
        documents.into_iter().map(codec::document_to_json).collect(),
    ))
}
