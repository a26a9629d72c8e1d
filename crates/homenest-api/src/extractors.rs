//! # Custom Extractors & Validation
//!
//! Helpers that turn axum extraction rejections into [`AppError`]s, plus
//! the truthiness rule used for required fields.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::Query;
use axum::Json;
use serde_json::{Map, Value};

use crate::error::AppError;

/// A JSON object request body.
pub type JsonObject = Map<String, Value>;

/// Trait for request types that validate rules beyond what serde checks.
pub trait Validate {
    /// Validate business rules. Returns the client-facing message on failure.
    fn validate(&self) -> Result<(), &'static str>;
}

/// Extract a JSON body, mapping deserialization errors to [`AppError::BadRequest`].
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Extract a JSON body and validate it using the [`Validate`] trait.
pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let value = extract_json(result)?;
    value.validate().map_err(AppError::Validation)?;
    Ok(value)
}

/// Extract query parameters, mapping parse errors to [`AppError::BadRequest`].
pub fn extract_query<T>(result: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    result
        .map(|Query(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Whether a JSON value counts as "present" for a required field.
///
/// Missing, `null`, `false`, `0`, `NaN` and `""` are all absent; any other
/// value, including empty arrays and objects, is present.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Treat an empty query parameter the same as an absent one.
pub fn non_empty(param: Option<String>) -> Option<String> {
    param.filter(|value| !value.is_empty())
}
