//! # Route Modules
//!
//! Each module defines an Axum Router for one collection. Routers are
//! assembled in [`crate::app`].

pub mod properties;
pub mod reviews;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Success body without data: `{success?, message}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Acknowledgement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    pub message: String,
}

impl Acknowledgement {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: None,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: Some(true),
            message: message.into(),
        }
    }
}
