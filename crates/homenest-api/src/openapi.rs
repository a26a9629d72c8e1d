//! # OpenAPI Specification Assembly
//!
//! Assembles the utoipa-documented routes into a single OpenAPI 3.1 spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::auth::IDENTITY_HEADER;
use crate::state::AppState;

/// Registers the identity header as an API-key security scheme.
struct IdentityHeaderAddon;

impl Modify for IdentityHeaderAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "identity_header",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    IDENTITY_HEADER,
                    "Caller identity (an email address). Presence is checked, not verified.",
                ))),
            );
        }
    }
}

/// Assembled OpenAPI spec for the HomeNest API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "HomeNest API",
        description = "Property listing CRUD and property reviews.\n\nCreating a property requires the `user-email` header. All other routes are open.",
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server"),
    ),
    paths(
        crate::routes::properties::create_property,
        crate::routes::properties::list_properties,
        crate::routes::properties::get_property,
        crate::routes::properties::update_property,
        crate::routes::properties::delete_property,
        crate::routes::reviews::create_review,
        crate::routes::reviews::list_reviews,
    ),
    components(
        schemas(
            crate::error::ErrorBody,
            crate::routes::Acknowledgement,
            crate::routes::properties::Property,
            crate::routes::properties::PropertyCreated,
            crate::routes::reviews::Review,
            crate::routes::reviews::ReviewCreated,
        ),
    ),
    modifiers(&IdentityHeaderAddon),
    tags(
        (name = "properties", description = "Property listings"),
        (name = "reviews", description = "Reviews of property listings"),
    )
)]
pub struct ApiDoc;

/// Serves the OpenAPI JSON spec at `/openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
