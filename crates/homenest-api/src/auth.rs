//! # Access Guard
//!
//! Gates the property-creation route on caller identity.
//!
//! The check is delegated to an [`AccessPolicy`] held in [`AppState`], so a
//! policy that verifies real credentials can replace the default without
//! touching handlers. The default [`IdentityHeaderPolicy`] only checks that
//! an identity header (`user-email`) is present and non-empty; it does not
//! authenticate anyone.
//!
//! On success the guard stores a [`CallerIdentity`] in the request
//! extensions, where handlers extract it.

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::{HeaderMap, HeaderName, InvalidHeaderName};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the caller's identity unless configured otherwise.
pub const IDENTITY_HEADER: &str = "user-email";

/// Identity of the caller, as established by the access policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    /// The identity header value (an email address for the default policy).
    pub email: String,
}

/// Reason a request was denied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessDenied {
    #[error("missing or empty {0} header")]
    MissingIdentity(HeaderName),
}

/// Predicate over request metadata deciding whether a caller may proceed.
pub trait AccessPolicy: Send + Sync + 'static {
    fn authorize(&self, headers: &HeaderMap) -> Result<CallerIdentity, AccessDenied>;
}

/// Allows any request that carries a non-empty identity header.
///
/// Header names are case-insensitive. Values are trimmed; a value that is
/// empty after trimming counts as missing. Non-ASCII bytes are accepted and
/// decoded lossily.
#[derive(Debug, Clone)]
pub struct IdentityHeaderPolicy {
    header: HeaderName,
}

impl IdentityHeaderPolicy {
    pub fn new(header: HeaderName) -> Self {
        Self { header }
    }

    /// Build a policy from a configured header name.
    pub fn parse(header: &str) -> Result<Self, InvalidHeaderName> {
        HeaderName::try_from(header).map(Self::new)
    }

    pub fn header(&self) -> &HeaderName {
        &self.header
    }
}

impl Default for IdentityHeaderPolicy {
    fn default() -> Self {
        Self::new(HeaderName::from_static(IDENTITY_HEADER))
    }
}

impl AccessPolicy for IdentityHeaderPolicy {
    fn authorize(&self, headers: &HeaderMap) -> Result<CallerIdentity, AccessDenied> {
        headers
            .get(&self.header)
            .map(|value| String::from_utf8_lossy(value.as_bytes()))
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(|email| CallerIdentity { email })
            .ok_or_else(|| AccessDenied::MissingIdentity(self.header.clone()))
    }
}

/// Middleware applied to guarded routes.
///
/// Denied requests get a 401 and never reach the handler.
pub async fn require_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match state.access.authorize(request.headers()) {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(denied) => AppError::Unauthorized(denied.to_string()).into_response(),
    }
}

/// Extracts the identity that [`require_identity`] injected into extensions.
/// Returns 401 if the guard did not run on this route.
impl<S: Send + Sync> FromRequestParts<S> for CallerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("no caller identity in request context".into()))
    }
}
