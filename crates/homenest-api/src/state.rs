//! # Application State
//!
//! Shared state passed to every route handler through the `State`
//! extractor. Holds the process-wide store handle, created once in
//! `main` before the listener is bound and cloned (never re-created)
//! into each request.

use std::sync::Arc;

use homenest_store::{DocumentStore, MemoryStore, MongoStore, StoreError};
use metrics_exporter_prometheus::PrometheusHandle;

use crate::auth::{AccessPolicy, IdentityHeaderPolicy};
use crate::config::StoreSettings;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Document store for the `properties` and `reviews` collections.
    pub store: Arc<dyn DocumentStore>,
    /// Access Guard policy for protected routes.
    pub access: Arc<dyn AccessPolicy>,
    /// Prometheus handle; `/metrics` is mounted only when present.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// State over the given store with the default identity-header policy.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            access: Arc::new(IdentityHeaderPolicy::default()),
            metrics: None,
        }
    }

    /// State over a fresh, empty [`MemoryStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Replace the Access Guard policy.
    pub fn with_access_policy(mut self, policy: impl AccessPolicy) -> Self {
        self.access = Arc::new(policy);
        self
    }

    /// Enable the `/metrics` endpoint.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("metrics", &self.metrics.is_some())
            .finish_non_exhaustive()
    }
}

/// Open the document store described by the configuration.
///
/// Without database settings the API runs on an in-memory store; data does
/// not survive a restart. With settings, connection or ping failure is an
/// error and startup aborts.
pub async fn init_store(settings: Option<&StoreSettings>) -> Result<Arc<dyn DocumentStore>, StoreError> {
    let Some(settings) = settings else {
        tracing::warn!(
            "no database configured (MONGODB_URI or DB_USER/DB_PASSWORD); \
             running on the in-memory store. Data will not survive restarts."
        );
        return Ok(Arc::new(MemoryStore::new()));
    };

    let store = MongoStore::connect(&settings.mongo).await?;
    Ok(Arc::new(store))
}
