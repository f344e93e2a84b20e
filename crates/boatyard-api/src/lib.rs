//! boatyard-api - HTTP surface for exporting and importing data bundles.

pub mod config;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use boatyard_core::{MemoryStore, RecordStore};

pub use config::{ServerConfig, StoreBackend};
pub use error::ApiError;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub backend: StoreBackend,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, backend: StoreBackend) -> Self {
        Self { store, backend }
    }

    /// State backed by an empty in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), StoreBackend::Memory)
    }
}

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// All routes with tracing, request ids, and a bundle-sized body limit.
pub fn router(state: AppState, max_bundle_bytes: usize) -> Router {
    use handlers::{health, transfer};

    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/v1/transfer/export", post(transfer::export_bundle))
        .route("/api/v1/transfer/validate", post(transfer::validate_bundle))
        .route("/api/v1/transfer/preview", post(transfer::preview_bundle))
        .route("/api/v1/transfer/import", post(transfer::import_bundle))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        // Body size is governed by RequestBodyLimitLayer alone.
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_bundle_bytes))
        .with_state(state)
}
