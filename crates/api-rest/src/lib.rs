//! # api-rest
//!
//! In-memory development backend for the clinic admin REST API.
//!
//! It serves the same paths, envelope and body encodings the `clinic-core` clients speak, so the
//! clients and the query layer can be exercised end to end without the production backend:
//! - `{status, message, data}` envelopes for every response, errors included
//! - JSON bodies, or multipart with file parts for resources that carry uploads
//! - a deterministic stand-in for the retinal prediction model
//!
//! Data lives in memory and is lost on restart.

#![warn(rust_2018_idioms)]

mod body;
mod error;
mod predict;
mod routes;
mod seed;
mod store;
mod tables;

pub use error::{ApiError, ApiResult};
pub use store::Store;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Request bodies above this size are refused before a handler runs.
pub const BODY_LIMIT_BYTES: usize = 8 * 1024 * 1024;

/// Shared handler state.
#[derive(Clone, Default)]
pub struct AppState {
    store: Arc<Store>,
}

impl AppState {
    pub fn new(store: Store) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// State preloaded with demo data.
    pub async fn seeded() -> Self {
        let store = Store::new();
        seed::seed(&store).await;
        Self::new(store)
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    routes::router()
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
