//! Rulebook backend library.
//!
//! Stores and serves coding-convention metadata (architectures, layers,
//! modules, conventions, coding rules and their checklist items,
//! zero-tolerance rules, examples, and templates) over a REST API built
//! around cursor slice pagination.

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod db;
pub mod slice;

use crate::config::Config;
use crate::db::Database;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Database,
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Health endpoints (no /api prefix)
        .merge(api::health::router())
        .nest("/api", api::architectures::router())
        .nest("/api", api::layers::router())
        .nest("/api", api::conventions::router())
        .nest("/api", api::coding_rules::router())
        .nest("/api", api::templates::router())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
