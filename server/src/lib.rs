//! Credit score HTTP service.
//!
//! Wires the inference service into an axum router:
//!
//! ```text
//! ---------------------------------------------------------------
//! |                       credit-server                         |
//! |                                                             |
//! |  POST /predict  --> upload --> spawn_blocking --> service   |
//! |  POST /refit    --> upload --> spawn_blocking --> store     |
//! |  GET  /schema   --> column schema + classes                 |
//! |  GET  /health   --> version, uptime, fitted flag            |
//! |                                                             |
//! |  layers: TraceLayer, DefaultBodyLimit                       |
//! ---------------------------------------------------------------
//! ```
//!
//! Preprocessing and classification are CPU bound and run on the blocking
//! pool; handlers only parse the form and shape the response.

pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use config::ServerConfig;
pub use error::{ApiError, ErrorBody};
pub use state::AppState;

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let max_upload = state.max_upload_bytes;
    Router::new()
        .route("/predict", post(handlers::predict))
        .route("/refit", post(handlers::refit))
        .route("/schema", get(handlers::schema))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Initialize the tracing subscriber for logging.
pub fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
