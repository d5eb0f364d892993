//! Ambulatorio HTTP server.
//!
//! Every route lives under `/api`. Handlers authenticate with [`auth::AuthUser`]
//! and delegate to [`AmbulatorioCore`], which applies the site checks.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use ambulatorio_core::AmbulatorioCore;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub core: Arc<AmbulatorioCore>,
}

impl AppState {
    pub fn new(core: Arc<AmbulatorioCore>) -> Self {
        Self { core }
    }
}

/// Build the application router.
pub fn app(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .nest("/api", routes::router())
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
