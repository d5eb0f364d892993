//! Route groups, one per resource.

mod appointments;
mod auth;
mod calendar;
mod documents;
mod forms;
mod patients;
mod photos;
mod statistics;

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .merge(auth::router())
        .merge(patients::router())
        .merge(appointments::router())
        .merge(forms::router())
        .merge(photos::router())
        .merge(documents::router())
        .merge(statistics::router())
        .merge(calendar::router())
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Ambulatorio Infermieristico API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Body returned by delete routes.
fn deleted(what: &str) -> Json<Value> {
    Json(json!({ "message": format!("{} deleted", what) }))
}
