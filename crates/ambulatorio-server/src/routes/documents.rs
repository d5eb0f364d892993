use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use ambulatorio_core::{Category, DocumentTemplate, Site};

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct DocumentsParams {
    pub site: Site,
    pub category: Option<Category>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/documents", get(list_documents))
}

async fn list_documents(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Query(params): Query<DocumentsParams>,
) -> ApiResult<Json<Vec<DocumentTemplate>>> {
    Ok(Json(state.core.documents(&caller, params.site, params.category)?))
}
