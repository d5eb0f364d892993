//! Care forms. Write-once: create, list and fetch only.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use ambulatorio_core::{
    CatheterMonthlyLog, CatheterPlacementForm, NewCatheterMonthlyLog, NewCatheterPlacementForm,
    NewWoundDressingForm, Site, WoundDressingForm,
};

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PatientFormsParams {
    pub patient_id: String,
    pub site: Site,
}

#[derive(Debug, Deserialize)]
pub struct MonthlyLogParams {
    pub patient_id: String,
    pub site: Site,
    pub month: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/wound-dressing-forms",
            post(create_wound_form).get(list_wound_forms),
        )
        .route("/wound-dressing-forms/:id", get(get_wound_form))
        .route(
            "/catheter-placement-forms",
            post(create_placement_form).get(list_placement_forms),
        )
        .route("/catheter-placement-forms/:id", get(get_placement_form))
        .route(
            "/catheter-monthly-logs",
            post(create_monthly_log).get(list_monthly_logs),
        )
        .route("/catheter-monthly-logs/:id", get(get_monthly_log))
}

// =========================================================================
// Wound dressing
// =========================================================================

async fn create_wound_form(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(req): Json<NewWoundDressingForm>,
) -> ApiResult<(StatusCode, Json<WoundDressingForm>)> {
    let form = state.core.create_wound_form(&caller, req)?;
    Ok((StatusCode::CREATED, Json(form)))
}

async fn list_wound_forms(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Query(params): Query<PatientFormsParams>,
) -> ApiResult<Json<Vec<WoundDressingForm>>> {
    let forms = state
        .core
        .list_wound_forms(&caller, &params.patient_id, params.site)?;
    Ok(Json(forms))
}

async fn get_wound_form(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<WoundDressingForm>> {
    Ok(Json(state.core.get_wound_form(&caller, &id)?))
}

// =========================================================================
// Catheter placement
// =========================================================================

async fn create_placement_form(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(req): Json<NewCatheterPlacementForm>,
) -> ApiResult<(StatusCode, Json<CatheterPlacementForm>)> {
    let form = state.core.create_placement_form(&caller, req)?;
    Ok((StatusCode::CREATED, Json(form)))
}

async fn list_placement_forms(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Query(params): Query<PatientFormsParams>,
) -> ApiResult<Json<Vec<CatheterPlacementForm>>> {
    let forms = state
        .core
        .list_placement_forms(&caller, &params.patient_id, params.site)?;
    Ok(Json(forms))
}

async fn get_placement_form(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<CatheterPlacementForm>> {
    Ok(Json(state.core.get_placement_form(&caller, &id)?))
}

// =========================================================================
// Monthly logs
// =========================================================================

async fn create_monthly_log(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(req): Json<NewCatheterMonthlyLog>,
) -> ApiResult<(StatusCode, Json<CatheterMonthlyLog>)> {
    let log = state.core.create_monthly_log(&caller, req)?;
    Ok((StatusCode::CREATED, Json(log)))
}

async fn list_monthly_logs(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Query(params): Query<MonthlyLogParams>,
) -> ApiResult<Json<Vec<CatheterMonthlyLog>>> {
    let logs = state.core.list_monthly_logs(
        &caller,
        &params.patient_id,
        params.site,
        params.month.as_deref(),
    )?;
    Ok(Json(logs))
}

async fn get_monthly_log(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<CatheterMonthlyLog>> {
    Ok(Json(state.core.get_monthly_log(&caller, &id)?))
}
