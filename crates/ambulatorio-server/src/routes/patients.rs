use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;

use ambulatorio_core::models::PatientStatus;
use ambulatorio_core::{NewPatient, Patient, PatientQuery, PatientType, PatientUpdate, Site};

use super::deleted;
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListPatientsParams {
    pub site: Site,
    pub status: Option<PatientStatus>,
    pub patient_type: Option<PatientType>,
    pub search: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/patients", post(create_patient).get(list_patients))
        .route(
            "/patients/:id",
            get(get_patient).put(update_patient).delete(delete_patient),
        )
}

async fn create_patient(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(req): Json<NewPatient>,
) -> ApiResult<(StatusCode, Json<Patient>)> {
    let patient = state.core.create_patient(&caller, req)?;
    Ok((StatusCode::CREATED, Json(patient)))
}

async fn list_patients(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Query(params): Query<ListPatientsParams>,
) -> ApiResult<Json<Vec<Patient>>> {
    let query = PatientQuery {
        status: params.status,
        patient_type: params.patient_type,
        search: params.search.filter(|s| !s.trim().is_empty()),
    };
    Ok(Json(state.core.list_patients(&caller, params.site, &query)?))
}

async fn get_patient(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Patient>> {
    Ok(Json(state.core.get_patient(&caller, &id)?))
}

async fn update_patient(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
    Json(update): Json<PatientUpdate>,
) -> ApiResult<Json<Patient>> {
    Ok(Json(state.core.update_patient(&caller, &id, update)?))
}

async fn delete_patient(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.core.delete_patient(&caller, &id)?;
    Ok(deleted("Patient"))
}
