use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{post, put};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use ambulatorio_core::{
    Appointment, AppointmentFilter, AppointmentUpdate, Category, NewAppointment, Site,
};

use super::deleted;
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListAppointmentsParams {
    pub site: Site,
    pub date: Option<NaiveDate>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub category: Option<Category>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/appointments", post(create_appointment).get(list_appointments))
        .route(
            "/appointments/:id",
            put(update_appointment).delete(delete_appointment),
        )
}

async fn create_appointment(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(req): Json<NewAppointment>,
) -> ApiResult<(StatusCode, Json<Appointment>)> {
    let appointment = state.core.create_appointment(&caller, req)?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

async fn list_appointments(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Query(params): Query<ListAppointmentsParams>,
) -> ApiResult<Json<Vec<Appointment>>> {
    let filter = AppointmentFilter {
        date: params.date,
        date_from: params.date_from,
        date_to: params.date_to,
        category: params.category,
    };
    Ok(Json(state.core.list_appointments(&caller, params.site, &filter)?))
}

async fn update_appointment(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
    Json(update): Json<AppointmentUpdate>,
) -> ApiResult<Json<Appointment>> {
    Ok(Json(state.core.update_appointment(&caller, &id, update)?))
}

async fn delete_appointment(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.core.delete_appointment(&caller, &id)?;
    Ok(deleted("Appointment"))
}
