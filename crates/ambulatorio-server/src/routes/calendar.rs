//! Public calendar helpers. No authentication.

use axum::extract::Query;
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;

use ambulatorio_core::calendar::{self, TimeSlots};

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct HolidaysParams {
    pub year: i32,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/calendar/holidays", get(holidays))
        .route("/calendar/slots", get(slots))
}

async fn holidays(Query(params): Query<HolidaysParams>) -> Json<Vec<NaiveDate>> {
    Json(calendar::holidays(params.year))
}

async fn slots() -> Json<TimeSlots> {
    Json(calendar::time_slots())
}
