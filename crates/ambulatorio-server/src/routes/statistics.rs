use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use ambulatorio_core::{AmbulatorioError, Category, Comparison, Period, Site, StatisticsReport};

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct StatisticsParams {
    pub site: Site,
    pub year: i32,
    pub month: Option<u32>,
    pub category: Option<Category>,
}

#[derive(Debug, Deserialize)]
pub struct CompareParams {
    pub site: Site,
    pub year1: i32,
    pub month1: Option<u32>,
    /// Defaults to `year1`
    pub year2: Option<i32>,
    pub month2: Option<u32>,
    pub category: Option<Category>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/statistics", get(statistics))
        .route("/statistics/compare", get(compare))
}

fn period(year: i32, month: Option<u32>) -> Result<Period, AmbulatorioError> {
    Ok(Period::new(year, month)?)
}

async fn statistics(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Query(params): Query<StatisticsParams>,
) -> ApiResult<Json<StatisticsReport>> {
    let report = state.core.statistics(
        &caller,
        params.site,
        period(params.year, params.month)?,
        params.category,
    )?;
    Ok(Json(report))
}

async fn compare(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Query(params): Query<CompareParams>,
) -> ApiResult<Json<Comparison>> {
    let first = period(params.year1, params.month1)?;
    let second = period(params.year2.unwrap_or(params.year1), params.month2)?;
    let comparison = state
        .core
        .compare_statistics(&caller, params.site, first, second, params.category)?;
    Ok(Json(comparison))
}
