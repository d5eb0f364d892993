use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

use ambulatorio_core::{Category, NewPhoto, Photo, Site};

use super::deleted;
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Largest accepted upload body.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Deserialize)]
pub struct ListPhotosParams {
    pub patient_id: String,
    pub site: Site,
    pub category: Option<Category>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/photos",
            post(upload_photo)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
                .get(list_photos),
        )
        .route("/photos/:id", get(get_photo).delete(delete_photo))
}

/// Multipart fields collected before validation.
#[derive(Default)]
struct UploadForm {
    patient_id: Option<String>,
    site: Option<String>,
    category: Option<String>,
    date: Option<String>,
    description: Option<String>,
    file: Option<(String, Vec<u8>)>,
}

impl UploadForm {
    async fn read(mut multipart: Multipart) -> ApiResult<Self> {
        let mut form = UploadForm::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "patient_id" => form.patient_id = Some(field.text().await?),
                "site" => form.site = Some(field.text().await?),
                "category" => form.category = Some(field.text().await?),
                "date" => form.date = Some(field.text().await?),
                "description" => form.description = Some(field.text().await?),
                "file" => {
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    form.file = Some((content_type, field.bytes().await?.to_vec()));
                }
                other => tracing::debug!(field = %other, "ignoring multipart field"),
            }
        }
        Ok(form)
    }

    fn into_new_photo(self) -> ApiResult<NewPhoto> {
        let site: Site = required(self.site, "site")?
            .parse()
            .map_err(ApiError::InvalidInput)?;
        let category: Category = required(self.category, "category")?
            .parse()
            .map_err(ApiError::InvalidInput)?;
        let raw_date = required(self.date, "date")?;
        let date = NaiveDate::parse_from_str(&raw_date, "%Y-%m-%d")
            .map_err(|_| ApiError::InvalidInput(format!("Invalid date: {}", raw_date)))?;
        let (content_type, image_data) = required(self.file, "file")?;

        Ok(NewPhoto {
            patient_id: required(self.patient_id, "patient_id")?,
            site,
            category,
            description: self.description.filter(|d| !d.is_empty()),
            date,
            content_type,
            image_data,
        })
    }
}

fn required<T>(value: Option<T>, name: &str) -> ApiResult<T> {
    value.ok_or_else(|| ApiError::InvalidInput(format!("Missing field: {}", name)))
}

async fn upload_photo(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let new = UploadForm::read(multipart).await?.into_new_photo()?;
    let photo = state.core.upload_photo(&caller, new)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": photo.id,
            "sha256": photo.sha256,
            "message": "Photo uploaded",
        })),
    ))
}

async fn list_photos(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Query(params): Query<ListPhotosParams>,
) -> ApiResult<Json<Vec<Photo>>> {
    let photos = state
        .core
        .list_photos(&caller, &params.patient_id, params.site, params.category)?;
    Ok(Json(photos))
}

async fn get_photo(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Photo>> {
    Ok(Json(state.core.get_photo(&caller, &id)?))
}

async fn delete_photo(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.core.delete_photo(&caller, &id)?;
    Ok(deleted("Photo"))
}
