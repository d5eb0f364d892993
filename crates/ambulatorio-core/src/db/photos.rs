//! Photo database operations.

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};

use super::{parse_column, Database, DbError, DbResult};
use crate::models::{Category, Photo, Site};

const PHOTO_COLUMNS: &str =
    "id, patient_id, site, category, description, date, content_type, sha256, image_data, created_at";

impl Database {
    /// Insert a new photo.
    pub fn insert_photo(&self, photo: &Photo) -> DbResult<()> {
        self.conn.execute(
            &format!(
                "INSERT INTO photos ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                PHOTO_COLUMNS
            ),
            params![
                photo.id,
                photo.patient_id,
                photo.site.as_str(),
                photo.category.as_str(),
                photo.description,
                photo.date,
                photo.content_type,
                photo.sha256,
                photo.image_data,
                photo.created_at,
            ],
        )?;
        Ok(())
    }

    /// Get a photo by ID.
    pub fn get_photo(&self, id: &str) -> DbResult<Option<Photo>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM photos WHERE id = ?", PHOTO_COLUMNS),
                [id],
                PhotoRow::from_row,
            )
            .optional()?
            .map(Photo::try_from)
            .transpose()
    }

    /// Photos for a patient at a site, most recent first.
    pub fn list_photos(
        &self,
        patient_id: &str,
        site: Site,
        category: Option<Category>,
    ) -> DbResult<Vec<Photo>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {}
            FROM photos
            WHERE patient_id = ?1
              AND site = ?2
              AND (?3 IS NULL OR category = ?3)
            ORDER BY date DESC, created_at DESC
            "#,
            PHOTO_COLUMNS
        ))?;

        let rows = stmt.query_map(
            params![patient_id, site.as_str(), category.map(|c| c.as_str())],
            PhotoRow::from_row,
        )?;

        let mut photos = Vec::new();
        for row in rows {
            photos.push(row?.try_into()?);
        }
        Ok(photos)
    }

    /// Delete a photo.
    pub fn delete_photo(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute("DELETE FROM photos WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}

/// Intermediate row struct for database mapping.
struct PhotoRow {
    id: String,
    patient_id: String,
    site: String,
    category: String,
    description: Option<String>,
    date: NaiveDate,
    content_type: String,
    sha256: String,
    image_data: Vec<u8>,
    created_at: String,
}

impl PhotoRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            patient_id: row.get(1)?,
            site: row.get(2)?,
            category: row.get(3)?,
            description: row.get(4)?,
            date: row.get(5)?,
            content_type: row.get(6)?,
            sha256: row.get(7)?,
            image_data: row.get(8)?,
            created_at: row.get(9)?,
        })
    }
}

impl TryFrom<PhotoRow> for Photo {
    type Error = DbError;

    fn try_from(row: PhotoRow) -> Result<Self, Self::Error> {
        Ok(Photo {
            id: row.id,
            patient_id: row.patient_id,
            site: parse_column(&row.site)?,
            category: parse_column(&row.category)?,
            description: row.description,
            date: row.date,
            content_type: row.content_type,
            sha256: row.sha256,
            image_data: row.image_data,
            created_at: row.created_at,
        })
    }
}
