//! Appointment database operations.

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};

use super::{parse_column, Database, DbError, DbResult};
use crate::models::{Appointment, AppointmentFilter, Category, Site};

const APPOINTMENT_COLUMNS: &str = r#"
    id, patient_id, patient_first_name, patient_last_name, site, date, time,
    category, services, notes, completed, created_at, updated_at
"#;

impl Database {
    /// Insert a new appointment.
    pub fn insert_appointment(&self, appointment: &Appointment) -> DbResult<()> {
        let services_json = serde_json::to_string(&appointment.services)?;

        self.conn.execute(
            &format!(
                "INSERT INTO appointments ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                APPOINTMENT_COLUMNS
            ),
            params![
                appointment.id,
                appointment.patient_id,
                appointment.patient_first_name,
                appointment.patient_last_name,
                appointment.site.as_str(),
                appointment.date,
                appointment.time,
                appointment.category.as_str(),
                services_json,
                appointment.notes,
                appointment.completed,
                appointment.created_at,
                appointment.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Write the mutable columns of an existing appointment.
    pub fn update_appointment(&self, appointment: &Appointment) -> DbResult<bool> {
        let services_json = serde_json::to_string(&appointment.services)?;

        let rows_affected = self.conn.execute(
            r#"
            UPDATE appointments SET
                date = ?2,
                time = ?3,
                services = ?4,
                notes = ?5,
                completed = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
            params![
                appointment.id,
                appointment.date,
                appointment.time,
                services_json,
                appointment.notes,
                appointment.completed,
                appointment.updated_at,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get an appointment by ID.
    pub fn get_appointment(&self, id: &str) -> DbResult<Option<Appointment>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM appointments WHERE id = ?", APPOINTMENT_COLUMNS),
                [id],
                AppointmentRow::from_row,
            )
            .optional()?
            .map(Appointment::try_from)
            .transpose()
    }

    /// Number of appointments already booked in a slot.
    pub fn count_slot(
        &self,
        site: Site,
        date: NaiveDate,
        time: &str,
        category: Category,
    ) -> DbResult<usize> {
        let count: i64 = self.conn.query_row(
            r#"
            SELECT COUNT(*) FROM appointments
            WHERE site = ?1 AND date = ?2 AND time = ?3 AND category = ?4
            "#,
            params![site.as_str(), date, time, category.as_str()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// List appointments at a site, ordered by date then time.
    ///
    /// An exact `date` wins over a range; a range needs both ends.
    pub fn list_appointments(
        &self,
        site: Site,
        filter: &AppointmentFilter,
    ) -> DbResult<Vec<Appointment>> {
        let (from, to) = match (filter.date, filter.date_from, filter.date_to) {
            (Some(day), _, _) => (Some(day), Some(day)),
            (None, Some(from), Some(to)) => (Some(from), Some(to)),
            _ => (None, None),
        };

        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {}
            FROM appointments
            WHERE site = ?1
              AND (?2 IS NULL OR date >= ?2)
              AND (?3 IS NULL OR date <= ?3)
              AND (?4 IS NULL OR category = ?4)
            ORDER BY date, time
            "#,
            APPOINTMENT_COLUMNS
        ))?;

        let rows = stmt.query_map(
            params![site.as_str(), from, to, filter.category.map(|c| c.as_str())],
            AppointmentRow::from_row,
        )?;
        collect_appointments(rows)
    }

    /// Appointments with `start <= date < end`, for reporting.
    pub fn appointments_in_range(
        &self,
        site: Site,
        start: NaiveDate,
        end: NaiveDate,
        category: Option<Category>,
    ) -> DbResult<Vec<Appointment>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {}
            FROM appointments
            WHERE site = ?1
              AND date >= ?2
              AND date < ?3
              AND (?4 IS NULL OR category = ?4)
            ORDER BY date, time
            "#,
            APPOINTMENT_COLUMNS
        ))?;

        let rows = stmt.query_map(
            params![site.as_str(), start, end, category.map(|c| c.as_str())],
            AppointmentRow::from_row,
        )?;
        collect_appointments(rows)
    }

    /// Delete an appointment.
    pub fn delete_appointment(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM appointments WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}

fn collect_appointments(
    rows: impl Iterator<Item = rusqlite::Result<AppointmentRow>>,
) -> DbResult<Vec<Appointment>> {
    let mut appointments = Vec::new();
    for row in rows {
        appointments.push(row?.try_into()?);
    }
    Ok(appointments)
}

/// Intermediate row struct for database mapping.
struct AppointmentRow {
    id: String,
    patient_id: String,
    patient_first_name: Option<String>,
    patient_last_name: Option<String>,
    site: String,
    date: NaiveDate,
    time: String,
    category: String,
    services: String,
    notes: Option<String>,
    completed: bool,
    created_at: String,
    updated_at: String,
}

impl AppointmentRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            patient_id: row.get(1)?,
            patient_first_name: row.get(2)?,
            patient_last_name: row.get(3)?,
            site: row.get(4)?,
            date: row.get(5)?,
            time: row.get(6)?,
            category: row.get(7)?,
            services: row.get(8)?,
            notes: row.get(9)?,
            completed: row.get(10)?,
            created_at: row.get(11)?,
            updated_at: row.get(12)?,
        })
    }
}

impl TryFrom<AppointmentRow> for Appointment {
    type Error = DbError;

    fn try_from(row: AppointmentRow) -> Result<Self, Self::Error> {
        Ok(Appointment {
            id: row.id,
            patient_id: row.patient_id,
            patient_first_name: row.patient_first_name,
            patient_last_name: row.patient_last_name,
            site: parse_column(&row.site)?,
            date: row.date,
            time: row.time,
            category: parse_column(&row.category)?,
            services: serde_json::from_str(&row.services)?,
            notes: row.notes,
            completed: row.completed,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
