//! Patient database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{parse_column, Database, DbError, DbResult};
use crate::models::{Patient, PatientStatus, PatientType, Site};

const PATIENT_COLUMNS: &str = r#"
    id, first_name, last_name, patient_type, site, status, birth_date, tax_code,
    phone, email, general_practitioner, medical_history, current_therapy, allergies,
    lesion_markers, discharge_reason, discharge_notes, suspend_notes, created_at, updated_at
"#;

/// Filters for listing patients at a site.
#[derive(Debug, Clone, Default)]
pub struct PatientQuery {
    pub status: Option<PatientStatus>,
    pub patient_type: Option<PatientType>,
    /// Case-insensitive substring of first or last name
    pub search: Option<String>,
}

impl Database {
    /// Insert a new patient.
    pub fn insert_patient(&self, patient: &Patient) -> DbResult<()> {
        let markers_json = serde_json::to_string(&patient.lesion_markers)?;
        let discharge_reason = patient.discharge_reason.map(|r| r.as_str());

        self.conn.execute(
            &format!(
                "INSERT INTO patients ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)",
                PATIENT_COLUMNS
            ),
            params![
                patient.id,
                patient.first_name,
                patient.last_name,
                patient.patient_type.as_str(),
                patient.site.as_str(),
                patient.status.as_str(),
                patient.birth_date,
                patient.tax_code,
                patient.phone,
                patient.email,
                patient.general_practitioner,
                patient.medical_history,
                patient.current_therapy,
                patient.allergies,
                markers_json,
                discharge_reason,
                patient.discharge_notes,
                patient.suspend_notes,
                patient.created_at,
                patient.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Write every mutable column of an existing patient.
    pub fn update_patient(&self, patient: &Patient) -> DbResult<bool> {
        let markers_json = serde_json::to_string(&patient.lesion_markers)?;
        let discharge_reason = patient.discharge_reason.map(|r| r.as_str());

        let rows_affected = self.conn.execute(
            r#"
            UPDATE patients SET
                first_name = ?2,
                last_name = ?3,
                patient_type = ?4,
                status = ?5,
                birth_date = ?6,
                tax_code = ?7,
                phone = ?8,
                email = ?9,
                general_practitioner = ?10,
                medical_history = ?11,
                current_therapy = ?12,
                allergies = ?13,
                lesion_markers = ?14,
                discharge_reason = ?15,
                discharge_notes = ?16,
                suspend_notes = ?17,
                updated_at = ?18
            WHERE id = ?1
            "#,
            params![
                patient.id,
                patient.first_name,
                patient.last_name,
                patient.patient_type.as_str(),
                patient.status.as_str(),
                patient.birth_date,
                patient.tax_code,
                patient.phone,
                patient.email,
                patient.general_practitioner,
                patient.medical_history,
                patient.current_therapy,
                patient.allergies,
                markers_json,
                discharge_reason,
                patient.discharge_notes,
                patient.suspend_notes,
                patient.updated_at,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a patient by ID.
    pub fn get_patient(&self, id: &str) -> DbResult<Option<Patient>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM patients WHERE id = ?", PATIENT_COLUMNS),
                [id],
                PatientRow::from_row,
            )
            .optional()?
            .map(Patient::try_from)
            .transpose()
    }

    /// List patients at a site, ordered by last name.
    ///
    /// The name search runs after the query so that `%` and `_` match
    /// literally and case folding covers accented letters.
    pub fn list_patients(&self, site: Site, query: &PatientQuery) -> DbResult<Vec<Patient>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {}
            FROM patients
            WHERE site = ?1
              AND (?2 IS NULL OR status = ?2)
              AND (?3 IS NULL OR patient_type = ?3)
            ORDER BY last_name, first_name
            "#,
            PATIENT_COLUMNS
        ))?;

        let rows = stmt.query_map(
            params![
                site.as_str(),
                query.status.map(|s| s.as_str()),
                query.patient_type.map(|t| t.as_str()),
            ],
            PatientRow::from_row,
        )?;

        let needle = query.search.as_deref().map(str::to_lowercase);
        let mut patients = Vec::new();
        for row in rows {
            let patient: Patient = row?.try_into()?;
            if needle.as_deref().map_or(true, |n| name_matches(&patient, n)) {
                patients.push(patient);
            }
        }
        Ok(patients)
    }

    /// Delete a patient.
    pub fn delete_patient(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM patients WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}

fn name_matches(patient: &Patient, needle: &str) -> bool {
    patient.first_name.to_lowercase().contains(needle)
        || patient.last_name.to_lowercase().contains(needle)
}

/// Intermediate row struct for database mapping.
struct PatientRow {
    id: String,
    first_name: String,
    last_name: String,
    patient_type: String,
    site: String,
    status: String,
    birth_date: Option<String>,
    tax_code: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    general_practitioner: Option<String>,
    medical_history: Option<String>,
    current_therapy: Option<String>,
    allergies: Option<String>,
    lesion_markers: String,
    discharge_reason: Option<String>,
    discharge_notes: Option<String>,
    suspend_notes: Option<String>,
    created_at: String,
    updated_at: String,
}

impl PatientRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            patient_type: row.get(3)?,
            site: row.get(4)?,
            status: row.get(5)?,
            birth_date: row.get(6)?,
            tax_code: row.get(7)?,
            phone: row.get(8)?,
            email: row.get(9)?,
            general_practitioner: row.get(10)?,
            medical_history: row.get(11)?,
            current_therapy: row.get(12)?,
            allergies: row.get(13)?,
            lesion_markers: row.get(14)?,
            discharge_reason: row.get(15)?,
            discharge_notes: row.get(16)?,
            suspend_notes: row.get(17)?,
            created_at: row.get(18)?,
            updated_at: row.get(19)?,
        })
    }
}

impl TryFrom<PatientRow> for Patient {
    type Error = DbError;

    fn try_from(row: PatientRow) -> Result<Self, Self::Error> {
        Ok(Patient {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            patient_type: parse_column(&row.patient_type)?,
            site: parse_column(&row.site)?,
            status: parse_column(&row.status)?,
            birth_date: row.birth_date,
            tax_code: row.tax_code,
            phone: row.phone,
            email: row.email,
            general_practitioner: row.general_practitioner,
            medical_history: row.medical_history,
            current_therapy: row.current_therapy,
            allergies: row.allergies,
            lesion_markers: serde_json::from_str(&row.lesion_markers)?,
            discharge_reason: row.discharge_reason.as_deref().map(parse_column).transpose()?,
            discharge_notes: row.discharge_notes,
            suspend_notes: row.suspend_notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
