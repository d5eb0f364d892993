//! Care-form database operations.
//!
//! Forms are write-once: each row keeps the full record as a JSON payload
//! next to the columns used for lookup and ordering.

use rusqlite::{params, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{Database, DbResult};
use crate::models::{CatheterMonthlyLog, CatheterPlacementForm, Site, WoundDressingForm};

/// Table layout shared by the three form kinds.
struct FormTable {
    name: &'static str,
    /// Column holding the form's own date key, also used for ordering
    key_column: &'static str,
}

const WOUND_DRESSING: FormTable = FormTable {
    name: "wound_dressing_forms",
    key_column: "compiled_on",
};

const CATHETER_PLACEMENT: FormTable = FormTable {
    name: "catheter_placement_forms",
    key_column: "placed_on",
};

const MONTHLY_LOG: FormTable = FormTable {
    name: "catheter_monthly_logs",
    key_column: "month",
};

impl Database {
    // =========================================================================
    // Wound dressing forms
    // =========================================================================

    pub fn insert_wound_form(&self, form: &WoundDressingForm) -> DbResult<()> {
        self.insert_form(
            &WOUND_DRESSING,
            &form.id,
            &form.patient_id,
            form.site,
            &form.compiled_on.to_string(),
            &form.created_at,
            form,
        )
    }

    pub fn get_wound_form(&self, id: &str) -> DbResult<Option<WoundDressingForm>> {
        self.get_form(&WOUND_DRESSING, id)
    }

    /// Forms for a patient at a site, newest first.
    pub fn list_wound_forms(&self, patient_id: &str, site: Site) -> DbResult<Vec<WoundDressingForm>> {
        self.list_forms(&WOUND_DRESSING, patient_id, site, None)
    }

    // =========================================================================
    // Catheter placement forms
    // =========================================================================

    pub fn insert_placement_form(&self, form: &CatheterPlacementForm) -> DbResult<()> {
        self.insert_form(
            &CATHETER_PLACEMENT,
            &form.id,
            &form.patient_id,
            form.site,
            &form.placed_on.to_string(),
            &form.created_at,
            form,
        )
    }

    pub fn get_placement_form(&self, id: &str) -> DbResult<Option<CatheterPlacementForm>> {
        self.get_form(&CATHETER_PLACEMENT, id)
    }

    /// Forms for a patient at a site, most recent placement first.
    pub fn list_placement_forms(
        &self,
        patient_id: &str,
        site: Site,
    ) -> DbResult<Vec<CatheterPlacementForm>> {
        self.list_forms(&CATHETER_PLACEMENT, patient_id, site, None)
    }

    // =========================================================================
    // Catheter monthly logs
    // =========================================================================

    pub fn insert_monthly_log(&self, log: &CatheterMonthlyLog) -> DbResult<()> {
        self.insert_form(
            &MONTHLY_LOG,
            &log.id,
            &log.patient_id,
            log.site,
            &log.month,
            &log.created_at,
            log,
        )
    }

    pub fn get_monthly_log(&self, id: &str) -> DbResult<Option<CatheterMonthlyLog>> {
        self.get_form(&MONTHLY_LOG, id)
    }

    /// Whether a log already exists for this patient, site and month.
    pub fn monthly_log_exists(&self, patient_id: &str, site: Site, month: &str) -> DbResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM catheter_monthly_logs WHERE patient_id = ?1 AND site = ?2 AND month = ?3",
            params![patient_id, site.as_str(), month],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Logs for a patient at a site, latest month first, optionally one month only.
    pub fn list_monthly_logs(
        &self,
        patient_id: &str,
        site: Site,
        month: Option<&str>,
    ) -> DbResult<Vec<CatheterMonthlyLog>> {
        self.list_forms(&MONTHLY_LOG, patient_id, site, month)
    }

    // =========================================================================
    // Shared
    // =========================================================================

    #[allow(clippy::too_many_arguments)]
    fn insert_form<T: Serialize>(
        &self,
        table: &FormTable,
        id: &str,
        patient_id: &str,
        site: Site,
        key: &str,
        created_at: &str,
        form: &T,
    ) -> DbResult<()> {
        let payload = serde_json::to_string(form)?;
        self.conn.execute(
            &format!(
                "INSERT INTO {} (id, patient_id, site, {}, payload, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                table.name, table.key_column
            ),
            params![id, patient_id, site.as_str(), key, payload, created_at],
        )?;
        Ok(())
    }

    fn get_form<T: DeserializeOwned>(&self, table: &FormTable, id: &str) -> DbResult<Option<T>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                &format!("SELECT payload FROM {} WHERE id = ?", table.name),
                [id],
                |row| row.get(0),
            )
            .optional()?;

        payload
            .map(|p| serde_json::from_str(&p))
            .transpose()
            .map_err(Into::into)
    }

    fn list_forms<T: DeserializeOwned>(
        &self,
        table: &FormTable,
        patient_id: &str,
        site: Site,
        key: Option<&str>,
    ) -> DbResult<Vec<T>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT payload FROM {table}
            WHERE patient_id = ?1
              AND site = ?2
              AND (?3 IS NULL OR {key} = ?3)
            ORDER BY {key} DESC, created_at DESC
            "#,
            table = table.name,
            key = table.key_column,
        ))?;

        let rows = stmt.query_map(params![patient_id, site.as_str(), key], |row| {
            row.get::<_, String>(0)
        })?;

        let mut forms = Vec::new();
        for row in rows {
            forms.push(serde_json::from_str(&row?)?);
        }
        Ok(forms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewCatheterMonthlyLog, NewWoundDressingForm};
    use chrono::NaiveDate;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn wound_form(patient: &str, day: u32) -> WoundDressingForm {
        WoundDressingForm::from(NewWoundDressingForm {
            patient_id: patient.into(),
            site: Site::PtaCentro,
            compiled_on: NaiveDate::from_ymd_opt(2026, 2, day).unwrap(),
            wound_bed: vec!["granulating".into()],
            margins: vec![],
            perilesional_skin: vec!["intact".into()],
            exudate_amount: Some("moderate".into()),
            exudate_type: vec!["serous".into()],
            dressing: "foam".into(),
            next_change: None,
            signature: Some("A.B.".into()),
            photo_ids: vec![],
        })
    }

    fn monthly_log(patient: &str, month: &str) -> CatheterMonthlyLog {
        CatheterMonthlyLog::from(NewCatheterMonthlyLog {
            patient_id: patient.into(),
            site: Site::VillaGinestre,
            month: month.into(),
            days: Default::default(),
            notes: None,
        })
    }

    #[test]
    fn test_wound_form_round_trip() {
        let db = setup_db();
        let form = wound_form("p1", 10);
        db.insert_wound_form(&form).unwrap();

        let retrieved = db.get_wound_form(&form.id).unwrap().unwrap();
        assert_eq!(retrieved, form);
        assert!(db.get_wound_form("missing").unwrap().is_none());
    }

    #[test]
    fn test_wound_forms_newest_first() {
        let db = setup_db();
        db.insert_wound_form(&wound_form("p1", 3)).unwrap();
        db.insert_wound_form(&wound_form("p1", 17)).unwrap();
        db.insert_wound_form(&wound_form("p2", 20)).unwrap();

        let forms = db.list_wound_forms("p1", Site::PtaCentro).unwrap();
        assert_eq!(forms.len(), 2);
        assert_eq!(forms[0].compiled_on.to_string(), "2026-02-17");

        assert!(db.list_wound_forms("p1", Site::VillaGinestre).unwrap().is_empty());
    }

    #[test]
    fn test_monthly_log_exists() {
        let db = setup_db();
        db.insert_monthly_log(&monthly_log("p1", "2026-04")).unwrap();

        assert!(db.monthly_log_exists("p1", Site::VillaGinestre, "2026-04").unwrap());
        assert!(!db.monthly_log_exists("p1", Site::VillaGinestre, "2026-05").unwrap());
        assert!(!db.monthly_log_exists("p1", Site::PtaCentro, "2026-04").unwrap());
        assert!(!db.monthly_log_exists("p2", Site::VillaGinestre, "2026-04").unwrap());
    }

    #[test]
    fn test_list_monthly_logs_by_month() {
        let db = setup_db();
        db.insert_monthly_log(&monthly_log("p1", "2026-04")).unwrap();
        db.insert_monthly_log(&monthly_log("p1", "2026-06")).unwrap();

        let all = db.list_monthly_logs("p1", Site::VillaGinestre, None).unwrap();
        assert_eq!(all[0].month, "2026-06");
        assert_eq!(all.len(), 2);

        let april = db.list_monthly_logs("p1", Site::VillaGinestre, Some("2026-04")).unwrap();
        assert_eq!(april.len(), 1);
    }
}
