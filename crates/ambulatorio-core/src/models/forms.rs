//! Care-form records. Each form is an immutable snapshot once created.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::site::Site;

/// Standard opening of a dressing note, following the four wound-hygiene steps.
pub const DEFAULT_DRESSING_TEXT: &str = "La lesione è stata trattata seguendo le 4 fasi del Wound Hygiene:\nDetersione con Prontosan\nDebridement e Riattivazione dei margini\nMedicazione: ";

fn default_dressing() -> String {
    DEFAULT_DRESSING_TEXT.to_string()
}

// =========================================================================
// Wound dressing assessment (MED)
// =========================================================================

/// Wound dressing assessment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WoundDressingForm {
    pub id: String,
    pub patient_id: String,
    pub site: Site,
    pub compiled_on: NaiveDate,
    /// e.g. granulating, fibrinous, necrotic, infected, biofilm
    pub wound_bed: Vec<String>,
    /// e.g. active, undermined, expanding
    pub margins: Vec<String>,
    /// e.g. intact, dry, reddened, macerated, hyperkeratotic
    pub perilesional_skin: Vec<String>,
    /// absent, moderate, abundant
    pub exudate_amount: Option<String>,
    /// serous, haematic, infected
    pub exudate_type: Vec<String>,
    pub dressing: String,
    pub next_change: Option<NaiveDate>,
    pub signature: Option<String>,
    pub photo_ids: Vec<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewWoundDressingForm {
    pub patient_id: String,
    pub site: Site,
    pub compiled_on: NaiveDate,
    #[serde(default)]
    pub wound_bed: Vec<String>,
    #[serde(default)]
    pub margins: Vec<String>,
    #[serde(default)]
    pub perilesional_skin: Vec<String>,
    #[serde(default)]
    pub exudate_amount: Option<String>,
    #[serde(default)]
    pub exudate_type: Vec<String>,
    #[serde(default = "default_dressing")]
    pub dressing: String,
    #[serde(default)]
    pub next_change: Option<NaiveDate>,
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(default)]
    pub photo_ids: Vec<String>,
}

impl From<NewWoundDressingForm> for WoundDressingForm {
    fn from(new: NewWoundDressingForm) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            patient_id: new.patient_id,
            site: new.site,
            compiled_on: new.compiled_on,
            wound_bed: new.wound_bed,
            margins: new.margins,
            perilesional_skin: new.perilesional_skin,
            exudate_amount: new.exudate_amount,
            exudate_type: new.exudate_type,
            dressing: new.dressing,
            next_change: new.next_change,
            signature: new.signature,
            photo_ids: new.photo_ids,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

// =========================================================================
// Catheter placement record (PICC)
// =========================================================================

/// Procedure record written when a catheter is placed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatheterPlacementForm {
    pub id: String,
    pub patient_id: String,
    pub site: Site,
    pub placed_on: NaiveDate,
    pub catheter_type: String,
    pub insertion_site: String,
    /// "dx" or "sn"
    pub arm: Option<String>,
    /// basilic, cephalic, brachial
    pub vein: Option<String>,
    pub exit_site_cm: Option<String>,
    #[serde(flatten)]
    pub checklist: PlacementChecklist,
    pub hand_hygiene: Option<String>,
    pub disinfectant: Option<String>,
    /// emergency, urgent, elective
    pub mode: Option<String>,
    pub reason: Option<String>,
    pub operator: Option<String>,
    pub notes: Option<String>,
    pub attachments: Vec<String>,
    pub created_at: String,
}

/// Yes/no items of the placement bundle.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PlacementChecklist {
    pub ultrasound_guided: bool,
    pub barrier_precautions: bool,
    pub sutureless_device: bool,
    pub transparent_dressing: bool,
    pub xray_check: bool,
    pub ecg_check: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCatheterPlacementForm {
    pub patient_id: String,
    pub site: Site,
    pub placed_on: NaiveDate,
    pub catheter_type: String,
    pub insertion_site: String,
    #[serde(default)]
    pub arm: Option<String>,
    #[serde(default)]
    pub vein: Option<String>,
    #[serde(default)]
    pub exit_site_cm: Option<String>,
    #[serde(flatten)]
    pub checklist: PlacementChecklist,
    #[serde(default)]
    pub hand_hygiene: Option<String>,
    #[serde(default)]
    pub disinfectant: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub operator: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub attachments: Vec<String>,
}

impl From<NewCatheterPlacementForm> for CatheterPlacementForm {
    fn from(new: NewCatheterPlacementForm) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            patient_id: new.patient_id,
            site: new.site,
            placed_on: new.placed_on,
            catheter_type: new.catheter_type,
            insertion_site: new.insertion_site,
            arm: new.arm,
            vein: new.vein,
            exit_site_cm: new.exit_site_cm,
            checklist: new.checklist,
            hand_hygiene: new.hand_hygiene,
            disinfectant: new.disinfectant,
            mode: new.mode,
            reason: new.reason,
            operator: new.operator,
            notes: new.notes,
            attachments: new.attachments,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

// =========================================================================
// Catheter monthly management log (PICC)
// =========================================================================

/// Per-day checklist entries, keyed by day of month ("1".."31").
pub type DayEntries = BTreeMap<String, serde_json::Map<String, serde_json::Value>>;

/// Monthly catheter-management log. One per patient, site and month.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatheterMonthlyLog {
    pub id: String,
    pub patient_id: String,
    pub site: Site,
    /// "YYYY-MM"
    pub month: String,
    pub days: DayEntries,
    pub notes: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCatheterMonthlyLog {
    pub patient_id: String,
    pub site: Site,
    pub month: String,
    #[serde(default)]
    pub days: DayEntries,
    #[serde(default)]
    pub notes: Option<String>,
}

impl From<NewCatheterMonthlyLog> for CatheterMonthlyLog {
    fn from(new: NewCatheterMonthlyLog) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            patient_id: new.patient_id,
            site: new.site,
            month: new.month,
            days: new.days,
            notes: new.notes,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Parse a "YYYY-MM" month key into its canonical spelling.
///
/// Only four digits, a dash and two digits are accepted, so one calendar
/// month has exactly one key.
pub fn canonical_month_key(month: &str) -> Option<String> {
    let (year, mm) = month.split_once('-')?;
    if year.len() != 4 || mm.len() != 2 {
        return None;
    }
    if !year.bytes().chain(mm.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = year.parse().ok()?;
    let mm: u32 = mm.parse().ok()?;
    NaiveDate::from_ymd_opt(year, mm, 1)?;
    Some(format!("{:04}-{:02}", year, mm))
}

/// Check a day-of-month key ("1".."31").
pub fn is_valid_day_key(day: &str) -> bool {
    matches!(day.parse::<u32>(), Ok(1..=31))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wound_form_gets_default_dressing_text() {
        let new: NewWoundDressingForm = serde_json::from_str(
            r#"{"patient_id":"p","site":"pta_centro","compiled_on":"2026-02-10"}"#,
        )
        .unwrap();
        let form = WoundDressingForm::from(new);
        assert!(form.dressing.starts_with("La lesione"));
        assert!(form.wound_bed.is_empty());
    }

    #[test]
    fn test_placement_checklist_flattens() {
        let new: NewCatheterPlacementForm = serde_json::from_str(
            r#"{"patient_id":"p","site":"villa_ginestre","placed_on":"2026-02-10",
                "catheter_type":"PICC 4Fr","insertion_site":"braccio",
                "ultrasound_guided":true,"ecg_check":true}"#,
        )
        .unwrap();
        assert!(new.checklist.ultrasound_guided);
        assert!(new.checklist.ecg_check);
        assert!(!new.checklist.xray_check);

        let form = CatheterPlacementForm::from(new);
        let json = serde_json::to_value(&form).unwrap();
        assert_eq!(json["ultrasound_guided"], true);
    }

    #[test]
    fn test_month_and_day_keys() {
        assert_eq!(canonical_month_key("2026-02").as_deref(), Some("2026-02"));
        assert_eq!(canonical_month_key("2026-13"), None);
        assert_eq!(canonical_month_key("2026-00"), None);
        assert_eq!(canonical_month_key("2026-2"), None);
        assert_eq!(canonical_month_key("+2026-1"), None);
        assert_eq!(canonical_month_key(" 2026-1"), None);
        assert_eq!(canonical_month_key("+026-01"), None);
        assert_eq!(canonical_month_key("2026-01 "), None);
        assert!(is_valid_day_key("31"));
        assert!(!is_valid_day_key("0"));
        assert!(!is_valid_day_key("x"));
    }
}
