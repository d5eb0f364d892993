//! Patient models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::site::{PatientType, Site};

/// Lifecycle status of a patient.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PatientStatus {
    /// Under active care
    #[default]
    Active,
    /// Care ended
    Discharged,
    /// Care paused
    Suspended,
}

impl PatientStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatientStatus::Active => "active",
            PatientStatus::Discharged => "discharged",
            PatientStatus::Suspended => "suspended",
        }
    }
}

impl fmt::Display for PatientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatientStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(PatientStatus::Active),
            "discharged" => Ok(PatientStatus::Discharged),
            "suspended" => Ok(PatientStatus::Suspended),
            _ => Err(format!("Unknown patient status: {}", s)),
        }
    }
}

/// Why a patient was discharged.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DischargeReason {
    Healed,
    /// Handed over to integrated home care
    HomeCare,
    Other,
}

impl DischargeReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DischargeReason::Healed => "healed",
            DischargeReason::HomeCare => "home_care",
            DischargeReason::Other => "other",
        }
    }
}

impl FromStr for DischargeReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "healed" => Ok(DischargeReason::Healed),
            "home_care" => Ok(DischargeReason::HomeCare),
            "other" => Ok(DischargeReason::Other),
            _ => Err(format!("Unknown discharge reason: {}", s)),
        }
    }
}

/// Which body-map silhouette a lesion marker sits on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BodyView {
    Front,
    Back,
    Feet,
}

/// A lesion position on the body map, in silhouette coordinates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LesionMarker {
    pub id: u64,
    pub view: BodyView,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// A patient record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Server-assigned UUID
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub patient_type: PatientType,
    /// Site the patient is registered at
    pub site: Site,
    pub status: PatientStatus,
    pub birth_date: Option<String>,
    /// National tax code
    pub tax_code: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub general_practitioner: Option<String>,
    pub medical_history: Option<String>,
    pub current_therapy: Option<String>,
    pub allergies: Option<String>,
    pub lesion_markers: Vec<LesionMarker>,
    pub discharge_reason: Option<DischargeReason>,
    pub discharge_notes: Option<String>,
    pub suspend_notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields accepted when registering a patient.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPatient {
    pub first_name: String,
    pub last_name: String,
    pub patient_type: PatientType,
    pub site: Site,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub tax_code: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub general_practitioner: Option<String>,
    #[serde(default)]
    pub medical_history: Option<String>,
    #[serde(default)]
    pub current_therapy: Option<String>,
    #[serde(default)]
    pub allergies: Option<String>,
}

/// Partial update. Only fields that are present change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatientUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub patient_type: Option<PatientType>,
    pub birth_date: Option<String>,
    pub tax_code: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub general_practitioner: Option<String>,
    pub medical_history: Option<String>,
    pub current_therapy: Option<String>,
    pub allergies: Option<String>,
    pub status: Option<PatientStatus>,
    pub discharge_reason: Option<DischargeReason>,
    pub discharge_notes: Option<String>,
    pub suspend_notes: Option<String>,
    pub lesion_markers: Option<Vec<LesionMarker>>,
}

impl Patient {
    /// Create a new patient with required fields.
    pub fn new(first_name: String, last_name: String, patient_type: PatientType, site: Site) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            first_name,
            last_name,
            patient_type,
            site,
            status: PatientStatus::Active,
            birth_date: None,
            tax_code: None,
            phone: None,
            email: None,
            general_practitioner: None,
            medical_history: None,
            current_therapy: None,
            allergies: None,
            lesion_markers: Vec::new(),
            discharge_reason: None,
            discharge_notes: None,
            suspend_notes: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Full display name, last name first.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.last_name, self.first_name)
    }

    /// Case-insensitive substring match on first or last name.
    pub fn matches_name(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.first_name.to_lowercase().contains(&query)
            || self.last_name.to_lowercase().contains(&query)
    }
}

impl From<NewPatient> for Patient {
    fn from(new: NewPatient) -> Self {
        let mut patient = Patient::new(new.first_name, new.last_name, new.patient_type, new.site);
        patient.birth_date = new.birth_date;
        patient.tax_code = new.tax_code;
        patient.phone = new.phone;
        patient.email = new.email;
        patient.general_practitioner = new.general_practitioner;
        patient.medical_history = new.medical_history;
        patient.current_therapy = new.current_therapy;
        patient.allergies = new.allergies;
        patient
    }
}

impl PatientUpdate {
    /// Apply the present fields onto `patient` and refresh `updated_at`.
    pub fn apply(self, patient: &mut Patient) {
        if let Some(v) = self.first_name {
            patient.first_name = v;
        }
        if let Some(v) = self.last_name {
            patient.last_name = v;
        }
        if let Some(v) = self.patient_type {
            patient.patient_type = v;
        }
        if let Some(v) = self.status {
            patient.status = v;
        }
        if let Some(v) = self.lesion_markers {
            patient.lesion_markers = v;
        }

        let optional = [
            (self.birth_date, &mut patient.birth_date),
            (self.tax_code, &mut patient.tax_code),
            (self.phone, &mut patient.phone),
            (self.email, &mut patient.email),
            (self.general_practitioner, &mut patient.general_practitioner),
            (self.medical_history, &mut patient.medical_history),
            (self.current_therapy, &mut patient.current_therapy),
            (self.allergies, &mut patient.allergies),
            (self.discharge_notes, &mut patient.discharge_notes),
            (self.suspend_notes, &mut patient.suspend_notes),
        ];
        for (value, slot) in optional {
            if value.is_some() {
                *slot = value;
            }
        }
        if self.discharge_reason.is_some() {
            patient.discharge_reason = self.discharge_reason;
        }

        patient.updated_at = chrono::Utc::now().to_rfc3339();
    }
}
