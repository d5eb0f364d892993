//! Appointment models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::site::{Category, Site};

/// Maximum number of appointments sharing one (site, date, time, category) slot.
pub const SLOT_CAPACITY: usize = 2;

/// A scheduled visit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: String,
    pub patient_id: String,
    /// Patient name snapshot taken at booking time
    pub patient_first_name: Option<String>,
    pub patient_last_name: Option<String>,
    pub site: Site,
    pub date: NaiveDate,
    /// Slot start, "HH:MM"
    pub time: String,
    pub category: Category,
    /// Service codes performed during the visit
    pub services: Vec<String>,
    pub notes: Option<String>,
    pub completed: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Booking request.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAppointment {
    pub patient_id: String,
    pub site: Site,
    pub date: NaiveDate,
    pub time: String,
    pub category: Category,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Partial update. Slot capacity is not re-checked.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentUpdate {
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub services: Option<Vec<String>>,
    pub notes: Option<String>,
    pub completed: Option<bool>,
}

/// Filters for listing appointments at a site.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentFilter {
    /// Exact day; takes precedence over the range
    pub date: Option<NaiveDate>,
    /// Inclusive range start, used only together with `date_to`
    pub date_from: Option<NaiveDate>,
    /// Inclusive range end
    pub date_to: Option<NaiveDate>,
    pub category: Option<Category>,
}

impl Appointment {
    /// Build an appointment from a booking request.
    pub fn new(new: NewAppointment) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            patient_id: new.patient_id,
            patient_first_name: None,
            patient_last_name: None,
            site: new.site,
            date: new.date,
            time: new.time,
            category: new.category,
            services: new.services,
            notes: new.notes,
            completed: false,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Calendar month of the visit, "YYYY-MM".
    pub fn month_key(&self) -> String {
        self.date.format("%Y-%m").to_string()
    }
}

impl AppointmentUpdate {
    pub fn apply(self, appointment: &mut Appointment) {
        if let Some(date) = self.date {
            appointment.date = date;
        }
        if let Some(time) = self.time {
            appointment.time = time;
        }
        if let Some(services) = self.services {
            appointment.services = services;
        }
        if self.notes.is_some() {
            appointment.notes = self.notes;
        }
        if let Some(completed) = self.completed {
            appointment.completed = completed;
        }
        appointment.updated_at = chrono::Utc::now().to_rfc3339();
    }
}
