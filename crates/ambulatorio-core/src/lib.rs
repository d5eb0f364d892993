//! Ambulatorio Core Library
//!
//! Record keeping for an outpatient nursing service running two sites.
//!
//! # Architecture
//!
//! ```text
//!   bearer token ──► auth::TokenKeys::verify ──► Caller { username, sites }
//!                                                     │
//!                                          Caller::ensure_site(site)
//!                                                     │
//!                     ┌───────────────────────────────┼──────────────────────────┐
//!                     │                               │                          │
//!                     ▼                               ▼                          ▼
//!          patients / appointments            care forms / photos          statistics
//!              (site rules,                    (write-once, site          (period scan,
//!             slot capacity)                     restricted)                comparison)
//!                     │                               │                          │
//!                     └───────────────────────────────┴──────────────────────────┘
//!                                                     │
//!                                          db::Database (SQLite)
//! ```
//!
//! # Core Principle
//!
//! **Every operation checks the target site against the caller's grant.** Nothing
//! is cached between calls.
//!
//! # Modules
//!
//! - [`db`]: SQLite database layer
//! - [`models`]: Domain types (Patient, Appointment, care forms, Photo)
//! - [`auth`]: Bearer tokens, staff table, site checks
//! - [`stats`]: Visit statistics and period comparison
//! - [`calendar`]: Appointment slots and holidays
//! - [`documents`]: Document template catalog

pub mod auth;
pub mod calendar;
pub mod db;
pub mod documents;
pub mod models;
pub mod stats;

// Re-export commonly used types
pub use auth::{AuthError, Caller, TokenKeys, UserProfile};
pub use db::{Database, PatientQuery};
pub use documents::DocumentTemplate;
pub use models::{
    Appointment, AppointmentFilter, AppointmentUpdate, Category, CatheterMonthlyLog,
    CatheterPlacementForm, NewAppointment, NewCatheterMonthlyLog, NewCatheterPlacementForm,
    NewPatient, NewPhoto, NewWoundDressingForm, Patient, PatientType, PatientUpdate, Photo, Site,
    WoundDressingForm,
};
pub use stats::{Comparison, Period, StatisticsReport};

use std::path::Path;
use std::sync::{Arc, Mutex};

use serde::Serialize;

// =========================================================================
// Error Type
// =========================================================================

#[derive(Debug, thiserror::Error)]
pub enum AmbulatorioError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AmbulatorioResult<T> = Result<T, AmbulatorioError>;

impl From<db::DbError> for AmbulatorioError {
    fn from(e: db::DbError) -> Self {
        match e {
            db::DbError::NotFound(what) => AmbulatorioError::NotFound(what),
            other => AmbulatorioError::DatabaseError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for AmbulatorioError {
    fn from(e: serde_json::Error) -> Self {
        AmbulatorioError::SerializationError(e.to_string())
    }
}

impl From<AuthError> for AmbulatorioError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::SiteDenied(_) => AmbulatorioError::Forbidden(e.to_string()),
            AuthError::Encoding(msg) => AmbulatorioError::Internal(msg),
            _ => AmbulatorioError::Unauthorized(e.to_string()),
        }
    }
}

impl From<stats::StatsError> for AmbulatorioError {
    fn from(e: stats::StatsError) -> Self {
        match e {
            stats::StatsError::Database(msg) => AmbulatorioError::DatabaseError(msg),
            other => AmbulatorioError::InvalidInput(other.to_string()),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for AmbulatorioError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        AmbulatorioError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions
// =========================================================================

/// Open or create a database at the given path.
pub fn open_database<P: AsRef<Path>>(
    path: P,
    tokens: TokenKeys,
) -> AmbulatorioResult<Arc<AmbulatorioCore>> {
    let db = Database::open(path)?;
    Ok(Arc::new(AmbulatorioCore::new(db, tokens)))
}

/// Create an in-memory database (for testing).
pub fn open_database_in_memory(tokens: TokenKeys) -> AmbulatorioResult<Arc<AmbulatorioCore>> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(AmbulatorioCore::new(db, tokens)))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Result of a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub user: UserProfile,
}

/// Thread-safe service object applying the business rules over the database.
pub struct AmbulatorioCore {
    db: Arc<Mutex<Database>>,
    tokens: TokenKeys,
}

impl AmbulatorioCore {
    pub fn new(db: Database, tokens: TokenKeys) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            tokens,
        }
    }

    // =========================================================================
    // Auth Operations
    // =========================================================================

    /// Exchange credentials for a bearer token.
    pub fn login(&self, username: &str, password: &str) -> AmbulatorioResult<LoginResponse> {
        let user = auth::authenticate(username, password)?;
        let access_token = self.tokens.issue(user.username, user.sites)?;
        tracing::info!(user = %user.username, "login");

        Ok(LoginResponse {
            access_token,
            token_type: "bearer",
            user: user.profile(),
        })
    }

    /// Resolve a bearer token to the caller behind it.
    pub fn authorize(&self, token: &str) -> AmbulatorioResult<Caller> {
        Ok(self.tokens.verify(token)?.into())
    }

    /// Profile of the caller, looked up fresh in the staff table.
    pub fn current_user(&self, caller: &Caller) -> AmbulatorioResult<UserProfile> {
        auth::find_user(&caller.username)
            .map(|u| u.profile())
            .ok_or_else(|| AmbulatorioError::NotFound(format!("User {}", caller.username)))
    }

    // =========================================================================
    // Patient Operations
    // =========================================================================

    /// Register a new patient.
    pub fn create_patient(&self, caller: &Caller, new: NewPatient) -> AmbulatorioResult<Patient> {
        caller.ensure_site(new.site)?;
        check_patient_type(new.patient_type, new.site)?;

        let patient = Patient::from(new);
        let db = self.db.lock()?;
        db.insert_patient(&patient)?;

        tracing::info!(patient_id = %patient.id, site = %patient.site, "patient created");
        Ok(patient)
    }

    /// Patients at a site, sorted by last name.
    pub fn list_patients(
        &self,
        caller: &Caller,
        site: Site,
        query: &PatientQuery,
    ) -> AmbulatorioResult<Vec<Patient>> {
        caller.ensure_site(site)?;
        let db = self.db.lock()?;
        Ok(db.list_patients(site, query)?)
    }

    pub fn get_patient(&self, caller: &Caller, id: &str) -> AmbulatorioResult<Patient> {
        let db = self.db.lock()?;
        let patient = load_patient(&db, id)?;
        caller.ensure_site(patient.site)?;
        Ok(patient)
    }

    /// Apply a partial update. The patient's site never changes.
    pub fn update_patient(
        &self,
        caller: &Caller,
        id: &str,
        update: PatientUpdate,
    ) -> AmbulatorioResult<Patient> {
        let db = self.db.lock()?;
        let mut patient = load_patient(&db, id)?;
        caller.ensure_site(patient.site)?;

        if let Some(patient_type) = update.patient_type {
            check_patient_type(patient_type, patient.site)?;
        }

        update.apply(&mut patient);
        db.update_patient(&patient)?;

        tracing::info!(patient_id = %patient.id, status = %patient.status, "patient updated");
        Ok(patient)
    }

    pub fn delete_patient(&self, caller: &Caller, id: &str) -> AmbulatorioResult<()> {
        let db = self.db.lock()?;
        let patient = load_patient(&db, id)?;
        caller.ensure_site(patient.site)?;

        db.delete_patient(id)?;
        tracing::info!(patient_id = %id, "patient deleted");
        Ok(())
    }

    // =========================================================================
    // Appointment Operations
    // =========================================================================

    /// Book a visit. At most [`models::SLOT_CAPACITY`] bookings share a slot.
    pub fn create_appointment(
        &self,
        caller: &Caller,
        new: NewAppointment,
    ) -> AmbulatorioResult<Appointment> {
        caller.ensure_site(new.site)?;
        check_category(new.category, new.site)?;
        if !calendar::is_valid_slot(&new.time) {
            return Err(AmbulatorioError::InvalidInput(format!(
                "{} is not a bookable time slot",
                new.time
            )));
        }

        let db = self.db.lock()?;
        let patient = require_patient(&db, &new.patient_id, new.site)?;

        let booked = db.count_slot(new.site, new.date, &new.time, new.category)?;
        if booked >= models::SLOT_CAPACITY {
            tracing::warn!(
                site = %new.site,
                date = %new.date,
                time = %new.time,
                category = %new.category,
                "slot full"
            );
            return Err(AmbulatorioError::InvalidInput(format!(
                "Slot full (max {} patients)",
                models::SLOT_CAPACITY
            )));
        }

        let mut appointment = Appointment::new(new);
        appointment.patient_first_name = Some(patient.first_name);
        appointment.patient_last_name = Some(patient.last_name);
        db.insert_appointment(&appointment)?;

        tracing::info!(
            appointment_id = %appointment.id,
            date = %appointment.date,
            time = %appointment.time,
            "appointment booked"
        );
        Ok(appointment)
    }

    /// Appointments at a site, ordered by date then time.
    pub fn list_appointments(
        &self,
        caller: &Caller,
        site: Site,
        filter: &AppointmentFilter,
    ) -> AmbulatorioResult<Vec<Appointment>> {
        caller.ensure_site(site)?;
        let db = self.db.lock()?;
        Ok(db.list_appointments(site, filter)?)
    }

    /// Apply a partial update. Slot capacity is not re-checked.
    pub fn update_appointment(
        &self,
        caller: &Caller,
        id: &str,
        update: AppointmentUpdate,
    ) -> AmbulatorioResult<Appointment> {
        if let Some(time) = &update.time {
            if !calendar::is_valid_slot(time) {
                return Err(AmbulatorioError::InvalidInput(format!(
                    "{} is not a bookable time slot",
                    time
                )));
            }
        }

        let db = self.db.lock()?;
        let mut appointment = load_appointment(&db, id)?;
        caller.ensure_site(appointment.site)?;

        update.apply(&mut appointment);
        db.update_appointment(&appointment)?;
        Ok(appointment)
    }

    pub fn delete_appointment(&self, caller: &Caller, id: &str) -> AmbulatorioResult<()> {
        let db = self.db.lock()?;
        let appointment = load_appointment(&db, id)?;
        caller.ensure_site(appointment.site)?;

        db.delete_appointment(id)?;
        tracing::info!(appointment_id = %id, "appointment deleted");
        Ok(())
    }

    // =========================================================================
    // Care Form Operations
    // =========================================================================

    pub fn create_wound_form(
        &self,
        caller: &Caller,
        new: NewWoundDressingForm,
    ) -> AmbulatorioResult<WoundDressingForm> {
        caller.ensure_site(new.site)?;
        check_category(Category::Med, new.site)?;

        let db = self.db.lock()?;
        require_patient(&db, &new.patient_id, new.site)?;

        let form = WoundDressingForm::from(new);
        db.insert_wound_form(&form)?;
        tracing::info!(form_id = %form.id, patient_id = %form.patient_id, "wound dressing form saved");
        Ok(form)
    }

    pub fn list_wound_forms(
        &self,
        caller: &Caller,
        patient_id: &str,
        site: Site,
    ) -> AmbulatorioResult<Vec<WoundDressingForm>> {
        caller.ensure_site(site)?;
        let db = self.db.lock()?;
        Ok(db.list_wound_forms(patient_id, site)?)
    }

    pub fn get_wound_form(&self, caller: &Caller, id: &str) -> AmbulatorioResult<WoundDressingForm> {
        let db = self.db.lock()?;
        let form = db
            .get_wound_form(id)?
            .ok_or_else(|| not_found("Wound dressing form", id))?;
        caller.ensure_site(form.site)?;
        Ok(form)
    }

    pub fn create_placement_form(
        &self,
        caller: &Caller,
        new: NewCatheterPlacementForm,
    ) -> AmbulatorioResult<CatheterPlacementForm> {
        caller.ensure_site(new.site)?;
        check_category(Category::Picc, new.site)?;

        let db = self.db.lock()?;
        require_patient(&db, &new.patient_id, new.site)?;

        let form = CatheterPlacementForm::from(new);
        db.insert_placement_form(&form)?;
        tracing::info!(form_id = %form.id, patient_id = %form.patient_id, "placement form saved");
        Ok(form)
    }

    pub fn list_placement_forms(
        &self,
        caller: &Caller,
        patient_id: &str,
        site: Site,
    ) -> AmbulatorioResult<Vec<CatheterPlacementForm>> {
        caller.ensure_site(site)?;
        let db = self.db.lock()?;
        Ok(db.list_placement_forms(patient_id, site)?)
    }

    pub fn get_placement_form(
        &self,
        caller: &Caller,
        id: &str,
    ) -> AmbulatorioResult<CatheterPlacementForm> {
        let db = self.db.lock()?;
        let form = db
            .get_placement_form(id)?
            .ok_or_else(|| not_found("Catheter placement form", id))?;
        caller.ensure_site(form.site)?;
        Ok(form)
    }

    /// Save a monthly log. Only one may exist per patient, site and month.
    pub fn create_monthly_log(
        &self,
        caller: &Caller,
        mut new: NewCatheterMonthlyLog,
    ) -> AmbulatorioResult<CatheterMonthlyLog> {
        caller.ensure_site(new.site)?;
        check_category(Category::Picc, new.site)?;
        new.month = month_key(&new.month)?;
        if let Some(day) = new.days.keys().find(|d| !models::is_valid_day_key(d)) {
            return Err(AmbulatorioError::InvalidInput(format!(
                "Invalid day of month: {}",
                day
            )));
        }

        let db = self.db.lock()?;
        require_patient(&db, &new.patient_id, new.site)?;

        if db.monthly_log_exists(&new.patient_id, new.site, &new.month)? {
            tracing::warn!(patient_id = %new.patient_id, month = %new.month, "duplicate monthly log");
            return Err(AmbulatorioError::InvalidInput(format!(
                "A log already exists for {}",
                new.month
            )));
        }

        let log = CatheterMonthlyLog::from(new);
        db.insert_monthly_log(&log)?;
        tracing::info!(log_id = %log.id, month = %log.month, "monthly log saved");
        Ok(log)
    }

    pub fn list_monthly_logs(
        &self,
        caller: &Caller,
        patient_id: &str,
        site: Site,
        month: Option<&str>,
    ) -> AmbulatorioResult<Vec<CatheterMonthlyLog>> {
        caller.ensure_site(site)?;
        let month = month.map(month_key).transpose()?;
        let db = self.db.lock()?;
        Ok(db.list_monthly_logs(patient_id, site, month.as_deref())?)
    }

    pub fn get_monthly_log(&self, caller: &Caller, id: &str) -> AmbulatorioResult<CatheterMonthlyLog> {
        let db = self.db.lock()?;
        let log = db
            .get_monthly_log(id)?
            .ok_or_else(|| not_found("Monthly log", id))?;
        caller.ensure_site(log.site)?;
        Ok(log)
    }

    // =========================================================================
    // Photo Operations
    // =========================================================================

    pub fn upload_photo(&self, caller: &Caller, new: NewPhoto) -> AmbulatorioResult<Photo> {
        caller.ensure_site(new.site)?;
        check_category(new.category, new.site)?;
        if new.image_data.is_empty() {
            return Err(AmbulatorioError::InvalidInput("Empty image".into()));
        }

        let db = self.db.lock()?;
        require_patient(&db, &new.patient_id, new.site)?;

        let photo = Photo::from(new);
        db.insert_photo(&photo)?;
        tracing::info!(
            photo_id = %photo.id,
            bytes = photo.image_data.len(),
            "photo stored"
        );
        Ok(photo)
    }

    pub fn list_photos(
        &self,
        caller: &Caller,
        patient_id: &str,
        site: Site,
        category: Option<Category>,
    ) -> AmbulatorioResult<Vec<Photo>> {
        caller.ensure_site(site)?;
        let db = self.db.lock()?;
        Ok(db.list_photos(patient_id, site, category)?)
    }

    pub fn get_photo(&self, caller: &Caller, id: &str) -> AmbulatorioResult<Photo> {
        let db = self.db.lock()?;
        let photo = db.get_photo(id)?.ok_or_else(|| not_found("Photo", id))?;
        caller.ensure_site(photo.site)?;
        Ok(photo)
    }

    pub fn delete_photo(&self, caller: &Caller, id: &str) -> AmbulatorioResult<()> {
        let db = self.db.lock()?;
        let photo = db.get_photo(id)?.ok_or_else(|| not_found("Photo", id))?;
        caller.ensure_site(photo.site)?;

        db.delete_photo(id)?;
        tracing::info!(photo_id = %id, "photo deleted");
        Ok(())
    }

    // =========================================================================
    // Documents & Statistics
    // =========================================================================

    pub fn documents(
        &self,
        caller: &Caller,
        site: Site,
        category: Option<Category>,
    ) -> AmbulatorioResult<Vec<DocumentTemplate>> {
        caller.ensure_site(site)?;
        Ok(documents::documents_for(site, category))
    }

    pub fn statistics(
        &self,
        caller: &Caller,
        site: Site,
        period: Period,
        category: Option<Category>,
    ) -> AmbulatorioResult<StatisticsReport> {
        caller.ensure_site(site)?;
        let db = self.db.lock()?;
        Ok(stats::StatsReporter::new(&db).report(site, period, category)?)
    }

    pub fn compare_statistics(
        &self,
        caller: &Caller,
        site: Site,
        period1: Period,
        period2: Period,
        category: Option<Category>,
    ) -> AmbulatorioResult<Comparison> {
        caller.ensure_site(site)?;
        let db = self.db.lock()?;
        Ok(stats::StatsReporter::new(&db).compare(site, period1, period2, category)?)
    }
}

// =========================================================================
// Rule Helpers
// =========================================================================

fn not_found(kind: &str, id: &str) -> AmbulatorioError {
    AmbulatorioError::NotFound(format!("{} {}", kind, id))
}

fn month_key(month: &str) -> AmbulatorioResult<String> {
    models::canonical_month_key(month).ok_or_else(|| {
        AmbulatorioError::InvalidInput(format!("Month must be YYYY-MM, got {}", month))
    })
}

fn check_category(category: Category, site: Site) -> AmbulatorioResult<()> {
    if site.allows(category) {
        Ok(())
    } else {
        Err(AmbulatorioError::InvalidInput(format!(
            "{} does not handle {} care",
            site.display_name(),
            category
        )))
    }
}

fn check_patient_type(patient_type: PatientType, site: Site) -> AmbulatorioResult<()> {
    if patient_type.allowed_at(site) {
        Ok(())
    } else {
        Err(AmbulatorioError::InvalidInput(format!(
            "{} does not handle {} patients",
            site.display_name(),
            patient_type.as_str()
        )))
    }
}

fn load_patient(db: &Database, id: &str) -> AmbulatorioResult<Patient> {
    db.get_patient(id)?.ok_or_else(|| not_found("Patient", id))
}

fn load_appointment(db: &Database, id: &str) -> AmbulatorioResult<Appointment> {
    db.get_appointment(id)?
        .ok_or_else(|| not_found("Appointment", id))
}

/// The patient a new record refers to, which must be registered at `site`.
fn require_patient(db: &Database, patient_id: &str, site: Site) -> AmbulatorioResult<Patient> {
    let patient = load_patient(db, patient_id)?;
    if patient.site != site {
        return Err(AmbulatorioError::InvalidInput(format!(
            "Patient {} is registered at {}",
            patient_id, patient.site
        )));
    }
    Ok(patient)
}
