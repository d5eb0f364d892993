//! SQLite schema definition.

/// Complete database schema for the ambulatorio service.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Patients
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    id TEXT PRIMARY KEY,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    patient_type TEXT NOT NULL CHECK (patient_type IN ('PICC', 'MED', 'PICC_MED')),
    site TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'active',       -- active, discharged, suspended
    birth_date TEXT,
    tax_code TEXT,
    phone TEXT,
    email TEXT,
    general_practitioner TEXT,
    medical_history TEXT,
    current_therapy TEXT,
    allergies TEXT,
    lesion_markers TEXT NOT NULL DEFAULT '[]',  -- JSON array of LesionMarker
    discharge_reason TEXT,
    discharge_notes TEXT,
    suspend_notes TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_patients_site ON patients(site, last_name);

-- ============================================================================
-- Appointments
-- ============================================================================

-- No foreign key on patient_id: deleting a patient keeps visit history for statistics.
CREATE TABLE IF NOT EXISTS appointments (
    id TEXT PRIMARY KEY,
    patient_id TEXT NOT NULL,
    patient_first_name TEXT,
    patient_last_name TEXT,
    site TEXT NOT NULL,
    date TEXT NOT NULL,                          -- YYYY-MM-DD
    time TEXT NOT NULL,                          -- HH:MM
    category TEXT NOT NULL CHECK (category IN ('PICC', 'MED')),
    services TEXT NOT NULL DEFAULT '[]',         -- JSON array of service codes
    notes TEXT,
    completed INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_appointments_slot ON appointments(site, date, time, category);
CREATE INDEX IF NOT EXISTS idx_appointments_patient ON appointments(patient_id);

-- ============================================================================
-- Care forms (immutable once written)
-- ============================================================================

CREATE TABLE IF NOT EXISTS wound_dressing_forms (
    id TEXT PRIMARY KEY,
    patient_id TEXT NOT NULL,
    site TEXT NOT NULL,
    compiled_on TEXT NOT NULL,
    payload TEXT NOT NULL,                       -- JSON WoundDressingForm
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_wound_forms_patient ON wound_dressing_forms(patient_id, site);

CREATE TABLE IF NOT EXISTS catheter_placement_forms (
    id TEXT PRIMARY KEY,
    patient_id TEXT NOT NULL,
    site TEXT NOT NULL,
    placed_on TEXT NOT NULL,
    payload TEXT NOT NULL,                       -- JSON CatheterPlacementForm
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_placement_forms_patient ON catheter_placement_forms(patient_id, site);

CREATE TABLE IF NOT EXISTS catheter_monthly_logs (
    id TEXT PRIMARY KEY,
    patient_id TEXT NOT NULL,
    site TEXT NOT NULL,
    month TEXT NOT NULL,                         -- YYYY-MM
    payload TEXT NOT NULL,                       -- JSON CatheterMonthlyLog
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_monthly_logs_patient ON catheter_monthly_logs(patient_id, site, month);

-- ============================================================================
-- Photos
-- ============================================================================

CREATE TABLE IF NOT EXISTS photos (
    id TEXT PRIMARY KEY,
    patient_id TEXT NOT NULL,
    site TEXT NOT NULL,
    category TEXT NOT NULL CHECK (category IN ('PICC', 'MED')),
    description TEXT,
    date TEXT NOT NULL,
    content_type TEXT NOT NULL,
    sha256 TEXT NOT NULL,
    image_data BLOB NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_photos_patient ON photos(patient_id, site);
"#;
