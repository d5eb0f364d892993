//! Visit statistics per site and period.

mod period;
mod report;

pub use period::*;
pub use report::*;

use thiserror::Error;

use crate::db::Database;
use crate::models::{Category, Site};

/// Statistics errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum StatsError {
    #[error("Invalid month: {0}")]
    InvalidMonth(u32),

    #[error("Year out of range: {0}")]
    InvalidYear(i32),

    #[error("{site} has no {category} statistics")]
    CategoryNotOffered { site: Site, category: Category },

    #[error("Database error: {0}")]
    Database(String),
}

impl From<crate::db::DbError> for StatsError {
    fn from(e: crate::db::DbError) -> Self {
        StatsError::Database(e.to_string())
    }
}

pub type StatsResult<T> = Result<T, StatsError>;

/// Category actually used for a report at `site`.
///
/// A restricted site rejects any other category and defaults to its own.
pub fn effective_category(site: Site, requested: Option<Category>) -> StatsResult<Option<Category>> {
    match (site.restricted_to(), requested) {
        (Some(only), Some(category)) if category != only => {
            Err(StatsError::CategoryNotOffered { site, category })
        }
        (Some(only), _) => Ok(Some(only)),
        (None, requested) => Ok(requested),
    }
}

/// Runs reports against the appointment store.
pub struct StatsReporter<'a> {
    db: &'a Database,
}

impl<'a> StatsReporter<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Aggregate visits at `site` during `period`.
    pub fn report(
        &self,
        site: Site,
        period: Period,
        category: Option<Category>,
    ) -> StatsResult<StatisticsReport> {
        let category = effective_category(site, category)?;
        let (start, end) = period.date_range()?;
        let appointments = self.db.appointments_in_range(site, start, end, category)?;

        tracing::debug!(
            site = %site,
            %start,
            %end,
            count = appointments.len(),
            "statistics scan"
        );

        Ok(summarize(site, period, category, &appointments))
    }

    /// Report both periods and their differences.
    pub fn compare(
        &self,
        site: Site,
        period1: Period,
        period2: Period,
        category: Option<Category>,
    ) -> StatsResult<Comparison> {
        let first = self.report(site, period1, category)?;
        let second = self.report(site, period2, category)?;
        Ok(compare(first, second))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Appointment, NewAppointment};
    use chrono::NaiveDate;

    fn book(db: &Database, site: Site, date: (i32, u32, u32), category: Category, services: &[&str]) {
        let appointment = Appointment::new(NewAppointment {
            patient_id: "p1".into(),
            site,
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            time: "09:00".into(),
            category,
            services: services.iter().map(|s| s.to_string()).collect(),
            notes: None,
        });
        db.insert_appointment(&appointment).unwrap();
    }

    #[test]
    fn test_effective_category() {
        assert_eq!(effective_category(Site::PtaCentro, None), Ok(None));
        assert_eq!(
            effective_category(Site::PtaCentro, Some(Category::Med)),
            Ok(Some(Category::Med))
        );
        assert_eq!(
            effective_category(Site::VillaGinestre, None),
            Ok(Some(Category::Picc))
        );
        assert_eq!(
            effective_category(Site::VillaGinestre, Some(Category::Med)),
            Err(StatsError::CategoryNotOffered {
                site: Site::VillaGinestre,
                category: Category::Med
            })
        );
    }

    #[test]
    fn test_report_scopes_by_site_and_period() {
        let db = Database::open_in_memory().unwrap();
        book(&db, Site::PtaCentro, (2026, 12, 31), Category::Med, &["bandage"]);
        book(&db, Site::PtaCentro, (2027, 1, 1), Category::Med, &["bandage"]);
        book(&db, Site::VillaGinestre, (2026, 12, 10), Category::Picc, &["flush"]);

        let reporter = StatsReporter::new(&db);
        let december = reporter
            .report(Site::PtaCentro, Period::month(2026, 12).unwrap(), None)
            .unwrap();
        assert_eq!(december.visits, 1);
        assert_eq!(december.monthly.keys().collect::<Vec<_>>(), vec!["2026-12"]);
    }

    #[test]
    fn test_restricted_site_defaults_to_its_category() {
        let db = Database::open_in_memory().unwrap();
        book(&db, Site::VillaGinestre, (2026, 5, 4), Category::Picc, &["flush"]);

        let report = StatsReporter::new(&db)
            .report(Site::VillaGinestre, Period::year(2026).unwrap(), None)
            .unwrap();
        assert_eq!(report.category, Some(Category::Picc));
        assert_eq!(report.visits, 1);
    }

    #[test]
    fn test_compare_same_period_is_zero() {
        let db = Database::open_in_memory().unwrap();
        book(&db, Site::PtaCentro, (2026, 3, 3), Category::Med, &["bandage", "irrigation"]);

        let period = Period::month(2026, 3).unwrap();
        let comparison = StatsReporter::new(&db)
            .compare(Site::PtaCentro, period, period, None)
            .unwrap();
        assert!(comparison.differences.is_zero());
        assert_eq!(comparison.period1.visits, 1);
    }
}
