//! Visit aggregation and period comparison.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::Period;
use crate::models::{Appointment, Category, Site};

/// Count per service code.
pub type ServiceTally = BTreeMap<String, u64>;

/// Figures for a single calendar month.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyStats {
    pub visits: u64,
    pub unique_patients: u64,
    pub services: ServiceTally,
}

/// Aggregated visits for one site and period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsReport {
    pub site: Site,
    pub year: i32,
    pub month: Option<u32>,
    /// Category the report was restricted to, if any
    pub category: Option<Category>,
    pub visits: u64,
    pub unique_patients: u64,
    pub services: ServiceTally,
    /// Breakdown keyed by "YYYY-MM"
    pub monthly: BTreeMap<String, MonthlyStats>,
}

/// Signed change from the first period to the second.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Differences {
    pub visits: i64,
    pub unique_patients: i64,
    pub services: BTreeMap<String, i64>,
}

impl Differences {
    pub fn is_zero(&self) -> bool {
        self.visits == 0 && self.unique_patients == 0 && self.services.values().all(|v| *v == 0)
    }
}

/// Two reports side by side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    pub period1: StatisticsReport,
    pub period2: StatisticsReport,
    pub differences: Differences,
}

#[derive(Default)]
struct Tally<'a> {
    visits: u64,
    patients: BTreeSet<&'a str>,
    services: ServiceTally,
}

impl<'a> Tally<'a> {
    fn add(&mut self, appointment: &'a Appointment) {
        self.visits += 1;
        self.patients.insert(&appointment.patient_id);
        for code in &appointment.services {
            *self.services.entry(code.clone()).or_insert(0) += 1;
        }
    }

    fn finish(self) -> MonthlyStats {
        MonthlyStats {
            visits: self.visits,
            unique_patients: self.patients.len() as u64,
            services: self.services,
        }
    }
}

/// Aggregate appointments already selected for `site`, `period` and `category`.
pub fn summarize(
    site: Site,
    period: Period,
    category: Option<Category>,
    appointments: &[Appointment],
) -> StatisticsReport {
    let mut total = Tally::default();
    let mut by_month: BTreeMap<String, Tally<'_>> = BTreeMap::new();

    for appointment in appointments {
        total.add(appointment);
        by_month
            .entry(appointment.month_key())
            .or_default()
            .add(appointment);
    }

    let total = total.finish();
    StatisticsReport {
        site,
        year: period.year,
        month: period.month,
        category,
        visits: total.visits,
        unique_patients: total.unique_patients,
        services: total.services,
        monthly: by_month
            .into_iter()
            .map(|(month, tally)| (month, tally.finish()))
            .collect(),
    }
}

/// Differences `period2 - period1` over the union of service codes.
pub fn compare(period1: StatisticsReport, period2: StatisticsReport) -> Comparison {
    let codes: BTreeSet<&String> = period1.services.keys().chain(period2.services.keys()).collect();

    let services = codes
        .into_iter()
        .map(|code| {
            let before = period1.services.get(code).copied().unwrap_or(0) as i64;
            let after = period2.services.get(code).copied().unwrap_or(0) as i64;
            (code.clone(), after - before)
        })
        .collect();

    let differences = Differences {
        visits: period2.visits as i64 - period1.visits as i64,
        unique_patients: period2.unique_patients as i64 - period1.unique_patients as i64,
        services,
    };

    Comparison {
        period1,
        period2,
        differences,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewAppointment;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn visit(patient: &str, month: u32, day: u32, services: &[&str]) -> Appointment {
        Appointment::new(NewAppointment {
            patient_id: patient.into(),
            site: Site::PtaCentro,
            date: NaiveDate::from_ymd_opt(2026, month, day).unwrap(),
            time: "09:00".into(),
            category: Category::Med,
            services: services.iter().map(|s| s.to_string()).collect(),
            notes: None,
        })
    }

    fn year() -> Period {
        Period::year(2026).unwrap()
    }

    #[test]
    fn test_empty_period() {
        let report = summarize(Site::PtaCentro, year(), None, &[]);
        assert_eq!(report.visits, 0);
        assert_eq!(report.unique_patients, 0);
        assert!(report.services.is_empty());
        assert!(report.monthly.is_empty());
    }

    #[test]
    fn test_totals_and_monthly_breakdown() {
        let visits = vec![
            visit("p1", 1, 5, &["simple_dressing", "bandage"]),
            visit("p1", 1, 12, &["simple_dressing"]),
            visit("p2", 3, 2, &["advanced_dressing"]),
        ];
        let report = summarize(Site::PtaCentro, year(), Some(Category::Med), &visits);

        assert_eq!(report.visits, 3);
        assert_eq!(report.unique_patients, 2);
        assert_eq!(report.services["simple_dressing"], 2);
        assert_eq!(report.services["bandage"], 1);

        let january = &report.monthly["2026-01"];
        assert_eq!(january.visits, 2);
        assert_eq!(january.unique_patients, 1);
        assert_eq!(report.monthly["2026-03"].services["advanced_dressing"], 1);
        assert!(!report.monthly.contains_key("2026-02"));
    }

    #[test]
    fn test_compare_union_of_codes() {
        let first = summarize(
            Site::PtaCentro,
            year(),
            None,
            &[visit("p1", 1, 5, &["bandage", "bandage_removal"])],
        );
        let second = summarize(
            Site::PtaCentro,
            year(),
            None,
            &[
                visit("p1", 2, 5, &["bandage"]),
                visit("p2", 2, 6, &["wound_irrigation"]),
            ],
        );

        let diff = compare(first, second).differences;
        assert_eq!(diff.visits, 1);
        assert_eq!(diff.unique_patients, 1);
        assert_eq!(diff.services["bandage"], 0);
        assert_eq!(diff.services["bandage_removal"], -1);
        assert_eq!(diff.services["wound_irrigation"], 1);
    }

    fn arb_visit() -> impl Strategy<Value = Appointment> {
        (
            prop::sample::select(vec!["p1", "p2", "p3", "p4"]),
            1u32..=12,
            1u32..=28,
            prop::collection::vec(prop::sample::select(vec!["a", "b", "c"]), 0..4),
        )
            .prop_map(|(patient, month, day, services)| visit(patient, month, day, &services))
    }

    proptest! {
        #[test]
        fn self_comparison_is_zero(visits in prop::collection::vec(arb_visit(), 0..40)) {
            let report = summarize(Site::PtaCentro, year(), None, &visits);
            let comparison = compare(report.clone(), report);
            prop_assert!(comparison.differences.is_zero());
        }

        #[test]
        fn monthly_visits_sum_to_total(visits in prop::collection::vec(arb_visit(), 0..40)) {
            let report = summarize(Site::PtaCentro, year(), None, &visits);
            let monthly_total: u64 = report.monthly.values().map(|m| m.visits).sum();
            prop_assert_eq!(monthly_total, report.visits);
            prop_assert!(report.unique_patients <= report.visits);
        }
    }
}
