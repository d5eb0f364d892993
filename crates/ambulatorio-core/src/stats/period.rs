//! Reporting periods.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{StatsError, StatsResult};

/// A calendar year, or one month of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub month: Option<u32>,
}

impl Period {
    pub fn new(year: i32, month: Option<u32>) -> StatsResult<Self> {
        if let Some(m) = month {
            if !(1..=12).contains(&m) {
                return Err(StatsError::InvalidMonth(m));
            }
        }
        let period = Self { year, month };
        period.date_range()?;
        Ok(period)
    }

    pub fn year(year: i32) -> StatsResult<Self> {
        Self::new(year, None)
    }

    pub fn month(year: i32, month: u32) -> StatsResult<Self> {
        Self::new(year, Some(month))
    }

    /// Half-open `[start, end)` range covered by the period.
    ///
    /// December and whole-year periods end on January 1st of the next year.
    pub fn date_range(&self) -> StatsResult<(NaiveDate, NaiveDate)> {
        let invalid = || StatsError::InvalidYear(self.year);
        let next_year = self.year.checked_add(1).ok_or_else(invalid)?;

        let (start, end) = match self.month {
            Some(12) => (
                NaiveDate::from_ymd_opt(self.year, 12, 1),
                NaiveDate::from_ymd_opt(next_year, 1, 1),
            ),
            Some(m) => (
                NaiveDate::from_ymd_opt(self.year, m, 1),
                NaiveDate::from_ymd_opt(self.year, m + 1, 1),
            ),
            None => (
                NaiveDate::from_ymd_opt(self.year, 1, 1),
                NaiveDate::from_ymd_opt(next_year, 1, 1),
            ),
        };

        Ok((start.ok_or_else(invalid)?, end.ok_or_else(invalid)?))
    }
}
