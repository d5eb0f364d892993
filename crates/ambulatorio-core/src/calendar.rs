//! Appointment slots and public holidays.

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::Serialize;

const SLOT_MINUTES: i64 = 30;

/// Opening hours as `[start, end)` pairs.
const MORNING: ((u32, u32), (u32, u32)) = ((8, 30), (13, 0));
const AFTERNOON: ((u32, u32), (u32, u32)) = ((15, 0), (17, 0));

/// Fixed-date holidays as (month, day).
const FIXED_HOLIDAYS: [(u32, u32); 11] = [
    (1, 1),
    (1, 6),
    (4, 25),
    (5, 1),
    (6, 2),
    (7, 15),
    (8, 15),
    (11, 1),
    (12, 8),
    (12, 25),
    (12, 26),
];

/// Easter Sunday for the years the service plans ahead.
const EASTER_SUNDAYS: [(i32, u32, u32); 5] = [
    (2026, 4, 5),
    (2027, 3, 28),
    (2028, 4, 16),
    (2029, 4, 1),
    (2030, 4, 21),
];

/// Bookable slot start times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeSlots {
    pub morning: Vec<String>,
    pub afternoon: Vec<String>,
    pub all: Vec<String>,
}

fn slots_between(start: (u32, u32), end: (u32, u32)) -> Vec<String> {
    let (Some(mut current), Some(end)) = (
        NaiveTime::from_hms_opt(start.0, start.1, 0),
        NaiveTime::from_hms_opt(end.0, end.1, 0),
    ) else {
        return Vec::new();
    };

    let mut slots = Vec::new();
    while current < end {
        slots.push(current.format("%H:%M").to_string());
        current += Duration::minutes(SLOT_MINUTES);
    }
    slots
}

/// Every slot of the working day, morning then afternoon.
pub fn time_slots() -> TimeSlots {
    let morning = slots_between(MORNING.0, MORNING.1);
    let afternoon = slots_between(AFTERNOON.0, AFTERNOON.1);
    let all = morning.iter().chain(afternoon.iter()).cloned().collect();
    TimeSlots {
        morning,
        afternoon,
        all,
    }
}

/// Whether `time` ("HH:MM") is a bookable slot.
pub fn is_valid_slot(time: &str) -> bool {
    time_slots().all.iter().any(|slot| slot == time)
}

/// Public holidays in `year`, in calendar order.
///
/// Easter is only known for the years in the table; other years omit it.
pub fn holidays(year: i32) -> Vec<NaiveDate> {
    let mut days: Vec<NaiveDate> = FIXED_HOLIDAYS
        .iter()
        .filter_map(|(month, day)| NaiveDate::from_ymd_opt(year, *month, *day))
        .collect();

    if let Some(easter) = easter_sunday(year) {
        days.push(easter);
        days.push(easter + Duration::days(1));
    }

    days.sort();
    days
}

/// Easter Sunday for `year`, if it is in the table.
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    EASTER_SUNDAYS
        .iter()
        .find(|(y, _, _)| *y == year)
        .and_then(|(y, m, d)| NaiveDate::from_ymd_opt(*y, *m, *d))
}
