//! Time grid model for the weekly timeline.
//!
//! A day is drawn from `START_HOUR` to `END_HOUR` in fixed 30-minute slots and
//! a week is seven days starting on Monday. Everything here is a pure
//! conversion; only the explicit parsers can fail.

use std::fmt;

use chrono::{Datelike, Duration as ChronoDuration, Local, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::fields::Duration;

pub const START_HOUR: u32 = 5;
pub const END_HOUR: u32 = 24;
pub const SLOT_MINUTES: u32 = 30;
pub const TOTAL_SLOTS: u32 = (END_HOUR - START_HOUR) * 60 / SLOT_MINUTES;
pub const DAYS_PER_WEEK: u8 = 7;

pub const DAY_NAMES: [&str; 7] = [
    "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday",
];

/// Number of slots a task of `duration` covers (rounded up).
pub fn slots_needed(duration: Duration) -> u32 {
    duration.minutes().div_ceil(SLOT_MINUTES)
}

/// Latest legal start slot for `duration`, or `None` when it cannot fit in a day.
pub fn max_start(duration: Duration) -> Option<u32> {
    TOTAL_SLOTS.checked_sub(slots_needed(duration))
}

/// Wall-clock label of a slot start, e.g. "9:30 AM".
pub fn time_label(slot: u32) -> String {
    let total = START_HOUR * 60 + slot * SLOT_MINUTES;
    let h24 = (total / 60) % 24;
    let m = total % 60;
    let period = if h24 >= 12 { "PM" } else { "AM" };
    let h12 = if h24 % 12 == 0 { 12 } else { h24 % 12 };
    format!("{h12}:{m:02} {period}")
}

/// Short 24h label used by the terminal grid, e.g. "09:30".
pub fn short_time_label(slot: u32) -> String {
    let total = START_HOUR * 60 + slot * SLOT_MINUTES;
    format!("{:02}:{:02}", (total / 60) % 24, total % 60)
}

/// Slot containing a wall-clock time ("HH:MM"). Times off the half hour round down.
pub fn slot_from_time(s: &str) -> Option<u32> {
    let time = NaiveTime::parse_from_str(s.trim(), "%H:%M").ok()?;
    let minutes = time.hour() * 60 + time.minute();
    let offset = minutes.checked_sub(START_HOUR * 60)?;
    let slot = offset / SLOT_MINUTES;
    (slot < TOTAL_SLOTS).then_some(slot)
}

/// Parse a day argument: "mon", "monday", or an index "0".."6".
pub fn parse_day(s: &str) -> Option<u8> {
    let s = s.trim().to_lowercase();
    if let Ok(i) = s.parse::<u8>() {
        return (i < DAYS_PER_WEEK).then_some(i);
    }
    DAY_NAMES
        .iter()
        .position(|name| {
            let name = name.to_lowercase();
            name == s || (s.len() >= 3 && name.starts_with(&s))
        })
        .map(|i| i as u8)
}

/// UTC offset tag stored alongside a placement, e.g. "+02:00".
pub fn local_timezone_tag() -> String {
    Local::now().format("%:z").to_string()
}

/// Monday-aligned date identifying a week. Serialized as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "NaiveDate", into = "NaiveDate")]
pub struct WeekKey(NaiveDate);

impl WeekKey {
    /// The week that contains `date`.
    pub fn containing(date: NaiveDate) -> Self {
        let offset = date.weekday().num_days_from_monday() as i64;
        WeekKey(date - ChronoDuration::days(offset))
    }

    /// The week containing today (local time).
    pub fn current() -> Self {
        Self::containing(Local::now().date_naive())
    }

    /// Parse an ISO date; any day of the week resolves to its Monday.
    pub fn parse(s: &str) -> Option<Self> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .ok()
            .map(Self::containing)
    }

    pub fn monday(self) -> NaiveDate {
        self.0
    }

    /// The week `weeks` weeks later (negative for earlier).
    pub fn shift(self, weeks: i64) -> Self {
        WeekKey(self.0 + ChronoDuration::weeks(weeks))
    }

    /// Calendar date of day `day` (0 = Monday) in this week.
    pub fn day_date(self, day: u8) -> NaiveDate {
        self.0 + ChronoDuration::days(day.min(DAYS_PER_WEEK - 1) as i64)
    }

    /// Day index of `date` if it falls inside this week.
    pub fn day_of(self, date: NaiveDate) -> Option<u8> {
        let delta = (date - self.0).num_days();
        (0..DAYS_PER_WEEK as i64).contains(&delta).then_some(delta as u8)
    }

    /// Header label, e.g. "Week of October 19, 2026".
    pub fn label(self) -> String {
        format!("Week of {}", self.0.format("%B %-d, %Y"))
    }
}

impl From<NaiveDate> for WeekKey {
    fn from(date: NaiveDate) -> Self {
        WeekKey::containing(date)
    }
}

impl From<WeekKey> for NaiveDate {
    fn from(week: WeekKey) -> NaiveDate {
        week.0
    }
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Column label of a day in a week, e.g. "Oct 21".
pub fn day_label(week: WeekKey, day: u8) -> String {
    week.day_date(day).format("%b %-d").to_string()
}
