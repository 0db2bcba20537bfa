//! How much of the current year is gone and what is left of it.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;

pub const DEFAULT_DAILY_POMODOROS: u32 = 3;
pub const DAILY_POMODOROS_RANGE: std::ops::RangeInclusive<u32> = 1..=20;

/// Countdown to the last millisecond of the year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct YearProgress {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    /// Share of the year already elapsed, 0 to 100.
    pub percentage: f64,
}

impl YearProgress {
    /// Computes the progress of the year containing `now`.
    pub fn at(now: NaiveDateTime) -> Self {
        let year = now.year();
        let start = NaiveDate::from_ymd_opt(year, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0));
        let end = NaiveDate::from_ymd_opt(year, 12, 31)
            .and_then(|d| d.and_hms_milli_opt(23, 59, 59, 999));
        let (Some(start), Some(end)) = (start, end) else {
            return Self::default();
        };

        let total_ms = (end - start).num_milliseconds();
        let elapsed_ms = (now - start).num_milliseconds();
        let remaining_ms = (end - now).num_milliseconds().max(0);

        const DAY_MS: i64 = 24 * 60 * 60 * 1000;
        const HOUR_MS: i64 = 60 * 60 * 1000;
        const MINUTE_MS: i64 = 60 * 1000;

        Self {
            days: remaining_ms / DAY_MS,
            hours: (remaining_ms % DAY_MS) / HOUR_MS,
            minutes: (remaining_ms % HOUR_MS) / MINUTE_MS,
            seconds: (remaining_ms % MINUTE_MS) / 1000,
            percentage: elapsed_ms as f64 / total_ms as f64 * 100.0,
        }
    }

    /// Pomodoros completed by year end at `daily_pomodoros` per remaining day.
    pub fn estimated_pomodoros(&self, daily_pomodoros: u32) -> i64 {
        self.days * i64::from(clamp_daily(daily_pomodoros))
    }
}

pub fn clamp_daily(daily_pomodoros: u32) -> u32 {
    daily_pomodoros.clamp(*DAILY_POMODOROS_RANGE.start(), *DAILY_POMODOROS_RANGE.end())
}
