//! Wall-clock access and elapsed-time measurement.

use chrono::{DateTime, Local, NaiveDate, TimeDelta};

/// Source of local wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;

    /// The local calendar date right now.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// The system wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Formats a date as the `YYYY-MM-DD` key used for daily statistics.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Measures whole seconds elapsed between wall-clock samples.
///
/// The baseline only moves forward by the seconds reported, so a sub-second
/// remainder is carried into the next measurement. A sample earlier than the
/// baseline (clock set backwards) reports zero and rebases.
#[derive(Debug, Clone)]
pub struct ElapsedTracker {
    last: DateTime<Local>,
}

impl ElapsedTracker {
    pub fn new(now: DateTime<Local>) -> Self {
        Self { last: now }
    }

    /// Restarts measurement from `now`.
    pub fn reset(&mut self, now: DateTime<Local>) {
        self.last = now;
    }

    /// Returns the whole seconds elapsed since the previous sample.
    pub fn take_elapsed(&mut self, now: DateTime<Local>) -> i64 {
        let delta = now - self.last;
        if delta < TimeDelta::zero() {
            self.last = now;
            return 0;
        }

        let secs = delta.num_seconds();
        self.last += TimeDelta::seconds(secs);
        secs
    }
}

/// A clock that only moves when told to.
#[cfg(test)]
#[derive(Debug)]
pub struct ManualClock {
    now: std::sync::Mutex<DateTime<Local>>,
}

#[cfg(test)]
impl ManualClock {
    pub fn at(now: DateTime<Local>) -> Self {
        Self {
            now: std::sync::Mutex::new(now),
        }
    }

    /// A fixed mid-morning timestamp.
    pub fn fixed() -> Self {
        use chrono::TimeZone;
        Self::at(Local.with_ymd_and_hms(2024, 3, 12, 10, 0, 0).unwrap())
    }

    pub fn advance_millis(&self, millis: i64) {
        let mut now = self.now.lock().unwrap();
        *now += TimeDelta::milliseconds(millis);
    }

    pub fn advance_secs(&self, secs: i64) {
        self.advance_millis(secs * 1000);
    }

    pub fn set(&self, to: DateTime<Local>) {
        *self.now.lock().unwrap() = to;
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.lock().unwrap()
    }
}
