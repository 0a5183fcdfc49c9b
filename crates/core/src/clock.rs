//! Time source abstraction.
//!
//! Document numbers embed the calendar date at generation time and queue
//! entries carry a capture timestamp; both go through a `Clock` so tests can
//! pin the date.

use chrono::{DateTime, Local, NaiveDate, Utc};

/// Source of "now".
pub trait Clock: Send + Sync {
    /// Current instant (UTC).
    fn now(&self) -> DateTime<Utc>;

    /// Current calendar date as seen by the user (local time zone).
    fn today(&self) -> NaiveDate;
}

/// Wall clock of the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock frozen at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    at: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self { at }
    }

    /// Noon UTC on the given date. Returns `None` for an invalid date.
    pub fn on(year: i32, month: u32, day: u32) -> Option<Self> {
        let at = NaiveDate::from_ymd_opt(year, month, day)?
            .and_hms_opt(12, 0, 0)?
            .and_utc();
        Some(Self { at })
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.at
    }

    fn today(&self) -> NaiveDate {
        self.at.date_naive()
    }
}
