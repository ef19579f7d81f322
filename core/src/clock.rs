//! Simulation clock — owns the month counter and the calendar date it maps to.

use crate::types::MonthIndex;
use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimClock {
    pub start_date: NaiveDate,
    pub month:      MonthIndex,
}

impl SimClock {
    pub fn new(start_date: NaiveDate) -> Self {
        Self { start_date, month: 0 }
    }

    /// Start from the local calendar date.
    pub fn starting_today() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }

    /// Advance one month. Returns the new month number.
    pub fn advance(&mut self) -> MonthIndex {
        self.month += 1;
        self.month
    }

    /// `start_date + month` calendar months. Days past the end of a
    /// shorter month clamp to its last day (Jan 31 → Feb 28).
    pub fn current_date(&self) -> NaiveDate {
        self.date_of(self.month)
    }

    pub fn date_of(&self, month: MonthIndex) -> NaiveDate {
        self.start_date
            .checked_add_months(Months::new(month))
            .unwrap_or(NaiveDate::MAX)
    }
}

/// The day after `date`, saturating at the calendar limit.
pub fn next_day(date: NaiveDate) -> NaiveDate {
    date.checked_add_days(Days::new(1)).unwrap_or(date)
}
