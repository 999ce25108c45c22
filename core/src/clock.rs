//! Simulation clock — calendar months and the sequential month loop.
//!
//! RULE: The generator advances strictly one month at a time.
//! Each month's postings may read the prior month's ending balances,
//! so months are never processed out of order.

use crate::error::{LedgerError, LedgerResult};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A calendar month, serialized as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    pub fn new(year: i32, month: u32) -> LedgerResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(LedgerError::InvalidMonth {
                value: format!("{year:04}-{month:02}"),
            });
        }
        Ok(Self { year, month })
    }

    /// January of `year`.
    pub const fn january(year: i32) -> Self {
        Self { year, month: 1 }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        self.day(1)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next().first_day().pred_opt().unwrap_or(self.first_day())
    }

    /// A date inside this month. Days past the month end clamp to the last day.
    pub fn day(&self, day: u32) -> NaiveDate {
        let clamped = day.max(1);
        NaiveDate::from_ymd_opt(self.year, self.month, clamped)
            .unwrap_or_else(|| self.last_day())
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LedgerError::InvalidMonth { value: s.to_string() };
        let (y, m) = s.trim().split_once('-').ok_or_else(invalid)?;
        if y.len() != 4 || m.len() != 2 {
            return Err(invalid());
        }
        let year = y.parse().map_err(|_| invalid())?;
        let month = m.parse().map_err(|_| invalid())?;
        Month::new(year, month).map_err(|_| invalid())
    }
}

impl TryFrom<String> for Month {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Month> for String {
    fn from(month: Month) -> Self {
        month.to_string()
    }
}

/// Owns the month loop state for a run.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthClock {
    start: Month,
    n_months: u32,
    elapsed: u32,
    upcoming: Month,
}

impl MonthClock {
    pub fn new(start: Month, n_months: u32) -> Self {
        Self {
            start,
            n_months,
            elapsed: 0,
            upcoming: start,
        }
    }

    /// All months of the run, in order.
    pub fn months(&self) -> Vec<Month> {
        std::iter::successors(Some(self.start), |m| Some(m.next()))
            .take(self.n_months as usize)
            .collect()
    }

    /// Advance one month. Returns None once the run is exhausted.
    pub fn advance(&mut self) -> Option<Month> {
        if self.elapsed >= self.n_months {
            return None;
        }
        let month = self.upcoming;
        self.upcoming = month.next();
        self.elapsed += 1;
        Some(month)
    }

    /// 1-based index of the most recently issued month.
    pub fn month_number(&self) -> u32 {
        self.elapsed
    }
}
