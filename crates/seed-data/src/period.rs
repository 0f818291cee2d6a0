//! Generation periods and the caller-side rules for requesting them.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::PeriodError;

/// Largest window accepted by [`Period::recent`].
pub const MAX_RECENT_DAYS: u32 = 30;

/// Window used by [`Period::recent`] when the caller does not choose one.
pub const DEFAULT_RECENT_DAYS: u32 = 7;

/// An inclusive date range with `start <= end`.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use seed_data::Period;
///
/// let start = NaiveDate::from_ymd_opt(2025, 6, 10).expect("valid date");
/// let end = NaiveDate::from_ymd_opt(2025, 6, 24).expect("valid date");
/// let period = Period::new(start, end).expect("valid period");
///
/// assert_eq!(period.span_days(), 14);
/// assert!(period.contains(end));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    start: NaiveDate,
    end: NaiveDate,
}

impl Period {
    /// Builds a period, rejecting a start after the end.
    ///
    /// # Errors
    ///
    /// Returns [`PeriodError::StartAfterEnd`] when `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, PeriodError> {
        if start > end {
            return Err(PeriodError::StartAfterEnd { start, end });
        }
        Ok(Self { start, end })
    }

    /// Resolves a caller request into a period.
    ///
    /// The end defaults to `today`. A start after the end, or a start after
    /// `today`, is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`PeriodError`] when the bounds are invalid.
    ///
    /// # Example
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use seed_data::Period;
    ///
    /// let today = NaiveDate::from_ymd_opt(2025, 6, 24).expect("valid date");
    /// let start = NaiveDate::from_ymd_opt(2025, 6, 10).expect("valid date");
    ///
    /// let period = Period::resolve(start, None, today).expect("valid period");
    /// assert_eq!(period.end(), today);
    /// ```
    pub fn resolve(
        start: NaiveDate,
        end: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<Self, PeriodError> {
        let period = Self::new(start, end.unwrap_or(today))?;
        if start > today {
            return Err(PeriodError::StartInFuture { start, today });
        }
        Ok(period)
    }

    /// Returns the period covering the `days` days before `today`.
    ///
    /// # Errors
    ///
    /// Returns [`PeriodError::InvalidRecentDays`] unless
    /// `1 <= days <= MAX_RECENT_DAYS`.
    pub fn recent(days: u32, today: NaiveDate) -> Result<Self, PeriodError> {
        if !(1..=MAX_RECENT_DAYS).contains(&days) {
            return Err(PeriodError::InvalidRecentDays {
                days,
                max: MAX_RECENT_DAYS,
            });
        }
        let start = today
            .checked_sub_days(Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MIN);
        Self::new(start, today)
    }

    /// Returns the first day of the period.
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Returns the last day of the period.
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Returns the number of days between start and end.
    #[must_use]
    pub fn span_days(&self) -> u64 {
        u64::try_from((self.end - self.start).num_days()).unwrap_or(0)
    }

    /// Returns `true` when `date` falls inside the period, bounds included.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        (self.start..=self.end).contains(&date)
    }
}
