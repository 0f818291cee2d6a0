//! Timestamps embedded in staging and backup file names.

use std::fmt;

use chrono::{DateTime, TimeZone};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// `strftime` pattern for file name timestamps (`YYYYMMDD_HHMMSS`).
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// A `YYYYMMDD_HHMMSS` timestamp in local time.
///
/// Lexicographic order matches chronological order, which the consolidator
/// relies on when ordering staged files.
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use seed_data::BatchTimestamp;
///
/// let at = Utc.with_ymd_and_hms(2025, 6, 24, 9, 5, 3).single().expect("valid time");
/// assert_eq!(BatchTimestamp::from_datetime(&at).as_str(), "20250624_090503");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchTimestamp(String);

impl BatchTimestamp {
    /// Reads the clock's local time.
    #[must_use]
    pub fn now(clock: &dyn Clock) -> Self {
        Self::from_datetime(&clock.local())
    }

    /// Formats `at` in its own time zone.
    #[must_use]
    pub fn from_datetime<Tz>(at: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        Self(at.format(TIMESTAMP_FORMAT).to_string())
    }

    /// Returns the formatted timestamp.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BatchTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Clock frozen at a single instant.
#[cfg(test)]
pub(crate) struct FixedClock(pub(crate) DateTime<chrono::Utc>);

#[cfg(test)]
impl Clock for FixedClock {
    fn local(&self) -> DateTime<chrono::Local> {
        self.0.with_timezone(&chrono::Local)
    }

    fn utc(&self) -> DateTime<chrono::Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Local, Utc};

    use super::*;

    #[test]
    fn now_uses_local_time() {
        let at = Utc
            .with_ymd_and_hms(2025, 1, 31, 23, 59, 59)
            .single()
            .expect("valid time");
        let clock = FixedClock(at);

        let expected = at.with_timezone(&Local).format("%Y%m%d_%H%M%S").to_string();
        assert_eq!(BatchTimestamp::now(&clock).as_str(), expected);
    }

    #[test]
    fn ordering_is_chronological() {
        let earlier = Utc
            .with_ymd_and_hms(2025, 6, 9, 23, 0, 0)
            .single()
            .expect("valid time");
        let later = Utc
            .with_ymd_and_hms(2025, 6, 10, 1, 0, 0)
            .single()
            .expect("valid time");

        assert!(BatchTimestamp::from_datetime(&earlier) < BatchTimestamp::from_datetime(&later));
    }
}
