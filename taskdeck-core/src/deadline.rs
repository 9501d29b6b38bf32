//! Deadline presets offered when creating and editing tasks.

use std::fmt;
use std::str::FromStr;

use chrono::{Local, TimeZone};

use crate::error::TaskError;

pub const HOUR_MS: i64 = 60 * 60 * 1000;
pub const DAY_MS: i64 = 24 * HOUR_MS;

/// "Due in" choices at creation. `deadline = now + duration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DueIn {
    OneHour,
    TwoHours,
    OneDay,
    OneWeek,
    OneMonth,
}

impl DueIn {
    pub const ALL: [DueIn; 5] = [
        DueIn::OneHour,
        DueIn::TwoHours,
        DueIn::OneDay,
        DueIn::OneWeek,
        DueIn::OneMonth,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DueIn::OneHour => "1 Hour",
            DueIn::TwoHours => "2 Hours",
            DueIn::OneDay => "1 Day",
            DueIn::OneWeek => "1 Week",
            DueIn::OneMonth => "1 Month",
        }
    }

    pub fn duration_ms(self) -> i64 {
        match self {
            DueIn::OneHour => HOUR_MS,
            DueIn::TwoHours => 2 * HOUR_MS,
            DueIn::OneDay => DAY_MS,
            DueIn::OneWeek => 7 * DAY_MS,
            // A month is a flat 30 days.
            DueIn::OneMonth => 30 * DAY_MS,
        }
    }

    pub fn deadline_from(self, now_ms: i64) -> i64 {
        now_ms + self.duration_ms()
    }
}

impl fmt::Display for DueIn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DueIn {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        DueIn::ALL
            .into_iter()
            .find(|d| d.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| TaskError::validation(format!("unknown duration '{s}'")))
    }
}

/// "Extend" choices in the edit dialog. Extends the current deadline, or now
/// when the task has none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extension {
    Hour,
    Day,
    Week,
}

impl Extension {
    pub const ALL: [Extension; 3] = [Extension::Hour, Extension::Day, Extension::Week];

    pub fn label(self) -> &'static str {
        match self {
            Extension::Hour => "+1 Hour",
            Extension::Day => "+1 Day",
            Extension::Week => "+1 Week",
        }
    }

    pub fn duration_ms(self) -> i64 {
        match self {
            Extension::Hour => HOUR_MS,
            Extension::Day => DAY_MS,
            Extension::Week => 7 * DAY_MS,
        }
    }

    pub fn extend(self, current: Option<i64>, now_ms: i64) -> i64 {
        current.unwrap_or(now_ms) + self.duration_ms()
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Extension {
    type Err = TaskError;

    /// Accepts "+1 Day" as well as "1 day" / "day".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().trim_start_matches('+').trim_start_matches("1 ").trim();
        match norm.to_ascii_lowercase().as_str() {
            "hour" => Ok(Extension::Hour),
            "day" => Ok(Extension::Day),
            "week" => Ok(Extension::Week),
            _ => Err(TaskError::validation(format!("unknown extension '{s}'"))),
        }
    }
}

/// Short local date for a card footer, e.g. "Mar 5". "No Date" when unset.
pub fn format_deadline(deadline_ms: Option<i64>) -> String {
    deadline_ms
        .and_then(|ms| Local.timestamp_millis_opt(ms).single())
        .map(|dt| dt.format("%b %-d").to_string())
        .unwrap_or_else(|| "No Date".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_day_is_86_400_000_ms_from_now() {
        let now = 1_700_000_000_000;
        assert_eq!(DueIn::OneDay.deadline_from(now), now + 86_400_000);
        assert_eq!("1 day".parse::<DueIn>().unwrap(), DueIn::OneDay);
        assert!("3 Days".parse::<DueIn>().is_err());
    }

    #[test]
    fn extension_builds_on_existing_deadline_or_now() {
        assert_eq!(Extension::Hour.extend(Some(1_000), 50), 1_000 + HOUR_MS);
        assert_eq!(Extension::Week.extend(None, 50), 50 + 7 * DAY_MS);
        assert_eq!("+1 Day".parse::<Extension>().unwrap(), Extension::Day);
        assert_eq!("week".parse::<Extension>().unwrap(), Extension::Week);
    }

    #[test]
    fn missing_deadline_formats_as_no_date() {
        assert_eq!(format_deadline(None), "No Date");
        assert!(!format_deadline(Some(1_700_000_000_000)).is_empty());
    }
}
