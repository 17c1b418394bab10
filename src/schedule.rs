//! Weekly schedule specification and next occurrence calculation.
//!
//! All arithmetic is naive local time: no timezone or DST handling. The
//! schedule repeats weekly at a fixed weekday and time-of-day.

use chrono::{Datelike, Duration, NaiveDateTime, Weekday};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur when constructing a schedule.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// Hour outside 0-23.
    #[error("hour out of range: {0} (expected 0-23)")]
    HourOutOfRange(u32),

    /// Minute outside 0-59.
    #[error("minute out of range: {0} (expected 0-59)")]
    MinuteOutOfRange(u32),

    /// Unrecognized weekday name.
    #[error("invalid weekday: {0}")]
    InvalidWeekday(String),
}

/// A weekly posting schedule: a weekday plus a time-of-day.
///
/// Immutable once constructed; both constructors validate the time fields,
/// so a `ScheduleSpec` always holds a representable time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawSpec")]
pub struct ScheduleSpec {
    weekday: Weekday,
    hour: u32,
    minute: u32,
}

/// Wire form of a schedule as it appears in the plan file.
#[derive(Debug, Deserialize)]
struct RawSpec {
    weekday: String,
    hour: u32,
    minute: u32,
}

impl TryFrom<RawSpec> for ScheduleSpec {
    type Error = ScheduleError;

    fn try_from(raw: RawSpec) -> Result<Self, Self::Error> {
        let weekday = Weekday::from_str(&raw.weekday)
            .map_err(|_| ScheduleError::InvalidWeekday(raw.weekday.clone()))?;
        Self::new(weekday, raw.hour, raw.minute)
    }
}

impl ScheduleSpec {
    /// Create a new schedule, validating the time fields.
    pub fn new(weekday: Weekday, hour: u32, minute: u32) -> Result<Self, ScheduleError> {
        if hour > 23 {
            return Err(ScheduleError::HourOutOfRange(hour));
        }
        if minute > 59 {
            return Err(ScheduleError::MinuteOutOfRange(minute));
        }
        Ok(Self {
            weekday,
            hour,
            minute,
        })
    }

    /// The scheduled weekday.
    pub fn weekday(&self) -> Weekday {
        self.weekday
    }

    /// The scheduled hour (24-hour clock).
    pub fn hour(&self) -> u32 {
        self.hour
    }

    /// The scheduled minute.
    pub fn minute(&self) -> u32 {
        self.minute
    }

    /// Get the next occurrence of this schedule strictly after `now`.
    ///
    /// The result always lands on the scheduled weekday at exactly
    /// `hour:minute:00`. When the scheduled time on the current day has
    /// already passed (or is exactly `now`), the occurrence rolls forward a
    /// full week rather than returning a past instant.
    pub fn next_occurrence(&self, now: NaiveDateTime) -> NaiveDateTime {
        let days_ahead = (i64::from(self.weekday.num_days_from_monday())
            - i64::from(now.weekday().num_days_from_monday()))
        .rem_euclid(7);

        let candidate = now
            .date()
            .and_hms_opt(self.hour, self.minute, 0)
            .expect("time fields validated at construction")
            + Duration::days(days_ahead);

        if candidate > now {
            candidate
        } else {
            candidate + Duration::days(7)
        }
    }
}

impl fmt::Display for ScheduleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:02}:{:02}", self.weekday, self.hour, self.minute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_result_lands_on_requested_weekday() {
        // 2024-01-03 is a Wednesday
        let now = at(2024, 1, 3, 14, 30);

        for weekday in [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ] {
            let spec = ScheduleSpec::new(weekday, 10, 0).unwrap();
            let next = spec.next_occurrence(now);
            assert_eq!(next.weekday(), weekday);
        }
    }

    #[test]
    fn test_result_has_exact_time_with_zero_seconds() {
        let now = at(2024, 1, 3, 23, 59);
        let spec = ScheduleSpec::new(Weekday::Fri, 9, 45).unwrap();

        let next = spec.next_occurrence(now);

        assert_eq!(next.hour(), 9);
        assert_eq!(next.minute(), 45);
        assert_eq!(next.second(), 0);
    }

    #[test]
    fn test_same_day_before_target_time_returns_same_day() {
        // 2024-01-01 is a Monday
        let now = at(2024, 1, 1, 8, 0);
        let spec = ScheduleSpec::new(Weekday::Mon, 10, 0).unwrap();

        let next = spec.next_occurrence(now);

        assert_eq!(next, at(2024, 1, 1, 10, 0));
        assert!(next > now);
    }

    #[test]
    fn test_same_day_after_target_time_rolls_to_next_week() {
        let now = at(2024, 1, 1, 11, 30);
        let spec = ScheduleSpec::new(Weekday::Mon, 10, 0).unwrap();

        let next = spec.next_occurrence(now);

        assert_eq!(next, at(2024, 1, 8, 10, 0));
    }

    #[test]
    fn test_exact_target_instant_rolls_to_next_week() {
        let now = at(2024, 1, 1, 10, 0);
        let spec = ScheduleSpec::new(Weekday::Mon, 10, 0).unwrap();

        let next = spec.next_occurrence(now);

        assert_eq!(next, at(2024, 1, 8, 10, 0));
    }

    #[test]
    fn test_earlier_weekday_in_week_wraps_forward() {
        // Wednesday now, Monday target: 5 days ahead, never negative
        let now = at(2024, 1, 3, 14, 0);
        let spec = ScheduleSpec::new(Weekday::Mon, 10, 0).unwrap();

        let next = spec.next_occurrence(now);

        assert_eq!(next, at(2024, 1, 8, 10, 0));
        assert!(next > now);
    }

    #[test]
    fn test_result_is_always_in_the_future() {
        let base = at(2024, 6, 15, 17, 23);
        for day_offset in 0..7 {
            let now = base + Duration::days(day_offset);
            for weekday in [Weekday::Mon, Weekday::Thu, Weekday::Sun] {
                let spec = ScheduleSpec::new(weekday, 17, 23).unwrap();
                let next = spec.next_occurrence(now);
                assert!(next > now, "next {} not after now {}", next, now);
                assert!(next - now <= Duration::days(7));
            }
        }
    }

    #[test]
    fn test_hour_out_of_range_returns_error() {
        let result = ScheduleSpec::new(Weekday::Mon, 24, 0);
        assert!(matches!(result, Err(ScheduleError::HourOutOfRange(24))));
    }

    #[test]
    fn test_minute_out_of_range_returns_error() {
        let result = ScheduleSpec::new(Weekday::Mon, 10, 60);
        assert!(matches!(result, Err(ScheduleError::MinuteOutOfRange(60))));
    }

    #[test]
    fn test_deserialize_from_yaml_with_full_weekday_name() {
        let spec: ScheduleSpec =
            serde_yaml::from_str("weekday: monday\nhour: 10\nminute: 0\n").unwrap();
        assert_eq!(spec.weekday(), Weekday::Mon);
        assert_eq!(spec.hour(), 10);
        assert_eq!(spec.minute(), 0);
    }

    #[test]
    fn test_deserialize_from_yaml_with_abbreviated_weekday() {
        let spec: ScheduleSpec =
            serde_yaml::from_str("weekday: Thu\nhour: 18\nminute: 30\n").unwrap();
        assert_eq!(spec.weekday(), Weekday::Thu);
    }

    #[test]
    fn test_deserialize_invalid_weekday_returns_error() {
        let result: Result<ScheduleSpec, _> =
            serde_yaml::from_str("weekday: someday\nhour: 10\nminute: 0\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_out_of_range_hour_returns_error() {
        let result: Result<ScheduleSpec, _> =
            serde_yaml::from_str("weekday: monday\nhour: 24\nminute: 0\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_display_format() {
        let spec = ScheduleSpec::new(Weekday::Mon, 9, 5).unwrap();
        assert_eq!(spec.to_string(), "Mon 09:05");
    }
}
