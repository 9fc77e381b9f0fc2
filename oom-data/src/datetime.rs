//! Calendar date-time value type.
//!
//! [`CalendarDateTime`] is a wall-clock date and time with millisecond
//! precision and no time zone. It is the "rich" counterpart of the
//! storage-native [`NaiveDateTime`]: it exposes calendar arithmetic (Julian
//! day number, day of week, day of year) and converts losslessly to and from
//! the storage type through [`CalendarDateTime::to_naive`] and
//! [`CalendarDateTime::from_naive`].
//!
//! Precision policy: anything below one millisecond is truncated on the way
//! in. Values therefore survive any number of round-trips through a
//! `TIMESTAMP` column that stores at least millisecond precision.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use std::str::FromStr;

use crate::error::CodecError;

/// Julian day number of 0000-12-31 (proleptic Gregorian), chrono's day zero.
const JULIAN_DAY_OFFSET: i64 = 1_721_425;

const NANOS_PER_MILLI: u32 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CalendarDateTime(NaiveDateTime);

impl CalendarDateTime {
    /// Build from calendar components.
    ///
    /// Rejects components that do not name a real date and time (month 13,
    /// February 30th, hour 24, millisecond 1000, ...).
    pub fn new(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
        millisecond: u32,
    ) -> Result<Self, CodecError> {
        if millisecond > 999 {
            return Err(CodecError::InvalidDateTime(format!(
                "millisecond {millisecond} out of range"
            )));
        }
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            CodecError::InvalidDateTime(format!("no such date {year:04}-{month:02}-{day:02}"))
        })?;
        let time = date
            .and_hms_milli_opt(hour, minute, second, millisecond)
            .ok_or_else(|| {
                CodecError::InvalidDateTime(format!(
                    "no such time {hour:02}:{minute:02}:{second:02}.{millisecond:03}"
                ))
            })?;
        Ok(Self(time))
    }

    /// Midnight at the start of the given date.
    pub fn from_date(year: i32, month: u32, day: u32) -> Result<Self, CodecError> {
        Self::new(year, month, day, 0, 0, 0, 0)
    }

    /// Convert from the storage-native timestamp, truncating below one millisecond.
    pub fn from_naive(value: NaiveDateTime) -> Self {
        // chrono encodes a leap second as nanos >= 1s; clamp into the last millisecond.
        let millis = (value.nanosecond() / NANOS_PER_MILLI).min(999);
        let truncated = value
            .with_nanosecond(millis * NANOS_PER_MILLI)
            .unwrap_or(value);
        Self(truncated)
    }

    /// Convert to the storage-native timestamp. Exact.
    pub fn to_naive(self) -> NaiveDateTime {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    pub fn second(&self) -> u32 {
        self.0.second()
    }

    pub fn millisecond(&self) -> u32 {
        self.0.nanosecond() / NANOS_PER_MILLI
    }

    /// Julian day number of the date (the day starting at noon, astronomers' convention).
    pub fn julian_day_number(&self) -> i64 {
        i64::from(self.0.date().num_days_from_ce()) + JULIAN_DAY_OFFSET
    }

    /// ISO day of week, 1 = Monday .. 7 = Sunday.
    pub fn day_of_week(&self) -> u32 {
        self.0.weekday().number_from_monday()
    }

    /// 1-based ordinal day within the year.
    pub fn day_of_year(&self) -> u32 {
        self.0.ordinal()
    }

    pub fn is_leap_year(&self) -> bool {
        let year = self.year();
        year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
    }

    /// Shift by a number of milliseconds; `None` if the result leaves chrono's range.
    pub fn checked_add_millis(self, millis: i64) -> Option<Self> {
        self.0
            .checked_add_signed(chrono::Duration::milliseconds(millis))
            .map(Self)
    }
}

impl From<CalendarDateTime> for NaiveDateTime {
    fn from(value: CalendarDateTime) -> Self {
        value.to_naive()
    }
}

impl From<NaiveDateTime> for CalendarDateTime {
    fn from(value: NaiveDateTime) -> Self {
        Self::from_naive(value)
    }
}

impl std::fmt::Display for CalendarDateTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:03}",
            self.year(),
            self.month(),
            self.day(),
            self.hour(),
            self.minute(),
            self.second(),
            self.millisecond()
        )
    }
}

impl FromStr for CalendarDateTime {
    type Err = CodecError;

    /// Accepts `YYYY-MM-DD hh:mm:ss[.fff]`, with a space or `T` separator.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replacen('T', " ", 1);
        NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%d %H:%M:%S%.f")
            .map(Self::from_naive)
            .map_err(|e| CodecError::InvalidDateTime(format!("{s}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_components() {
        let dt = CalendarDateTime::new(2014, 1, 31, 11, 41, 32, 7).unwrap();
        assert_eq!(dt.year(), 2014);
        assert_eq!(dt.month(), 1);
        assert_eq!(dt.day(), 31);
        assert_eq!(dt.hour(), 11);
        assert_eq!(dt.minute(), 41);
        assert_eq!(dt.second(), 32);
        assert_eq!(dt.millisecond(), 7);
    }

    #[test]
    fn test_invalid_components_rejected() {
        assert!(CalendarDateTime::new(2014, 13, 1, 0, 0, 0, 0).is_err());
        assert!(CalendarDateTime::new(2014, 2, 29, 0, 0, 0, 0).is_err());
        assert!(CalendarDateTime::new(2014, 1, 1, 24, 0, 0, 0).is_err());
        assert!(CalendarDateTime::new(2014, 1, 1, 0, 0, 0, 1000).is_err());
        assert!(CalendarDateTime::new(2016, 2, 29, 0, 0, 0, 0).is_ok());
    }

    #[test]
    fn test_julian_day_number() {
        let j2000 = CalendarDateTime::from_date(2000, 1, 1).unwrap();
        assert_eq!(j2000.julian_day_number(), 2_451_545);
        let dt = CalendarDateTime::from_date(2014, 1, 31).unwrap();
        assert_eq!(dt.julian_day_number(), 2_456_689);
    }

    #[test]
    fn test_calendar_queries() {
        // 2014-01-31 was a Friday.
        let dt = CalendarDateTime::from_date(2014, 1, 31).unwrap();
        assert_eq!(dt.day_of_week(), 5);
        assert_eq!(dt.day_of_year(), 31);
        assert!(!dt.is_leap_year());
        assert!(CalendarDateTime::from_date(2000, 6, 1).unwrap().is_leap_year());
        assert!(!CalendarDateTime::from_date(1900, 6, 1).unwrap().is_leap_year());
    }

    #[test]
    fn test_naive_conversion_is_exact_at_millis() {
        let dt = CalendarDateTime::new(2014, 1, 31, 11, 41, 32, 250).unwrap();
        assert_eq!(CalendarDateTime::from_naive(dt.to_naive()), dt);
    }

    #[test]
    fn test_sub_millisecond_truncated() {
        let naive = NaiveDate::from_ymd_opt(2014, 1, 31)
            .unwrap()
            .and_hms_nano_opt(11, 41, 32, 123_987_654)
            .unwrap();
        let dt = CalendarDateTime::from_naive(naive);
        assert_eq!(dt.millisecond(), 123);
        assert_eq!(dt.to_naive().nanosecond(), 123_000_000);
    }

    #[test]
    fn test_display_and_parse() {
        let dt = CalendarDateTime::new(2014, 1, 31, 11, 41, 32, 5).unwrap();
        assert_eq!(dt.to_string(), "2014-01-31 11:41:32.005");
        assert_eq!("2014-01-31 11:41:32.005".parse::<CalendarDateTime>().unwrap(), dt);
        assert_eq!(
            "2014-01-31T11:41:32".parse::<CalendarDateTime>().unwrap(),
            CalendarDateTime::new(2014, 1, 31, 11, 41, 32, 0).unwrap()
        );
        assert!("31/01/2014".parse::<CalendarDateTime>().is_err());
    }

    #[test]
    fn test_ordering_and_shift() {
        let a = CalendarDateTime::new(2014, 1, 30, 10, 42, 34, 0).unwrap();
        let b = a.checked_add_millis(86_400_000).unwrap();
        assert!(b > a);
        assert_eq!(b.day(), 31);
        assert_eq!(b.hour(), 10);
    }
}
