//! Calendar date-time values for recurrence math.
//!
//! A [`CalendarDate`] is a wall-clock date and time plus an opaque timezone
//! label. The label travels through serialization untouched and is never
//! consulted for offset arithmetic; all comparisons and calendar math operate
//! on the wall-clock value. Dates that overflow their month or year normalize
//! the way `mktime` does (January 60 becomes March 1, month 13 becomes
//! January of the next year).

use std::cmp::Ordering;
use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};

use crate::weekday::Weekday;

/// Returns whether `year` is a Gregorian leap year.
#[must_use]
pub const fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Wall-clock date and time with an opaque timezone label.
#[derive(Debug, Clone)]
pub struct CalendarDate {
    dt: NaiveDateTime,
    timezone: Option<String>,
}

impl CalendarDate {
    /// Creates a floating date-time. Returns `None` if the components do not
    /// form a valid calendar date or time.
    #[must_use]
    pub fn new(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Option<Self> {
        let dt = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)?;
        Some(Self { dt, timezone: None })
    }

    /// Creates a floating date at midnight.
    #[must_use]
    pub fn date(year: i32, month: u32, day: u32) -> Option<Self> {
        Self::new(year, month, day, 0, 0, 0)
    }

    /// Creates a date-time from components that may overflow their calendar
    /// bounds, normalizing month and day the way `mktime` does. `month` may
    /// be any integer (13 rolls into the next year); `day` may exceed the
    /// month length or be zero/negative.
    ///
    /// Returns `None` only when the result falls outside the representable
    /// year range or the time components are invalid.
    #[must_use]
    pub fn from_parts(
        year: i32,
        month: i64,
        day: i64,
        hour: u32,
        minute: u32,
        second: u32,
        timezone: Option<&str>,
    ) -> Option<Self> {
        let months = i64::from(year) * 12 + month - 1;
        let norm_year = i32::try_from(months.div_euclid(12)).ok()?;
        let norm_month = u32::try_from(months.rem_euclid(12) + 1).ok()?;
        let first = NaiveDate::from_ymd_opt(norm_year, norm_month, 1)?;
        let date = first.checked_add_signed(TimeDelta::try_days(day - 1)?)?;
        let dt = date.and_hms_opt(hour, minute, second)?;
        Some(Self {
            dt,
            timezone: timezone.map(str::to_owned),
        })
    }

    /// Parses `"YYYY-MM-DD HH:MM:SS"` with an optional `/timezone` suffix,
    /// the form rule hashes carry.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let (stamp, timezone) = match value.split_once('/') {
            Some((stamp, tz)) if !tz.is_empty() => (stamp, Some(tz)),
            Some((stamp, _)) => (stamp, None),
            None => (value, None),
        };
        let dt = NaiveDateTime::parse_from_str(stamp.trim(), "%Y-%m-%d %H:%M:%S").ok()?;
        Some(Self {
            dt,
            timezone: timezone.map(str::to_owned),
        })
    }

    /// Attaches a timezone label.
    #[must_use]
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    #[must_use]
    pub fn timezone(&self) -> Option<&str> {
        self.timezone.as_deref()
    }

    #[must_use]
    pub fn year(&self) -> i32 {
        self.dt.year()
    }

    #[must_use]
    pub fn month(&self) -> u32 {
        self.dt.month()
    }

    #[must_use]
    pub fn day(&self) -> u32 {
        self.dt.day()
    }

    #[must_use]
    pub fn hour(&self) -> u32 {
        self.dt.hour()
    }

    #[must_use]
    pub fn minute(&self) -> u32 {
        self.dt.minute()
    }

    #[must_use]
    pub fn second(&self) -> u32 {
        self.dt.second()
    }

    #[must_use]
    pub fn day_of_week(&self) -> Weekday {
        Weekday::from(self.dt.weekday())
    }

    /// One-based day of the year (1..=366).
    #[must_use]
    pub fn day_of_year(&self) -> u32 {
        self.dt.ordinal()
    }

    /// One-based week of the month: days 1-7 are week 1, 8-14 week 2, and so
    /// on. This is the ordinal used for "nth weekday of the month" rules.
    #[must_use]
    pub fn week_of_month(&self) -> u32 {
        (self.dt.day() + 6) / 7
    }

    /// Adds (or subtracts) whole days, preserving the time of day. Saturates
    /// at the representable range instead of overflowing.
    #[must_use]
    pub fn add_days(&self, days: i64) -> Self {
        let dt = TimeDelta::try_days(days)
            .and_then(|delta| self.dt.checked_add_signed(delta))
            .unwrap_or(if days >= 0 {
                NaiveDateTime::MAX
            } else {
                NaiveDateTime::MIN
            });
        Self {
            dt,
            timezone: self.timezone.clone(),
        }
    }

    /// Midnight on the Monday of this date's ISO 8601 week. Late-December
    /// dates that belong to week 1 of the next year and early-January dates
    /// that belong to week 52/53 of the previous year resolve accordingly.
    #[must_use]
    pub fn iso_week_start(&self) -> Self {
        let week = self.dt.date().iso_week();
        let monday = NaiveDate::from_isoywd_opt(week.year(), week.week(), chrono::Weekday::Mon)
            .unwrap_or_else(|| self.dt.date());
        Self {
            dt: monday.and_time(NaiveTime::MIN),
            timezone: self.timezone.clone(),
        }
    }

    /// This calendar day carrying `other`'s time of day and timezone label.
    #[must_use]
    pub fn with_time_of(&self, other: &Self) -> Self {
        Self {
            dt: self.dt.date().and_time(other.dt.time()),
            timezone: other.timezone.clone(),
        }
    }

    /// Whole days from this date to `other`, ignoring the time of day.
    /// Negative when `other` is earlier.
    #[must_use]
    pub fn days_until(&self, other: &Self) -> i64 {
        (other.dt.date() - self.dt.date()).num_days()
    }

    /// Compares calendar days only, ignoring the time of day.
    #[must_use]
    pub fn cmp_date(&self, other: &Self) -> Ordering {
        self.dt.date().cmp(&other.dt.date())
    }

    /// Canonical `YYYYMMDD` key used for exception and completion sets.
    #[must_use]
    pub fn date_key(&self) -> String {
        format!("{:04}{:02}{:02}", self.dt.year(), self.dt.month(), self.dt.day())
    }

    /// Formats with a strftime-style pattern.
    ///
    /// ## Panics
    ///
    /// Panics if `pattern` contains an invalid format specifier.
    #[must_use]
    pub fn format(&self, pattern: &str) -> String {
        self.dt.format(pattern).to_string()
    }

    /// The nth `weekday` of a month at midnight, floating. `nth` counts from
    /// 1; negative values count from the end of the month (-1 is the last).
    /// Returns `None` when the month has no such weekday.
    #[must_use]
    pub fn nth_weekday_of_month(year: i32, month: u32, weekday: Weekday, nth: i32) -> Option<Self> {
        if nth == 0 {
            return None;
        }
        let length = Self::days_in_month(year, month)?;
        let day = if nth > 0 {
            let first = NaiveDate::from_ymd_opt(year, month, 1)?;
            let shift = (i32::from(weekday.index())
                - i32::from(Weekday::from(first.weekday()).index()))
            .rem_euclid(7);
            let day = 1 + u32::try_from(shift).ok()? + (u32::try_from(nth).ok()? - 1) * 7;
            if day > length {
                return None;
            }
            day
        } else {
            let last = NaiveDate::from_ymd_opt(year, month, length)?;
            let back = (i32::from(Weekday::from(last.weekday()).index())
                - i32::from(weekday.index()))
            .rem_euclid(7);
            let back = u32::try_from(back).ok()? + (u32::try_from(-nth).ok()? - 1) * 7;
            if back >= length {
                return None;
            }
            length - back
        };
        Self::date(year, month, day)
    }

    /// Number of days in a month, or `None` for an invalid month.
    #[must_use]
    pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
        match month {
            1 | 3 | 5 | 7 | 8 | 10 | 12 => Some(31),
            4 | 6 | 9 | 11 => Some(30),
            2 => Some(if is_leap_year(year) { 29 } else { 28 }),
            _ => None,
        }
    }
}

// Comparisons ignore the timezone label: it is opaque, so wall-clock order is
// the only coherent order.
impl PartialEq for CalendarDate {
    fn eq(&self, other: &Self) -> bool {
        self.dt == other.dt
    }
}

impl Eq for CalendarDate {}

impl PartialOrd for CalendarDate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CalendarDate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dt.cmp(&other.dt)
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dt.format("%Y-%m-%d %H:%M:%S"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_dates() {
        assert!(CalendarDate::date(2007, 2, 30).is_none());
        assert!(CalendarDate::date(2007, 13, 1).is_none());
        assert!(CalendarDate::date(2007, 2, 29).is_none());
        assert!(CalendarDate::date(2008, 2, 29).is_some());
    }

    #[test]
    fn leap_years() {
        assert!(is_leap_year(2000));
        assert!(is_leap_year(2024));
        assert!(!is_leap_year(1900));
        assert!(!is_leap_year(2023));
    }

    #[test]
    fn from_parts_normalizes_overflow() {
        let d = CalendarDate::from_parts(2007, 13, 1, 0, 0, 0, None).unwrap();
        assert_eq!((d.year(), d.month(), d.day()), (2008, 1, 1));

        // January 60 is March 1 in a non-leap year.
        let d = CalendarDate::from_parts(2009, 1, 60, 0, 0, 0, None).unwrap();
        assert_eq!((d.year(), d.month(), d.day()), (2009, 3, 1));

        // ...and February 29 in a leap year.
        let d = CalendarDate::from_parts(2008, 1, 60, 0, 0, 0, None).unwrap();
        assert_eq!((d.year(), d.month(), d.day()), (2008, 2, 29));
    }

    #[test]
    fn iso_week_start_year_boundaries() {
        // 2011-01-01 is a Saturday in ISO week 52 of 2010.
        let d = CalendarDate::date(2011, 1, 1).unwrap();
        assert_eq!(d.iso_week_start().to_string(), "2010-12-27 00:00:00");

        // 2010-01-01 is a Friday in ISO week 53 of 2009.
        let d = CalendarDate::date(2010, 1, 1).unwrap();
        assert_eq!(d.iso_week_start().to_string(), "2009-12-28 00:00:00");

        // 2013-12-30 is a Monday in ISO week 1 of 2014.
        let d = CalendarDate::date(2013, 12, 31).unwrap();
        assert_eq!(d.iso_week_start().to_string(), "2013-12-30 00:00:00");
    }

    #[test]
    fn nth_weekday() {
        // First Thursday of March 2007.
        let d = CalendarDate::nth_weekday_of_month(2007, 3, Weekday::Thursday, 1).unwrap();
        assert_eq!((d.month(), d.day()), (3, 1));

        // Last Friday of January 2026.
        let d = CalendarDate::nth_weekday_of_month(2026, 1, Weekday::Friday, -1).unwrap();
        assert_eq!(d.day(), 30);

        // February 2007 has no fifth Monday.
        assert!(CalendarDate::nth_weekday_of_month(2007, 2, Weekday::Monday, 5).is_none());
        assert!(CalendarDate::nth_weekday_of_month(2007, 2, Weekday::Monday, 0).is_none());
    }

    #[test]
    fn week_of_month() {
        assert_eq!(CalendarDate::date(2007, 3, 1).unwrap().week_of_month(), 1);
        assert_eq!(CalendarDate::date(2007, 3, 7).unwrap().week_of_month(), 1);
        assert_eq!(CalendarDate::date(2007, 3, 8).unwrap().week_of_month(), 2);
        assert_eq!(CalendarDate::date(2007, 3, 31).unwrap().week_of_month(), 5);
    }

    #[test]
    fn day_arithmetic() {
        let d = CalendarDate::new(2007, 3, 1, 10, 0, 0).unwrap();
        assert_eq!(d.add_days(2).to_string(), "2007-03-03 10:00:00");
        assert_eq!(d.add_days(-1).to_string(), "2007-02-28 10:00:00");
        let later = CalendarDate::new(2007, 3, 5, 0, 0, 0).unwrap();
        assert_eq!(d.days_until(&later), 4);
        assert_eq!(later.days_until(&d), -4);
    }

    #[test]
    fn parse_with_timezone_suffix() {
        let d = CalendarDate::parse("2007-03-01 10:00:00/Europe/Berlin").unwrap();
        assert_eq!(d.to_string(), "2007-03-01 10:00:00");
        assert_eq!(d.timezone(), Some("Europe/Berlin"));

        let d = CalendarDate::parse("2007-03-01 10:00:00").unwrap();
        assert_eq!(d.timezone(), None);

        assert!(CalendarDate::parse("not a date").is_none());
    }

    #[test]
    fn comparison_ignores_timezone_label() {
        let a = CalendarDate::new(2007, 3, 1, 10, 0, 0).unwrap();
        let b = a.clone().with_timezone("America/New_York");
        assert_eq!(a, b);
        assert!(a < a.add_days(1));
    }

    #[test]
    fn date_key() {
        let d = CalendarDate::date(2007, 3, 5).unwrap();
        assert_eq!(d.date_key(), "20070305");
    }
}
