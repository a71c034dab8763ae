//! iCalendar 2.0 RRULE values (RFC 5545 §3.3.10, the subset the rule model
//! expresses).
//!
//! Parsing is permissive key=value scanning: unknown parts are ignored, an
//! unknown or missing FREQ leaves the rule non-recurring, and a COUNT
//! overrides an UNTIL when a producer sent both.

use tracing::debug;

use crate::date::CalendarDate;
use crate::rule::{RecurrenceRule, RecurrenceType};
use crate::weekday::{Weekday, WeekdayMask};

impl RecurrenceRule {
    /// Parses an iCalendar 2.0 RRULE value into a rule anchored at `start`.
    ///
    /// A bare-date UNTIL is moved to midnight of the following day so the
    /// final day's occurrence stays inside the bound. Malformed input yields
    /// a non-recurring rule.
    #[must_use]
    #[tracing::instrument(level = "debug", skip(start))]
    pub fn from_rrule20(start: CalendarDate, rrule: &str) -> Self {
        let mut rule = Self::new(start);
        let mut parts: Vec<(String, &str)> = Vec::new();
        for segment in rrule.split(';') {
            if let Some((key, value)) = segment.split_once('=') {
                parts.push((key.trim().to_ascii_uppercase(), value.trim()));
            }
        }
        let get = |key: &str| {
            parts
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| *v)
        };

        rule.set_interval(get("INTERVAL").and_then(|v| v.parse().ok()).unwrap_or(1));

        match get("FREQ").map(str::to_ascii_uppercase).as_deref() {
            Some("DAILY") => rule.set_recur_type(RecurrenceType::Daily),
            Some("WEEKLY") => {
                rule.set_recur_type(RecurrenceType::Weekly);
                let mask = get("BYDAY").map_or(WeekdayMask::EMPTY, parse_byday);
                rule.set_recur_on_days(if mask.is_empty() {
                    rule.start().day_of_week().mask()
                } else {
                    mask
                });
            }
            Some("MONTHLY") => rule.set_recur_type(match get("BYDAY") {
                Some(byday) if byday.contains('-') => RecurrenceType::MonthlyLastWeekday,
                Some(_) => RecurrenceType::MonthlyWeekday,
                None => RecurrenceType::MonthlyDate,
            }),
            Some("YEARLY") => rule.set_recur_type(if get("BYYEARDAY").is_some() {
                RecurrenceType::YearlyDay
            } else if get("BYDAY").is_some() {
                RecurrenceType::YearlyWeekday
            } else {
                RecurrenceType::YearlyDate
            }),
            other => debug!(freq = ?other, "unsupported FREQ, treating as non-recurring"),
        }

        if let Some(until) = get("UNTIL") {
            let end = parse_until(until, rule.start().timezone());
            rule.set_end_date(end);
        }
        // COUNT after UNTIL: when both are present, COUNT wins.
        if let Some(count) = get("COUNT") {
            if let Ok(n) = count.parse() {
                rule.set_count(n);
            }
        }
        rule
    }

    /// Serializes to an iCalendar 2.0 RRULE value. Non-recurring rules yield
    /// an empty string; INTERVAL is always emitted.
    #[must_use]
    pub fn to_rrule20(&self) -> String {
        let start = self.start();
        let interval = self.interval();
        let mut out = match self.recur_type() {
            RecurrenceType::None => return String::new(),
            RecurrenceType::Daily => format!("FREQ=DAILY;INTERVAL={interval}"),
            RecurrenceType::Weekly => {
                let days: Vec<&str> = self.recur_on_days().iter().map(Weekday::abbrev).collect();
                format!("FREQ=WEEKLY;INTERVAL={interval};BYDAY={}", days.join(","))
            }
            RecurrenceType::MonthlyDate => format!("FREQ=MONTHLY;INTERVAL={interval}"),
            RecurrenceType::MonthlyWeekday => format!(
                "FREQ=MONTHLY;INTERVAL={interval};BYDAY={}{}",
                start.week_of_month(),
                start.day_of_week().abbrev()
            ),
            RecurrenceType::MonthlyLastWeekday => format!(
                "FREQ=MONTHLY;INTERVAL={interval};BYDAY=-1{}",
                start.day_of_week().abbrev()
            ),
            RecurrenceType::YearlyDate => format!("FREQ=YEARLY;INTERVAL={interval}"),
            RecurrenceType::YearlyDay => format!(
                "FREQ=YEARLY;INTERVAL={interval};BYYEARDAY={}",
                start.day_of_year()
            ),
            RecurrenceType::YearlyWeekday => format!(
                "FREQ=YEARLY;INTERVAL={interval};BYDAY={}{};BYMONTH={}",
                start.week_of_month(),
                start.day_of_week().abbrev(),
                start.month()
            ),
        };
        if let Some(end) = self.end_date() {
            out.push_str(";UNTIL=");
            out.push_str(&super::stamp(end));
        } else if let Some(count) = self.count() {
            out.push_str(&format!(";COUNT={count}"));
        }
        out
    }
}

fn parse_byday(value: &str) -> WeekdayMask {
    let mut mask = WeekdayMask::EMPTY;
    for token in value.split(',') {
        let code = token
            .trim()
            .trim_start_matches(|c: char| c.is_ascii_digit() || c == '+' || c == '-');
        if let Some(day) = Weekday::parse_abbrev(code) {
            mask.insert(day);
        }
    }
    mask
}

/// Parses an UNTIL value, accepting basic and extended formats with or
/// without separators. A trailing `Z` labels the result UTC; a bare date is
/// advanced one day to midnight so it bounds inclusively.
fn parse_until(value: &str, start_timezone: Option<&str>) -> Option<CalendarDate> {
    let mut v = value.trim();
    let utc = v.ends_with('Z') || v.ends_with('z');
    if utc {
        v = &v[..v.len() - 1];
    }
    if let Some(dot) = v.find('.') {
        v = &v[..dot];
    }
    let digits: String = v.chars().filter(char::is_ascii_digit).collect();
    let field = |range: std::ops::Range<usize>| digits.get(range).and_then(|s| s.parse().ok());
    match digits.len() {
        14 => CalendarDate::from_parts(
            i32::try_from(field(0..4)?).ok()?,
            field(4..6)?,
            field(6..8)?,
            u32::try_from(field(8..10)?).ok()?,
            u32::try_from(field(10..12)?).ok()?,
            u32::try_from(field(12..14)?).ok()?,
            if utc { Some("UTC") } else { start_timezone },
        ),
        8 => CalendarDate::from_parts(
            i32::try_from(field(0..4)?).ok()?,
            field(4..6)?,
            field(6..8)? + 1,
            0,
            0,
            0,
            start_timezone,
        ),
        _ => None,
    }
}
