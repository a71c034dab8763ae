//! vCalendar 1.0 RRULE values (XAPIA CSA frequency grammar).
//!
//! The grammar is a frequency letter plus interval (`D2`, `W1`, `MP1`,
//! `MD1`, `YM1`, `YD1`), optional day or ordinal arguments, and a trailing
//! terminator: `#n` for a count (`#0` meaning forever) or a timestamp end
//! date. Yearly-by-weekday rules have no vCalendar 1.0 encoding and
//! serialize to an empty string.

use tracing::debug;

use crate::date::CalendarDate;
use crate::rule::{RecurrenceRule, RecurrenceType};
use crate::weekday::{Weekday, WeekdayMask};

impl RecurrenceRule {
    /// Parses a vCalendar 1.0 RRULE value into a rule anchored at `start`.
    ///
    /// Malformed input yields a non-recurring rule, never an error. A weekly
    /// rule without day codes recurs on the start date's weekday.
    #[must_use]
    #[tracing::instrument(level = "debug", skip(start))]
    pub fn from_rrule10(start: CalendarDate, rrule: &str) -> Self {
        let mut rule = Self::new(start);
        let input = rrule.trim();
        if input.is_empty() {
            return rule;
        }

        let freq_len = input.bytes().take_while(u8::is_ascii_uppercase).count();
        if freq_len == 0 {
            debug!("no frequency letter, treating as non-recurring");
            return rule;
        }
        let (freq, rest) = input.split_at(freq_len);
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        rule.set_interval(rest[..digits].parse().unwrap_or(1));
        let mut remainder = rest[digits..].trim_start();

        match freq {
            "D" => rule.set_recur_type(RecurrenceType::Daily),
            "W" => {
                rule.set_recur_type(RecurrenceType::Weekly);
                let mut mask = WeekdayMask::EMPTY;
                loop {
                    let (token, tail) = remainder.split_once(' ').unwrap_or((remainder, ""));
                    let Some(day) = Weekday::parse_abbrev(token) else {
                        break;
                    };
                    mask.insert(day);
                    remainder = tail.trim_start();
                }
                if mask.is_empty() {
                    mask = rule.start().day_of_week().mask();
                }
                rule.set_recur_on_days(mask);
            }
            "MP" => {
                // an ordinal like "1-" counts from the end of the month
                let bytes = remainder.as_bytes();
                let from_end = bytes.first().is_some_and(u8::is_ascii_digit)
                    && bytes.get(1) == Some(&b'-');
                rule.set_recur_type(if from_end {
                    RecurrenceType::MonthlyLastWeekday
                } else {
                    RecurrenceType::MonthlyWeekday
                });
            }
            "MD" => rule.set_recur_type(RecurrenceType::MonthlyDate),
            "YM" => rule.set_recur_type(RecurrenceType::YearlyDate),
            "YD" => rule.set_recur_type(RecurrenceType::YearlyDay),
            other => debug!(frequency = other, "unknown frequency, ignoring"),
        }

        // arguments we do not need are implied by the start date; skip ahead
        // to the terminator
        while let Some(first) = remainder.chars().next() {
            if terminator_at(remainder) {
                break;
            }
            remainder = &remainder[first.len_utf8()..];
        }

        if let Some(count_text) = remainder.strip_prefix('#') {
            let digits = count_text.bytes().take_while(u8::is_ascii_digit).count();
            rule.set_count(count_text[..digits].parse().unwrap_or(0));
        } else if !remainder.is_empty() {
            let end = parse_end_stamp(remainder, rule.start().timezone());
            rule.set_end_date(end);
        }
        rule
    }

    /// Serializes to a vCalendar 1.0 RRULE value. Non-recurring and
    /// yearly-by-weekday rules (which vCalendar 1.0 cannot express) yield an
    /// empty string. Unbounded rules carry the `#0` terminator.
    #[must_use]
    pub fn to_rrule10(&self) -> String {
        let start = self.start();
        let interval = self.interval();
        let mut out = match self.recur_type() {
            RecurrenceType::Daily => format!("D{interval}"),
            RecurrenceType::Weekly => {
                let mut out = format!("W{interval}");
                for day in self.recur_on_days().iter() {
                    out.push(' ');
                    out.push_str(day.abbrev());
                }
                out
            }
            RecurrenceType::MonthlyDate => format!("MD{interval} {}", start.day()),
            RecurrenceType::MonthlyWeekday => format!(
                "MP{interval} {}+ {}",
                start.week_of_month(),
                start.day_of_week().abbrev()
            ),
            RecurrenceType::MonthlyLastWeekday => {
                format!("MP{interval} 1- {}", start.day_of_week().abbrev())
            }
            RecurrenceType::YearlyDate => format!("YM{interval} {}", start.month()),
            RecurrenceType::YearlyDay => format!("YD{interval} {}", start.day_of_year()),
            RecurrenceType::None | RecurrenceType::YearlyWeekday => return String::new(),
        };
        if let Some(end) = self.end_date() {
            out.push(' ');
            out.push_str(&super::stamp(end));
        } else {
            out.push_str(&format!(" #{}", self.count().unwrap_or(0)));
        }
        out
    }
}

/// Whether the remainder starts with a terminator: `#` followed by digits,
/// or an eight-digit date optionally followed by `T` and a six-digit time.
fn terminator_at(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.first() == Some(&b'#') {
        let digits = bytes[1..].iter().take_while(|b| b.is_ascii_digit()).count();
        digits > 0 && matches!(bytes.get(1 + digits), None | Some(&b' '))
    } else {
        bytes.len() >= 8
            && bytes[..8].iter().all(u8::is_ascii_digit)
            && match bytes.get(8) {
                None | Some(&b' ') => true,
                Some(&b'T') => bytes.len() >= 15 && bytes[9..15].iter().all(u8::is_ascii_digit),
                _ => false,
            }
    }
}

/// Parses `YYYYMMDD` with an optional `THHMMSS` and trailing `Z`. A `Z`
/// labels the date as UTC; otherwise it carries the start's timezone label.
fn parse_end_stamp(s: &str, start_timezone: Option<&str>) -> Option<CalendarDate> {
    let year: i32 = s.get(0..4)?.parse().ok()?;
    let month: i64 = s.get(4..6)?.parse().ok()?;
    let day: i64 = s.get(6..8)?.parse().ok()?;
    let (hour, minute, second, tail) = if s.as_bytes().get(8) == Some(&b'T') {
        (
            s.get(9..11)?.parse().ok()?,
            s.get(11..13)?.parse().ok()?,
            s.get(13..15)?.parse().ok()?,
            s.get(15..)?,
        )
    } else {
        (0, 0, 0, s.get(8..)?)
    };
    let timezone = if tail.starts_with('Z') {
        Some("UTC")
    } else {
        start_timezone
    };
    CalendarDate::from_parts(year, month, day, hour, minute, second, timezone)
}
