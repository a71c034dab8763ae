//! Kolab XML recurrence hashes.
//!
//! [`KolabRecurrence`] mirrors the wire fields of the Kolab format:
//! `cycle`, `type`, `interval`, `day` (lowercase weekday names),
//! `daynumber`, `month` (lowercase month name), `range-type`/`range`,
//! `exclusion`, and `complete`. A negative `daynumber` on a monthly weekday
//! cycle means "counted from the end of the month"; the standard defines no
//! such encoding, but it is accepted and produced here as an extension.
//!
//! Importing may derive a corrected start date from the hash (month,
//! day number, or nth-weekday alignment). The rule is built completely and
//! returned only on success; a structurally unusable hash yields `None`
//! without partial state.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::date::CalendarDate;
use crate::rule::{RecurrenceRule, RecurrenceType};
use crate::weekday::{Weekday, WeekdayMask};

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

fn month_number(name: &str) -> Option<u32> {
    MONTH_NAMES
        .iter()
        .position(|m| *m == name)
        .and_then(|i| u32::try_from(i + 1).ok())
}

/// Wire-shaped Kolab recurrence hash.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KolabRecurrence {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daynumber: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    #[serde(rename = "range-type", default, skip_serializing_if = "Option::is_none")]
    pub range_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<KolabRange>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclusion: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub complete: Vec<String>,
}

/// Range value: an occurrence count for `range-type: number`, a
/// `YYYY-MM-DD` date for `range-type: date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KolabRange {
    Count(u32),
    Date(String),
}

impl RecurrenceRule {
    /// Builds a rule from a Kolab recurrence hash, anchored at `start`.
    ///
    /// The hash may move the start within its month or year (day number,
    /// month, nth-weekday alignment). Returns `None` when the hash lacks
    /// the fields its cycle requires.
    #[must_use]
    #[expect(clippy::too_many_lines)]
    #[tracing::instrument(level = "debug", skip(start))]
    pub fn from_kolab(start: CalendarDate, hash: &KolabRecurrence) -> Option<Self> {
        let cycle = hash.cycle.as_deref()?;
        let interval = hash.interval?;
        let mut rule = Self::new(start);
        rule.set_interval(interval);

        let mut parse_days = false;
        let mut set_day_mask = false;
        let mut update_month = false;
        let mut update_daynumber = false;
        let mut update_weekday = false;
        let mut nth_weekday: i32 = 1;
        let mut daynumber = hash.daynumber;

        match cycle {
            "daily" => rule.set_recur_type(RecurrenceType::Daily),
            "weekly" => {
                rule.set_recur_type(RecurrenceType::Weekly);
                parse_days = true;
                set_day_mask = true;
            }
            "monthly" => {
                let number = hash.daynumber?;
                match hash.kind.as_deref() {
                    Some("daynumber") => {
                        rule.set_recur_type(RecurrenceType::MonthlyDate);
                        update_daynumber = true;
                    }
                    Some("weekday") => {
                        rule.set_recur_type(if number < 0 {
                            RecurrenceType::MonthlyLastWeekday
                        } else {
                            RecurrenceType::MonthlyWeekday
                        });
                        nth_weekday = number;
                        daynumber = Some(1);
                        parse_days = true;
                        update_daynumber = true;
                        update_weekday = true;
                    }
                    other => debug!(kind = ?other, "unknown monthly type, rule stays non-recurring"),
                }
            }
            "yearly" => match hash.kind.as_deref()? {
                "monthday" => {
                    daynumber = Some(hash.daynumber?);
                    rule.set_recur_type(RecurrenceType::YearlyDate);
                    update_month = true;
                    update_daynumber = true;
                }
                "yearday" => {
                    daynumber = Some(hash.daynumber?);
                    rule.set_recur_type(RecurrenceType::YearlyDay);
                    update_daynumber = true;
                }
                "weekday" => {
                    nth_weekday = hash.daynumber?;
                    daynumber = Some(1);
                    rule.set_recur_type(RecurrenceType::YearlyWeekday);
                    parse_days = true;
                    update_month = true;
                    update_daynumber = true;
                    update_weekday = true;
                }
                other => {
                    debug!(kind = other, "unknown yearly type");
                    return None;
                }
            },
            other => {
                debug!(cycle = other, "unknown cycle");
                return None;
            }
        }

        match hash.range_type.as_deref() {
            Some("number") => {
                if let Some(KolabRange::Count(n)) = hash.range {
                    rule.set_count(n);
                }
            }
            Some("date") => {
                if let Some(KolabRange::Date(value)) = &hash.range {
                    if let Some((y, m, d)) = parse_day_value(value) {
                        // the range date bounds inclusively
                        rule.set_end_date(CalendarDate::new(y, m, d, 23, 59, 59));
                    }
                }
            }
            _ => {}
        }

        let mut last_found_day: Option<Weekday> = None;
        if parse_days {
            let names = hash.day.as_deref()?;
            let mut mask = WeekdayMask::EMPTY;
            for name in names {
                if let Some(day) = Weekday::parse_name(name) {
                    mask.insert(day);
                    last_found_day = Some(day);
                }
            }
            if set_day_mask {
                rule.set_recur_on_days(mask);
            }
        }

        // Derive the corrected start date the hash implies.
        let base = rule.start().clone();
        let month = if update_month {
            match hash.month.as_deref() {
                Some(name) => month_number(name)?,
                None => base.month(),
            }
        } else if rule.has_recur_type(RecurrenceType::YearlyDay) {
            1
        } else {
            base.month()
        };
        // every path that sets update_daynumber also supplies the number
        let day = if update_daynumber {
            i64::from(daynumber?)
        } else {
            i64::from(base.day())
        };
        let mut new_start = CalendarDate::from_parts(
            base.year(),
            i64::from(month),
            day,
            base.hour(),
            base.minute(),
            base.second(),
            base.timezone(),
        )?;
        if update_weekday {
            let weekday = last_found_day?;
            new_start =
                CalendarDate::nth_weekday_of_month(new_start.year(), new_start.month(), weekday, nth_weekday)?
                    .with_time_of(&base);
        }
        rule.set_start(new_start);

        for entry in &hash.exclusion {
            if let Some((y, m, d)) = parse_day_value(entry) {
                rule.add_exception(y, m, d);
            }
        }
        for entry in &hash.complete {
            if let Some((y, m, d)) = parse_day_value(entry) {
                rule.add_completion(y, m, d);
            }
        }
        Some(rule)
    }

    /// Serializes to a Kolab recurrence hash. Non-recurring rules produce an
    /// empty hash (no cycle).
    #[must_use]
    pub fn to_kolab(&self) -> KolabRecurrence {
        let start = self.start();
        let mut hash = KolabRecurrence::default();
        if !self.recurs() {
            return hash;
        }
        hash.interval = Some(self.interval());
        match self.recur_type() {
            RecurrenceType::None => unreachable!("handled above"),
            RecurrenceType::Daily => hash.cycle = Some("daily".to_owned()),
            RecurrenceType::Weekly => {
                hash.cycle = Some("weekly".to_owned());
                hash.day = Some(day_names(self.recur_on_days()));
            }
            RecurrenceType::MonthlyDate => {
                hash.cycle = Some("monthly".to_owned());
                hash.kind = Some("daynumber".to_owned());
                hash.daynumber = i32::try_from(start.day()).ok();
            }
            RecurrenceType::MonthlyWeekday => {
                hash.cycle = Some("monthly".to_owned());
                hash.kind = Some("weekday".to_owned());
                hash.daynumber = i32::try_from(start.week_of_month()).ok();
                hash.day = Some(vec![start.day_of_week().name().to_owned()]);
            }
            RecurrenceType::MonthlyLastWeekday => {
                hash.cycle = Some("monthly".to_owned());
                hash.kind = Some("weekday".to_owned());
                hash.daynumber = Some(-1);
                hash.day = Some(vec![start.day_of_week().name().to_owned()]);
            }
            RecurrenceType::YearlyDate => {
                hash.cycle = Some("yearly".to_owned());
                hash.kind = Some("monthday".to_owned());
                hash.daynumber = i32::try_from(start.day()).ok();
                hash.month = month_name(start.month());
            }
            RecurrenceType::YearlyDay => {
                hash.cycle = Some("yearly".to_owned());
                hash.kind = Some("yearday".to_owned());
                hash.daynumber = i32::try_from(start.day_of_year()).ok();
            }
            RecurrenceType::YearlyWeekday => {
                hash.cycle = Some("yearly".to_owned());
                hash.kind = Some("weekday".to_owned());
                hash.daynumber = i32::try_from(start.week_of_month()).ok();
                hash.day = Some(vec![start.day_of_week().name().to_owned()]);
                hash.month = month_name(start.month());
            }
        }

        if let Some(count) = self.count() {
            hash.range_type = Some("number".to_owned());
            hash.range = Some(KolabRange::Count(count));
        } else if let Some(end) = self.end_date() {
            hash.range_type = Some("date".to_owned());
            hash.range = Some(KolabRange::Date(end.format("%Y-%m-%d")));
        } else {
            hash.range_type = Some("none".to_owned());
        }

        hash.exclusion = self.exceptions().iter().map(|k| dash_key(k)).collect();
        hash.complete = self.completions().iter().map(|k| dash_key(k)).collect();
        hash
    }
}

fn day_names(mask: WeekdayMask) -> Vec<String> {
    mask.iter().map(|d| d.name().to_owned()).collect()
}

fn month_name(month: u32) -> Option<String> {
    usize::try_from(month)
        .ok()
        .and_then(|m| MONTH_NAMES.get(m.wrapping_sub(1)))
        .map(|&name| name.to_owned())
}

/// Parses a `YYYY-MM-DD` day value.
fn parse_day_value(value: &str) -> Option<(i32, u32, u32)> {
    let mut parts = value.trim().splitn(3, '-');
    let year = parts.next()?.parse().ok()?;
    let month = parts.next()?.parse().ok()?;
    let day = parts.next()?.parse().ok()?;
    Some((year, month, day))
}

/// `YYYYMMDD` key to `YYYY-MM-DD`.
fn dash_key(key: &str) -> String {
    if key.len() == 8 {
        format!("{}-{}-{}", &key[0..4], &key[4..6], &key[6..8])
    } else {
        key.to_owned()
    }
}
