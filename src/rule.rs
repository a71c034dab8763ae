//! Recurrence rule data model.
//!
//! A [`RecurrenceRule`] bundles the recurrence family, the interval, the
//! weekday mask, the end condition, and the exception and completion sets
//! around a mandatory start date. The integer codes of [`RecurrenceType`] and
//! the weekday mask bits are persisted verbatim in rule hashes and must not
//! change.

use crate::date::CalendarDate;
use crate::weekday::{Weekday, WeekdayMask};

/// Recurrence family. The discriminants are the serialized type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecurrenceType {
    /// No recurrence; the event occurs once.
    #[default]
    None = 0,
    Daily = 1,
    Weekly = 2,
    /// Monthly on the same calendar day as the start.
    MonthlyDate = 3,
    /// Monthly on the same nth weekday as the start.
    MonthlyWeekday = 4,
    /// Yearly on the same month and day as the start.
    YearlyDate = 5,
    /// Yearly on the same day of the year as the start.
    YearlyDay = 6,
    /// Yearly on the same nth weekday and month as the start.
    YearlyWeekday = 7,
    /// Monthly on the same weekday counted from the end of the month.
    MonthlyLastWeekday = 8,
}

impl RecurrenceType {
    /// The serialized type code.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Decodes a serialized type code.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::None),
            1 => Some(Self::Daily),
            2 => Some(Self::Weekly),
            3 => Some(Self::MonthlyDate),
            4 => Some(Self::MonthlyWeekday),
            5 => Some(Self::YearlyDate),
            6 => Some(Self::YearlyDay),
            7 => Some(Self::YearlyWeekday),
            8 => Some(Self::MonthlyLastWeekday),
            _ => None,
        }
    }
}

/// How a rule stops recurring. `Count` and `Date` are mutually exclusive by
/// construction; setting one clears the other.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EndCondition {
    /// Recurs forever.
    #[default]
    None,
    /// Stops after this many occurrences, the start included.
    Count(u32),
    /// No occurrence may fall after this date-time.
    Date(CalendarDate),
}

/// A recurrence rule anchored at a start date.
///
/// The start date is always the first occurrence when queried at or before
/// itself, whether or not it matches the rule's own pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRule {
    start: CalendarDate,
    recur_type: RecurrenceType,
    interval: u32,
    day_mask: WeekdayMask,
    end: EndCondition,
    exceptions: Vec<String>,
    completions: Vec<String>,
}

impl RecurrenceRule {
    /// Creates a non-recurring rule anchored at `start`.
    #[must_use]
    pub fn new(start: CalendarDate) -> Self {
        Self {
            start,
            recur_type: RecurrenceType::None,
            interval: 1,
            day_mask: WeekdayMask::EMPTY,
            end: EndCondition::None,
            exceptions: Vec::new(),
            completions: Vec::new(),
        }
    }

    /// Clears everything except the start date.
    pub fn reset(&mut self) {
        self.recur_type = RecurrenceType::None;
        self.interval = 1;
        self.day_mask = WeekdayMask::EMPTY;
        self.end = EndCondition::None;
        self.exceptions.clear();
        self.completions.clear();
    }

    #[must_use]
    pub fn start(&self) -> &CalendarDate {
        &self.start
    }

    pub fn set_start(&mut self, start: CalendarDate) {
        self.start = start;
    }

    #[must_use]
    pub fn recur_type(&self) -> RecurrenceType {
        self.recur_type
    }

    #[must_use]
    pub fn has_recur_type(&self, recur_type: RecurrenceType) -> bool {
        self.recur_type == recur_type
    }

    /// Whether the rule recurs at all.
    #[must_use]
    pub fn recurs(&self) -> bool {
        self.recur_type != RecurrenceType::None
    }

    pub fn set_recur_type(&mut self, recur_type: RecurrenceType) {
        self.recur_type = recur_type;
    }

    #[must_use]
    pub fn interval(&self) -> u32 {
        self.interval
    }

    /// Sets the repetition interval. Zero is ignored; an interval below one
    /// can only enter through deserialization and disables iteration there.
    pub fn set_interval(&mut self, interval: u32) {
        if interval > 0 {
            self.interval = interval;
        }
    }

    /// Raw interval assignment for deserialized rules, bypassing the zero
    /// guard.
    pub(crate) fn set_interval_raw(&mut self, interval: u32) {
        self.interval = interval;
    }

    /// Weekday mask for weekly rules.
    #[must_use]
    pub fn recur_on_days(&self) -> WeekdayMask {
        self.day_mask
    }

    #[must_use]
    pub fn recurs_on(&self, day: Weekday) -> bool {
        self.day_mask.contains(day)
    }

    pub fn set_recur_on_days(&mut self, mask: WeekdayMask) {
        self.day_mask = mask;
    }

    #[must_use]
    pub fn end_condition(&self) -> &EndCondition {
        &self.end
    }

    /// The occurrence count limit, if any.
    #[must_use]
    pub fn count(&self) -> Option<u32> {
        match self.end {
            EndCondition::Count(n) => Some(n),
            _ => None,
        }
    }

    #[must_use]
    pub fn has_count(&self) -> bool {
        matches!(self.end, EndCondition::Count(_))
    }

    /// Sets a count limit, replacing any end date. A zero count removes an
    /// existing count limit and leaves an end date untouched.
    pub fn set_count(&mut self, count: u32) {
        if count > 0 {
            self.end = EndCondition::Count(count);
        } else if matches!(self.end, EndCondition::Count(_)) {
            self.end = EndCondition::None;
        }
    }

    /// The end date, if any.
    #[must_use]
    pub fn end_date(&self) -> Option<&CalendarDate> {
        match &self.end {
            EndCondition::Date(d) => Some(d),
            _ => None,
        }
    }

    #[must_use]
    pub fn has_end_date(&self) -> bool {
        matches!(self.end, EndCondition::Date(_))
    }

    /// Sets an end date, replacing any count limit. `None` removes an
    /// existing end date and leaves a count limit untouched.
    pub fn set_end_date(&mut self, end: Option<CalendarDate>) {
        match end {
            Some(d) => self.end = EndCondition::Date(d),
            None => {
                if matches!(self.end, EndCondition::Date(_)) {
                    self.end = EndCondition::None;
                }
            }
        }
    }

    /// Marks a calendar day as deleted from the series.
    pub fn add_exception(&mut self, year: i32, month: u32, day: u32) {
        let key = date_key(year, month, day);
        if !self.exceptions.contains(&key) {
            self.exceptions.push(key);
        }
    }

    pub fn delete_exception(&mut self, year: i32, month: u32, day: u32) {
        let key = date_key(year, month, day);
        self.exceptions.retain(|k| *k != key);
    }

    #[must_use]
    pub fn has_exception(&self, year: i32, month: u32, day: u32) -> bool {
        self.exceptions.contains(&date_key(year, month, day))
    }

    /// Exception days as canonical `YYYYMMDD` keys, in insertion order.
    #[must_use]
    pub fn exceptions(&self) -> &[String] {
        &self.exceptions
    }

    /// Marks a calendar day's occurrence as completed.
    pub fn add_completion(&mut self, year: i32, month: u32, day: u32) {
        let key = date_key(year, month, day);
        if !self.completions.contains(&key) {
            self.completions.push(key);
        }
    }

    pub fn delete_completion(&mut self, year: i32, month: u32, day: u32) {
        let key = date_key(year, month, day);
        self.completions.retain(|k| *k != key);
    }

    #[must_use]
    pub fn has_completion(&self, year: i32, month: u32, day: u32) -> bool {
        self.completions.contains(&date_key(year, month, day))
    }

    /// Completed days as canonical `YYYYMMDD` keys, in insertion order.
    #[must_use]
    pub fn completions(&self) -> &[String] {
        &self.completions
    }

    /// Adopts pre-built key sets from deserialization, dropping duplicates.
    pub(crate) fn set_filter_sets(&mut self, exceptions: Vec<String>, completions: Vec<String>) {
        self.exceptions = dedup_keys(exceptions);
        self.completions = dedup_keys(completions);
    }

    /// Whether two rules describe the same recurrence pattern, ignoring
    /// exceptions and completions.
    #[must_use]
    pub fn same_rule(&self, other: &Self) -> bool {
        self.start == other.start
            && self.recur_type == other.recur_type
            && self.interval == other.interval
            && self.day_mask == other.day_mask
            && self.end == other.end
    }
}

fn date_key(year: i32, month: u32, day: u32) -> String {
    format!("{year:04}{month:02}{day:02}")
}

fn dedup_keys(keys: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(keys.len());
    for key in keys {
        if !out.contains(&key) {
            out.push(key);
        }
    }
    out
}
