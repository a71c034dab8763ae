//! Structured rule hashes and the compact JSON projection.
//!
//! [`RuleHash`] is the storage-facing form: every rule field flattened to
//! plain values, dates as `"YYYY-MM-DD HH:MM:SS"` strings with an optional
//! `/timezone` suffix, the weekday mask as its raw bits, and the exception
//! and completion sets as `YYYYMMDD` keys. [`JsonSummary`] is the
//! client-transport form with single-letter keys and empty fields omitted.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::date::CalendarDate;
use crate::error::RecurrenceError;
use crate::rule::{RecurrenceRule, RecurrenceType};
use crate::weekday::WeekdayMask;

/// Flat serialized form of a recurrence rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleHash {
    /// Start date, `"YYYY-MM-DD HH:MM:SS"` with optional `/timezone`.
    pub start: String,
    /// End date in the same form, if the rule ends on a date.
    pub end: Option<String>,
    /// Occurrence count, if the rule ends after a number of occurrences.
    pub count: Option<u32>,
    /// Recurrence type code.
    #[serde(rename = "type")]
    pub recur_type: u8,
    pub interval: u32,
    /// Weekday mask bits.
    pub data: u8,
    #[serde(default)]
    pub exceptions: Vec<String>,
    #[serde(default)]
    pub completions: Vec<String>,
}

/// Compact JSON projection for client transport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonSummary {
    /// Recurrence type code.
    pub t: u8,
    /// Interval.
    pub i: u32,
    /// End date, when bounded by date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,
    /// Count, when bounded by count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub c: Option<u32>,
    /// Weekday mask bits, when any are set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<u8>,
    /// Completion keys, when any exist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub co: Option<Vec<String>>,
    /// Exception keys, when any exist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ex: Option<Vec<String>>,
}

impl RecurrenceRule {
    /// Flattens the rule into its storage hash.
    #[must_use]
    pub fn to_hash(&self) -> RuleHash {
        RuleHash {
            start: stamp(self.start()),
            end: self.end_date().map(stamp),
            count: self.count(),
            recur_type: self.recur_type().code(),
            interval: self.interval(),
            data: self.recur_on_days().bits(),
            exceptions: self.exceptions().to_vec(),
            completions: self.completions().to_vec(),
        }
    }

    /// Rebuilds a rule from its storage hash.
    ///
    /// Recoverable oddities are absorbed: an unknown type code becomes
    /// non-recurring, an unparseable end date drops the bound, a zero
    /// interval is kept and disables iteration, and duplicate filter keys
    /// collapse. Only a missing or unparseable start date is an error.
    ///
    /// ## Errors
    ///
    /// Returns [`RecurrenceError::InvalidStart`] when the start date cannot
    /// be parsed.
    #[tracing::instrument(level = "debug", skip(hash), fields(start = %hash.start))]
    pub fn from_hash(hash: &RuleHash) -> Result<Self, RecurrenceError> {
        let start = CalendarDate::parse(&hash.start)
            .ok_or_else(|| RecurrenceError::InvalidStart(hash.start.clone()))?;
        let mut rule = Self::new(start);

        match RecurrenceType::from_code(hash.recur_type) {
            Some(recur_type) => rule.set_recur_type(recur_type),
            None => debug!(code = hash.recur_type, "unknown type code, treating as non-recurring"),
        }
        rule.set_interval_raw(hash.interval);
        rule.set_recur_on_days(WeekdayMask::from_bits(hash.data));

        if let Some(end) = hash.end.as_deref() {
            match CalendarDate::parse(end) {
                Some(date) => rule.set_end_date(Some(date)),
                None => debug!(end, "unparseable end date, dropping the bound"),
            }
        }
        // A hash carrying both bounds is ambiguous; the count wins, as it
        // does during iteration.
        if let Some(count) = hash.count {
            rule.set_count(count);
        }

        rule.set_filter_sets(hash.exceptions.clone(), hash.completions.clone());
        Ok(rule)
    }

    /// Projects the rule into the compact JSON transport form.
    #[must_use]
    pub fn to_json(&self) -> JsonSummary {
        let mask = self.recur_on_days();
        JsonSummary {
            t: self.recur_type().code(),
            i: self.interval(),
            e: self.end_date().map(|d| d.format("%Y-%m-%d %H:%M:%S")),
            c: self.count(),
            d: (!mask.is_empty()).then_some(mask.bits()),
            co: non_empty(self.completions()),
            ex: non_empty(self.exceptions()),
        }
    }
}

fn stamp(date: &CalendarDate) -> String {
    let mut out = date.format("%Y-%m-%d %H:%M:%S");
    if let Some(tz) = date.timezone() {
        out.push('/');
        out.push_str(tz);
    }
    out
}

fn non_empty(keys: &[String]) -> Option<Vec<String>> {
    (!keys.is_empty()).then(|| keys.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rule() -> RecurrenceRule {
        let start = CalendarDate::new(2007, 3, 1, 10, 0, 0)
            .unwrap()
            .with_timezone("Europe/Berlin");
        let mut r = RecurrenceRule::new(start);
        r.set_recur_type(RecurrenceType::Weekly);
        r.set_interval(2);
        r.set_recur_on_days(WeekdayMask::THURSDAY);
        r.set_end_date(Some(
            CalendarDate::new(2007, 3, 29, 10, 0, 0)
                .unwrap()
                .with_timezone("Europe/Berlin"),
        ));
        r.add_exception(2007, 3, 15);
        r.add_completion(2007, 3, 1);
        r
    }

    #[test]
    fn hash_round_trip() {
        let r = sample_rule();
        let hash = r.to_hash();
        assert_eq!(hash.start, "2007-03-01 10:00:00/Europe/Berlin");
        assert_eq!(hash.end.as_deref(), Some("2007-03-29 10:00:00/Europe/Berlin"));
        assert_eq!(hash.recur_type, 2);
        assert_eq!(hash.data, 16);

        let back = RecurrenceRule::from_hash(&hash).unwrap();
        assert!(r.same_rule(&back));
        assert!(back.has_exception(2007, 3, 15));
        assert!(back.has_completion(2007, 3, 1));
        assert_eq!(back.start().timezone(), Some("Europe/Berlin"));
    }

    #[test]
    fn unparseable_start_is_an_error() {
        let mut hash = sample_rule().to_hash();
        hash.start = "not a date".to_owned();
        assert!(matches!(
            RecurrenceRule::from_hash(&hash),
            Err(RecurrenceError::InvalidStart(_))
        ));
    }

    #[test]
    fn recoverable_oddities_are_absorbed() {
        let mut hash = sample_rule().to_hash();
        hash.recur_type = 99;
        hash.end = Some("bogus".to_owned());
        hash.interval = 0;
        hash.exceptions = vec!["20070315".to_owned(), "20070315".to_owned()];

        let r = RecurrenceRule::from_hash(&hash).unwrap();
        assert!(!r.recurs());
        assert!(r.end_date().is_none());
        assert_eq!(r.interval(), 0);
        assert_eq!(r.exceptions().len(), 1);
    }

    #[test]
    fn count_wins_when_hash_carries_both_bounds() {
        let mut hash = sample_rule().to_hash();
        hash.count = Some(4);
        let r = RecurrenceRule::from_hash(&hash).unwrap();
        assert_eq!(r.count(), Some(4));
        assert!(r.end_date().is_none());
    }

    #[test]
    fn json_summary_omits_empty_fields() {
        let r = sample_rule();
        let json = serde_json::to_value(r.to_json()).unwrap();
        assert_eq!(json["t"], 2);
        assert_eq!(json["i"], 2);
        assert_eq!(json["e"], "2007-03-29 10:00:00");
        assert_eq!(json["d"], 16);
        assert_eq!(json["ex"][0], "20070315");
        assert!(json.get("c").is_none());

        let mut bare = RecurrenceRule::new(CalendarDate::date(2024, 1, 1).unwrap());
        bare.set_recur_type(RecurrenceType::Daily);
        let json = serde_json::to_value(bare.to_json()).unwrap();
        assert_eq!(json["t"], 1);
        assert!(json.get("d").is_none());
        assert!(json.get("e").is_none());
        assert!(json.get("ex").is_none());
    }

    #[test]
    fn hash_serde_shape() {
        let json = serde_json::to_value(sample_rule().to_hash()).unwrap();
        assert_eq!(json["type"], 2);
        assert_eq!(json["interval"], 2);
        assert!(json["count"].is_null());
        assert_eq!(json["exceptions"][0], "20070315");
    }
}
