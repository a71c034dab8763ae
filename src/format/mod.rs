//! Interchange formats for recurrence rules.
//!
//! Every adapter is a pure mapping: parsing builds a fresh rule anchored at
//! a caller-supplied start date and serializing never mutates the rule.
//! Parsers are permissive; text they cannot understand produces a
//! non-recurring rule rather than an error. The single exception is the
//! structured hash form, whose start date is mandatory.

use crate::date::CalendarDate;

pub mod hash;
pub mod ical;
pub mod kolab;
pub mod vcal;

/// `YYYYMMDDTHHMMSS` timestamp, with a `Z` suffix when the date carries the
/// `UTC` label. Labels are opaque, so no offset conversion happens here.
pub(crate) fn stamp(date: &CalendarDate) -> String {
    let mut out = format!(
        "{:04}{:02}{:02}T{:02}{:02}{:02}",
        date.year(),
        date.month(),
        date.day(),
        date.hour(),
        date.minute(),
        date.second()
    );
    if date.timezone() == Some("UTC") {
        out.push('Z');
    }
    out
}
