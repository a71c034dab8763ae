//! Recurrence-rule engine.
//!
//! Models repeating calendar events: a [`RecurrenceRule`] pairs a start date
//! with one of eight recurrence families (daily, weekly, monthly by date or
//! weekday, yearly by date, day of year, or weekday), an interval, an
//! optional end bound (count or date), and per-day exception and completion
//! sets. Occurrences are computed on demand with
//! [`RecurrenceRule::next_recurrence`]; no series is ever materialized.
//!
//! Rules travel through four interchange forms: vCalendar 1.0 RRULE values,
//! iCalendar 2.0 RRULE values, Kolab recurrence hashes, and a flat storage
//! hash with a compact JSON projection. All parsers are permissive; text
//! they cannot understand yields a non-recurring rule.
//!
//! Timezone labels are carried opaquely. Comparisons and arithmetic use
//! wall-clock values only; offset math is out of scope.

pub mod date;
pub mod describe;
pub mod error;
pub mod format;
mod iter;
pub mod rule;
pub mod weekday;

pub use date::CalendarDate;
pub use describe::DescribeStrings;
pub use error::RecurrenceError;
pub use format::hash::{JsonSummary, RuleHash};
pub use format::kolab::{KolabRange, KolabRecurrence};
pub use rule::{EndCondition, RecurrenceRule, RecurrenceType};
pub use weekday::{Weekday, WeekdayMask};
