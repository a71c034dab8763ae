//! Crate error type.
//!
//! Almost everything here degrades gracefully instead of failing: malformed
//! rule text parses to a non-recurring rule and exhausted iterators return
//! `None`. The one structural failure is a rule hash whose start date cannot
//! be parsed, since a rule cannot exist without its anchor.

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RecurrenceError {
    /// The rule hash carried an unparseable start date.
    #[error("unparseable start date in rule hash: {0:?}")]
    InvalidStart(String),
}
