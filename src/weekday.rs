//! Weekday values and weekday bitmasks.
//!
//! The mask bit values are part of the serialized format (vCalendar `data`
//! field, rule hashes) and must stay exactly Sunday=1 through Saturday=64.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Day of the week, Sunday-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Weekday {
    Sunday = 0,
    Monday = 1,
    Tuesday = 2,
    Wednesday = 3,
    Thursday = 4,
    Friday = 5,
    Saturday = 6,
}

impl Weekday {
    /// All weekdays in Sunday-first order, matching the mask bit order.
    pub const ALL: [Self; 7] = [
        Self::Sunday,
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
    ];

    /// Zero-based index with Sunday = 0.
    #[must_use]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// The single-bit mask for this weekday.
    #[must_use]
    pub const fn mask(self) -> WeekdayMask {
        WeekdayMask(1 << self.index())
    }

    /// Two-letter day code used by vCalendar 1.0 and iCalendar BYDAY.
    #[must_use]
    pub const fn abbrev(self) -> &'static str {
        match self {
            Self::Sunday => "SU",
            Self::Monday => "MO",
            Self::Tuesday => "TU",
            Self::Wednesday => "WE",
            Self::Thursday => "TH",
            Self::Friday => "FR",
            Self::Saturday => "SA",
        }
    }

    /// Parses a two-letter day code.
    #[must_use]
    pub fn parse_abbrev(s: &str) -> Option<Self> {
        match s {
            "SU" => Some(Self::Sunday),
            "MO" => Some(Self::Monday),
            "TU" => Some(Self::Tuesday),
            "WE" => Some(Self::Wednesday),
            "TH" => Some(Self::Thursday),
            "FR" => Some(Self::Friday),
            "SA" => Some(Self::Saturday),
            _ => None,
        }
    }

    /// Lowercase full name as used in Kolab day lists.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sunday => "sunday",
            Self::Monday => "monday",
            Self::Tuesday => "tuesday",
            Self::Wednesday => "wednesday",
            Self::Thursday => "thursday",
            Self::Friday => "friday",
            Self::Saturday => "saturday",
        }
    }

    /// Parses a lowercase full day name.
    #[must_use]
    pub fn parse_name(s: &str) -> Option<Self> {
        match s {
            "sunday" => Some(Self::Sunday),
            "monday" => Some(Self::Monday),
            "tuesday" => Some(Self::Tuesday),
            "wednesday" => Some(Self::Wednesday),
            "thursday" => Some(Self::Thursday),
            "friday" => Some(Self::Friday),
            "saturday" => Some(Self::Saturday),
            _ => None,
        }
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(value: chrono::Weekday) -> Self {
        match value {
            chrono::Weekday::Sun => Self::Sunday,
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbrev())
    }
}

/// Set of weekdays as a 7-bit mask.
///
/// Bit values: Sunday=1, Monday=2, Tuesday=4, Wednesday=8, Thursday=16,
/// Friday=32, Saturday=64.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WeekdayMask(u8);

impl WeekdayMask {
    pub const EMPTY: Self = Self(0);
    pub const SUNDAY: Self = Self(1);
    pub const MONDAY: Self = Self(2);
    pub const TUESDAY: Self = Self(4);
    pub const WEDNESDAY: Self = Self(8);
    pub const THURSDAY: Self = Self(16);
    pub const FRIDAY: Self = Self(32);
    pub const SATURDAY: Self = Self(64);
    pub const ALL: Self = Self(0x7f);

    /// Builds a mask from raw bits; bits outside the 7 weekday bits are
    /// dropped.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0x7f)
    }

    /// Raw bit value, as persisted in rule hashes.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of weekdays in the set.
    #[must_use]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    #[must_use]
    pub const fn contains(self, day: Weekday) -> bool {
        self.0 & day.mask().0 != 0
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= day.mask().0;
    }

    /// Iterates the set weekdays in Sunday-first order.
    pub fn iter(self) -> impl Iterator<Item = Weekday> {
        Weekday::ALL.into_iter().filter(move |d| self.contains(*d))
    }
}

impl BitOr for WeekdayMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for WeekdayMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitOr<Weekday> for WeekdayMask {
    type Output = Self;

    fn bitor(self, rhs: Weekday) -> Self {
        Self(self.0 | rhs.mask().0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_bit_values() {
        assert_eq!(Weekday::Sunday.mask().bits(), 1);
        assert_eq!(Weekday::Monday.mask().bits(), 2);
        assert_eq!(Weekday::Tuesday.mask().bits(), 4);
        assert_eq!(Weekday::Wednesday.mask().bits(), 8);
        assert_eq!(Weekday::Thursday.mask().bits(), 16);
        assert_eq!(Weekday::Friday.mask().bits(), 32);
        assert_eq!(Weekday::Saturday.mask().bits(), 64);
        assert_eq!(WeekdayMask::ALL.bits(), 127);
    }

    #[test]
    fn from_bits_drops_high_bit() {
        assert_eq!(WeekdayMask::from_bits(0xff), WeekdayMask::ALL);
    }

    #[test]
    fn abbrev_round_trip() {
        for day in Weekday::ALL {
            assert_eq!(Weekday::parse_abbrev(day.abbrev()), Some(day));
        }
        assert_eq!(Weekday::parse_abbrev("XX"), None);
    }

    #[test]
    fn name_round_trip() {
        for day in Weekday::ALL {
            assert_eq!(Weekday::parse_name(day.name()), Some(day));
        }
        assert_eq!(Weekday::parse_name("Sunday"), None);
    }

    #[test]
    fn iter_is_sunday_first() {
        let mask = WeekdayMask::SATURDAY | WeekdayMask::MONDAY | WeekdayMask::SUNDAY;
        let days: Vec<_> = mask.iter().collect();
        assert_eq!(
            days,
            vec![Weekday::Sunday, Weekday::Monday, Weekday::Saturday]
        );
        assert_eq!(mask.count(), 3);
    }

    #[test]
    fn contains_and_insert() {
        let mut mask = WeekdayMask::EMPTY;
        assert!(mask.is_empty());
        mask.insert(Weekday::Thursday);
        assert!(mask.contains(Weekday::Thursday));
        assert!(!mask.contains(Weekday::Friday));
    }
}
