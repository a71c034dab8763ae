//! Occurrence iteration.
//!
//! [`RecurrenceRule::next_recurrence`] answers "what is the earliest
//! occurrence at or after this point in time" without materializing the
//! series: every family computes its candidate arithmetically and probes
//! forward only where the calendar forces it (invalid month days, missing
//! nth weekdays, non-leap years). The start date is always the first
//! occurrence when queried at or before itself, whether or not it matches
//! the pattern.

use std::cmp::Ordering;

use crate::date::{CalendarDate, is_leap_year};
use crate::rule::{EndCondition, RecurrenceRule, RecurrenceType};

impl RecurrenceRule {
    /// Returns the earliest occurrence at or after `after`, or `None` when
    /// the rule has no further occurrences.
    ///
    /// An interval below one (possible only through deserialization)
    /// disables iteration beyond the start date.
    #[must_use]
    pub fn next_recurrence(&self, after: &CalendarDate) -> Option<CalendarDate> {
        if *self.start() >= *after {
            return Some(self.start().clone());
        }
        if self.interval() == 0 {
            return None;
        }
        match self.recur_type() {
            RecurrenceType::None => None,
            RecurrenceType::Daily => self.next_daily(after),
            RecurrenceType::Weekly => self.next_weekly(after),
            RecurrenceType::MonthlyDate => self.next_monthly_date(after),
            RecurrenceType::MonthlyWeekday | RecurrenceType::MonthlyLastWeekday => {
                self.next_monthly_weekday(after)
            }
            RecurrenceType::YearlyDate => self.next_yearly_date(after),
            RecurrenceType::YearlyDay => self.next_yearly_day(after),
            RecurrenceType::YearlyWeekday => self.next_yearly_weekday(after),
        }
    }

    /// Returns the earliest occurrence at or after `after` that is neither
    /// an exception nor completed.
    #[must_use]
    pub fn next_active_recurrence(&self, after: &CalendarDate) -> Option<CalendarDate> {
        let mut next = self.next_recurrence(after)?;
        loop {
            if !self.filtered(&next) {
                return Some(next);
            }
            next = self.next_recurrence(&next.add_days(1))?;
        }
    }

    /// Whether any occurrence of the rule is still active. Rules without an
    /// end condition are active by definition; bounded rules are scanned.
    #[must_use]
    pub fn has_active_recurrence(&self) -> bool {
        if matches!(self.end_condition(), EndCondition::None) {
            return true;
        }
        let mut after = self.start().clone();
        while let Some(next) = self.next_recurrence(&after) {
            if !self.filtered(&next) {
                return true;
            }
            after = next.add_days(1);
        }
        false
    }

    fn filtered(&self, occurrence: &CalendarDate) -> bool {
        let (y, m, d) = (occurrence.year(), occurrence.month(), occurrence.day());
        self.has_exception(y, m, d) || self.has_completion(y, m, d)
    }

    fn past_end(&self, candidate: &CalendarDate) -> bool {
        self.end_date().is_some_and(|end| candidate > end)
    }

    fn next_daily(&self, after: &CalendarDate) -> Option<CalendarDate> {
        let interval = i64::from(self.interval());
        let diff = self.start().days_until(after);
        let mut steps = (diff + interval - 1).div_euclid(interval);
        let mut next = self.start().add_days(steps * interval);
        if next < *after {
            // same calendar day but the time of day has passed
            steps += 1;
            next = self.start().add_days(steps * interval);
        }
        if let Some(count) = self.count() {
            if steps >= i64::from(count) {
                return None;
            }
        }
        if self.past_end(&next) {
            return None;
        }
        Some(next)
    }

    fn next_weekly(&self, after: &CalendarDate) -> Option<CalendarDate> {
        let mask = self.recur_on_days();
        if mask.is_empty() {
            return None;
        }
        let start = self.start();
        let interval_days = i64::from(self.interval()) * 7;
        let start_week = start.iso_week_start().with_time_of(start);
        let mut after = after.clone();

        loop {
            let after_week = after.iso_week_start();
            let after_week_end = after_week.add_days(7);

            let diff = start_week.days_until(&after_week);
            let repeats = diff.div_euclid(interval_days);
            // `after` sits either inside an on-pattern week or in a gap;
            // in a gap, jump to the next on-pattern week
            let offset = if diff.rem_euclid(interval_days) < 7 {
                diff
            } else {
                interval_days * (repeats + 1)
            };

            let counting = self.has_count();
            let mut occurrences: i64 = 0;
            if counting {
                // the week leading up to the start contributes no
                // occurrences even where it matches the mask
                let mut probe = start_week.clone();
                while probe < *start {
                    if mask.contains(probe.day_of_week()) {
                        occurrences -= 1;
                    }
                    probe = probe.add_days(1);
                }
                if repeats > 0 {
                    occurrences += i64::from(mask.count()) * repeats;
                }
            }

            let mut next = start_week.add_days(offset);
            while next < after && next < after_week_end {
                if counting && mask.contains(next.day_of_week()) {
                    occurrences += 1;
                }
                next = next.add_days(1);
            }

            if let Some(count) = self.count() {
                if occurrences >= i64::from(count) {
                    return None;
                }
            }
            if self.past_end(&next) {
                return None;
            }
            if next >= after_week_end {
                after = after_week_end;
                continue;
            }
            while !mask.contains(next.day_of_week()) && next < after_week_end {
                next = next.add_days(1);
            }
            if self.past_end(&next) {
                return None;
            }
            if next >= after_week_end {
                after = after_week_end;
                continue;
            }
            return Some(next);
        }
    }

    fn next_monthly_date(&self, after: &CalendarDate) -> Option<CalendarDate> {
        let start = self.start();
        let interval = i64::from(self.interval());

        let mut after_months = months_from_year_zero(after.year(), after.month());
        if after.day() > start.day() {
            // this month's day has already passed
            after_months += 1;
        }
        let base = months_from_year_zero(start.year(), start.month());
        let mut offset = after_months - base;
        offset = (offset + interval - 1).div_euclid(interval) * interval;

        let mut index = offset.div_euclid(interval);
        loop {
            if let Some(count) = self.count() {
                if index >= i64::from(count) {
                    return None;
                }
                index += 1;
            }
            let months = base + offset;
            let year = i32::try_from(months.div_euclid(12)).ok()?;
            let month = u32::try_from(months.rem_euclid(12) + 1).ok()?;
            // normalized probe so an overflowing day compares as the
            // following month for the end check
            let probe = CalendarDate::from_parts(
                year,
                i64::from(month),
                i64::from(start.day()),
                start.hour(),
                start.minute(),
                start.second(),
                start.timezone(),
            )?;
            if let Some(end) = self.end_date() {
                if *end < probe {
                    return None;
                }
            }
            if start.day() <= CalendarDate::days_in_month(year, month)? {
                return Some(probe);
            }
            // a yearly interval revisits the same month forever; only a
            // February 29th start can ever become valid again
            if interval == 12 && (month != 2 || start.day() > 29) {
                return None;
            }
            offset += interval;
        }
    }

    fn next_monthly_weekday(&self, after: &CalendarDate) -> Option<CalendarDate> {
        let start = self.start();
        let interval = i64::from(self.interval());
        let nth = if self.has_recur_type(RecurrenceType::MonthlyLastWeekday) {
            -1
        } else {
            i32::try_from(start.week_of_month()).ok()?
        };
        let weekday = start.day_of_week();

        let base = months_from_year_zero(start.year(), start.month());
        let mut offset = months_from_year_zero(after.year(), after.month()) - base;
        offset = (offset + interval - 1).div_euclid(interval) * interval;

        let mut index = offset.div_euclid(interval);
        let mut months = base + offset - interval;
        loop {
            if let Some(count) = self.count() {
                if index >= i64::from(count) {
                    return None;
                }
                index += 1;
            }
            months += interval;
            let year = i32::try_from(months.div_euclid(12)).ok()?;
            let month = u32::try_from(months.rem_euclid(12) + 1).ok()?;
            let Some(candidate) = CalendarDate::nth_weekday_of_month(year, month, weekday, nth)
            else {
                // no such weekday in this month
                continue;
            };
            let candidate = candidate.with_time_of(start);
            if candidate < *after {
                continue;
            }
            if self.past_end(&candidate) {
                return None;
            }
            return Some(candidate);
        }
    }

    fn next_yearly_date(&self, after: &CalendarDate) -> Option<CalendarDate> {
        let start = self.start();
        let interval = i64::from(self.interval());

        let mut year = i64::from(after.year());
        if after.month() > start.month()
            || (after.month() == start.month() && after.day() > start.day())
        {
            year += 1;
        }
        let leap_day = start.month() == 2 && start.day() == 29;
        if leap_day {
            while !is_leap_year(i32::try_from(year).ok()?) {
                year += 1;
            }
        }
        let mut offset = year - i64::from(start.year());
        if offset > 0 {
            offset = (offset + interval - 1).div_euclid(interval) * interval;
        }
        if let Some(count) = self.count() {
            if offset.div_euclid(interval) >= i64::from(count) {
                return None;
            }
        }
        let mut target = i64::from(start.year()) + offset;
        if leap_day {
            // interval steps landing on non-leap years are skipped; the
            // 400-year Gregorian cycle bounds the search
            let mut guard = 0;
            while !is_leap_year(i32::try_from(target).ok()?) {
                target += interval;
                offset += interval;
                guard += 1;
                if guard > 400 {
                    return None;
                }
                if let Some(count) = self.count() {
                    if offset.div_euclid(interval) >= i64::from(count) {
                        return None;
                    }
                }
            }
        }
        let candidate = CalendarDate::from_parts(
            i32::try_from(target).ok()?,
            i64::from(start.month()),
            i64::from(start.day()),
            start.hour(),
            start.minute(),
            start.second(),
            start.timezone(),
        )?;
        if self.past_end(&candidate) {
            return None;
        }
        Some(candidate)
    }

    fn next_yearly_day(&self, after: &CalendarDate) -> Option<CalendarDate> {
        let start = self.start();
        let interval = i64::from(self.interval());
        let doy = i64::from(start.day_of_year());

        let years = i64::from(after.year()) - i64::from(start.year());
        if let Some(count) = self.count() {
            let last = (i64::from(count) - 1) * interval;
            if years > last || (years == last && i64::from(after.day_of_year()) > doy) {
                return None;
            }
        }
        let mut year = i64::from(start.year()) + years.div_euclid(interval) * interval;
        let mut candidate = year_day(year, doy, start)?;
        if candidate.cmp_date(after) == Ordering::Less {
            year += interval;
            candidate = year_day(year, doy, start)?;
        }
        if self.past_end(&candidate) {
            return None;
        }
        Some(candidate)
    }

    fn next_yearly_weekday(&self, after: &CalendarDate) -> Option<CalendarDate> {
        let start = self.start();
        let interval = i64::from(self.interval());
        let nth = i32::try_from(start.week_of_month()).ok()?;
        let weekday = start.day_of_week();

        let mut offset = i64::from(after.year()) - i64::from(start.year());
        offset = (offset + interval - 1).div_euclid(interval) * interval;

        let mut index = offset.div_euclid(interval);
        let mut year = i64::from(start.year()) + offset - interval;
        loop {
            if let Some(count) = self.count() {
                if index >= i64::from(count) {
                    return None;
                }
                index += 1;
            }
            year += interval;
            let Some(candidate) = CalendarDate::nth_weekday_of_month(
                i32::try_from(year).ok()?,
                start.month(),
                weekday,
                nth,
            ) else {
                // the nth weekday would spill into the following month
                continue;
            };
            let candidate = candidate.with_time_of(start);
            if candidate < *after {
                continue;
            }
            if self.past_end(&candidate) {
                return None;
            }
            return Some(candidate);
        }
    }
}

fn months_from_year_zero(year: i32, month: u32) -> i64 {
    i64::from(year) * 12 + i64::from(month) - 1
}

/// The `doy`-th day of `year`, normalized past year end, stamped with the
/// start's time of day and timezone.
fn year_day(year: i64, doy: i64, start: &CalendarDate) -> Option<CalendarDate> {
    CalendarDate::from_parts(
        i32::try_from(year).ok()?,
        1,
        doy,
        start.hour(),
        start.minute(),
        start.second(),
        start.timezone(),
    )
}
