//! Human-readable rule summaries.
//!
//! All display text comes from an explicit [`DescribeStrings`] table the
//! caller owns; the crate carries only the English defaults. The summary is
//! line oriented: the pattern, the end condition, and the exception days
//! when any exist.

use crate::date::CalendarDate;
use crate::rule::{RecurrenceRule, RecurrenceType};
use crate::weekday::Weekday;

/// Translatable strings for [`RecurrenceRule::describe`] and
/// [`RecurrenceRule::recur_name`]. `times_format` carries a `%d`
/// placeholder for the occurrence count; `weekdays` is Sunday-first.
#[derive(Debug, Clone)]
pub struct DescribeStrings<'a> {
    pub none: &'a str,
    pub daily_name: &'a str,
    pub weekly_name: &'a str,
    pub monthly_name: &'a str,
    pub yearly_name: &'a str,
    pub daily: &'a str,
    pub weekly: &'a str,
    pub monthly: &'a str,
    pub yearly: &'a str,
    pub days: &'a str,
    pub weeks_on: &'a str,
    pub months: &'a str,
    pub on_same_date: &'a str,
    pub on_same_weekday: &'a str,
    pub on_same_last_weekday: &'a str,
    pub years_on_same_date: &'a str,
    pub years_on_same_day: &'a str,
    pub years_on_same_weekday: &'a str,
    pub ends_after: &'a str,
    pub times_format: &'a str,
    pub no_end_date: &'a str,
    pub exceptions_on: &'a str,
    pub weekdays: [&'a str; 7],
}

impl Default for DescribeStrings<'_> {
    fn default() -> Self {
        Self {
            none: "No recurrence",
            daily_name: "Daily",
            weekly_name: "Weekly",
            monthly_name: "Monthly",
            yearly_name: "Yearly",
            daily: "Daily: Recurs every",
            weekly: "Weekly: Recurs every",
            monthly: "Monthly: Recurs every",
            yearly: "Yearly: Recurs every",
            days: "day(s)",
            weeks_on: "week(s) on:",
            months: "month(s)",
            on_same_date: "on the same date",
            on_same_weekday: "on the same weekday",
            on_same_last_weekday: "on the same last weekday",
            years_on_same_date: "year(s) on the same date",
            years_on_same_day: "year(s) on the same day of the year",
            years_on_same_weekday: "year(s) on the same weekday and month of the year",
            ends_after: "Ends after",
            times_format: "%d times",
            no_end_date: "No end date",
            exceptions_on: "Exceptions on",
            weekdays: [
                "Sunday",
                "Monday",
                "Tuesday",
                "Wednesday",
                "Thursday",
                "Friday",
                "Saturday",
            ],
        }
    }
}

impl RecurrenceRule {
    /// The recurrence family label.
    #[must_use]
    pub fn recur_name<'a>(&self, strings: &DescribeStrings<'a>) -> &'a str {
        match self.recur_type() {
            RecurrenceType::None => strings.none,
            RecurrenceType::Daily => strings.daily_name,
            RecurrenceType::Weekly => strings.weekly_name,
            RecurrenceType::MonthlyDate
            | RecurrenceType::MonthlyWeekday
            | RecurrenceType::MonthlyLastWeekday => strings.monthly_name,
            RecurrenceType::YearlyDate
            | RecurrenceType::YearlyDay
            | RecurrenceType::YearlyWeekday => strings.yearly_name,
        }
    }

    /// Multi-line summary of the rule: pattern, end condition, and exception
    /// days formatted with the strftime-style `date_format`.
    #[must_use]
    pub fn describe(&self, strings: &DescribeStrings<'_>, date_format: &str) -> String {
        let interval = self.interval();
        let mut out = match self.recur_type() {
            RecurrenceType::None => String::new(),
            RecurrenceType::Daily => {
                format!("{} {interval} {}", strings.daily, strings.days)
            }
            RecurrenceType::Weekly => {
                let listing_order = [
                    Weekday::Monday,
                    Weekday::Tuesday,
                    Weekday::Wednesday,
                    Weekday::Thursday,
                    Weekday::Friday,
                    Weekday::Saturday,
                    Weekday::Sunday,
                ];
                let names: Vec<&str> = listing_order
                    .into_iter()
                    .filter(|day| self.recurs_on(*day))
                    .map(|day| strings.weekdays[usize::from(day.index())])
                    .collect();
                format!(
                    "{} {interval} {} {}",
                    strings.weekly,
                    strings.weeks_on,
                    names.join(", ")
                )
            }
            RecurrenceType::MonthlyDate => format!(
                "{} {interval} {} {}",
                strings.monthly, strings.months, strings.on_same_date
            ),
            RecurrenceType::MonthlyWeekday => format!(
                "{} {interval} {} {}",
                strings.monthly, strings.months, strings.on_same_weekday
            ),
            RecurrenceType::MonthlyLastWeekday => format!(
                "{} {interval} {} {}",
                strings.monthly, strings.months, strings.on_same_last_weekday
            ),
            RecurrenceType::YearlyDate => {
                format!("{} {interval} {}", strings.yearly, strings.years_on_same_date)
            }
            RecurrenceType::YearlyDay => {
                format!("{} {interval} {}", strings.yearly, strings.years_on_same_day)
            }
            RecurrenceType::YearlyWeekday => format!(
                "{} {interval} {}",
                strings.yearly, strings.years_on_same_weekday
            ),
        };

        out.push('\n');
        out.push_str(strings.ends_after);
        out.push_str(": ");
        if let Some(end) = self.end_date() {
            out.push_str(&end.format(date_format));
        } else if let Some(count) = self.count() {
            out.push_str(&strings.times_format.replace("%d", &count.to_string()));
        } else {
            out.push_str(strings.no_end_date);
        }

        if !self.exceptions().is_empty() {
            out.push('\n');
            out.push_str(strings.exceptions_on);
            out.push_str(": ");
            for key in self.exceptions() {
                if let Some(date) = date_from_key(key) {
                    out.push_str(&date.format(date_format));
                    out.push(' ');
                }
            }
        }
        out
    }
}

fn date_from_key(key: &str) -> Option<CalendarDate> {
    let year = key.get(0..4)?.parse().ok()?;
    let month = key.get(4..6)?.parse().ok()?;
    let day = key.get(6..8)?.parse().ok()?;
    CalendarDate::date(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weekday::WeekdayMask;

    fn rule() -> RecurrenceRule {
        RecurrenceRule::new(CalendarDate::new(2007, 3, 1, 10, 0, 0).unwrap())
    }

    #[test]
    fn daily_summary() {
        let mut r = rule();
        r.set_recur_type(RecurrenceType::Daily);
        r.set_interval(2);
        r.set_count(4);
        let text = r.describe(&DescribeStrings::default(), "%Y-%m-%d");
        assert_eq!(text, "Daily: Recurs every 2 day(s)\nEnds after: 4 times");
    }

    #[test]
    fn weekly_summary_lists_days_monday_first() {
        let mut r = rule();
        r.set_recur_type(RecurrenceType::Weekly);
        r.set_recur_on_days(WeekdayMask::SUNDAY | WeekdayMask::TUESDAY);
        let text = r.describe(&DescribeStrings::default(), "%Y-%m-%d");
        assert_eq!(
            text,
            "Weekly: Recurs every 1 week(s) on: Tuesday, Sunday\nEnds after: No end date"
        );
    }

    #[test]
    fn end_date_and_exceptions() {
        let mut r = rule();
        r.set_recur_type(RecurrenceType::MonthlyDate);
        r.set_end_date(CalendarDate::date(2007, 6, 1));
        r.add_exception(2007, 4, 1);
        let text = r.describe(&DescribeStrings::default(), "%Y-%m-%d");
        assert_eq!(
            text,
            "Monthly: Recurs every 1 month(s) on the same date\nEnds after: 2007-06-01\nExceptions on: 2007-04-01 "
        );
    }

    #[test]
    fn family_names() {
        let strings = DescribeStrings::default();
        let mut r = rule();
        assert_eq!(r.recur_name(&strings), "No recurrence");
        r.set_recur_type(RecurrenceType::Daily);
        assert_eq!(r.recur_name(&strings), "Daily");
        r.set_recur_type(RecurrenceType::MonthlyLastWeekday);
        assert_eq!(r.recur_name(&strings), "Monthly");
        r.set_recur_type(RecurrenceType::YearlyDay);
        assert_eq!(r.recur_name(&strings), "Yearly");
    }
}
