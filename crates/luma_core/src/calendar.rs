//! Calendar helpers for the week view.
//!
//! Weeks start on Sunday. Dates exchanged with the store are ISO calendar
//! strings (`YYYY-MM-DD`); labels use en-US month and weekday names.

use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Date, Duration, Month, OffsetDateTime, Weekday};

const DAYS_PER_WEEK: i64 = 7;
// Wider than the representable date range; keeps `Duration::weeks` in range.
const MAX_WEEK_SHIFT: i64 = 1_000_000;
const ISO_DATE: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Sunday-to-Saturday window shown by the week view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekView {
    pub start_date: Date,
    pub end_date: Date,
}

impl WeekView {
    /// Week containing `date`.
    pub fn containing(date: Date) -> Self {
        let start_date = week_start(date);
        Self {
            start_date,
            end_date: week_end(start_date),
        }
    }

    /// Week containing today's UTC date.
    pub fn current() -> Self {
        Self::containing(today())
    }

    pub fn dates(&self) -> Vec<Date> {
        week_dates(self.start_date)
    }

    pub fn next(&self) -> Self {
        Self::containing(add_weeks(self.start_date, 1))
    }

    pub fn previous(&self) -> Self {
        Self::containing(add_weeks(self.start_date, -1))
    }

    /// Human-readable range, e.g. `Jan 7, 2024 - Jan 13, 2024`.
    pub fn label(&self) -> String {
        format_week_range(self.start_date, self.end_date)
    }
}

/// Formats `date` as `YYYY-MM-DD`.
pub fn format_date(date: Date) -> String {
    date.format(ISO_DATE)
        .unwrap_or_else(|_| date.to_string())
}

/// Parses an ISO calendar date (`YYYY-MM-DD`).
pub fn parse_date(value: &str) -> Result<Date, time::error::Parse> {
    Date::parse(value.trim(), ISO_DATE)
}

/// Sunday on or before `date`.
pub fn week_start(date: Date) -> Date {
    let offset = i64::from(date.weekday().number_days_from_sunday());
    date.saturating_sub(Duration::days(offset))
}

/// Saturday of the week containing `date`.
pub fn week_end(date: Date) -> Date {
    week_start(date).saturating_add(Duration::days(DAYS_PER_WEEK - 1))
}

/// Seven consecutive days starting at `start`.
pub fn week_dates(start: Date) -> Vec<Date> {
    (0..DAYS_PER_WEEK)
        .map(|offset| start.saturating_add(Duration::days(offset)))
        .collect()
}

/// Shifts `date` by `weeks`, saturating at the representable range.
pub fn add_weeks(date: Date, weeks: i64) -> Date {
    let weeks = weeks.clamp(-MAX_WEEK_SHIFT, MAX_WEEK_SHIFT);
    date.saturating_add(Duration::weeks(weeks))
}

pub fn format_week_range(start: Date, end: Date) -> String {
    format!("{} - {}", long_label(start), long_label(end))
}

/// Full weekday name, e.g. `Wednesday`.
pub fn day_name(date: Date) -> String {
    date.weekday().to_string()
}

/// Three-letter weekday name, e.g. `Wed`.
pub fn short_day_name(date: Date) -> String {
    abbreviate_weekday(date.weekday())
}

/// Short month and day, e.g. `Jan 10`.
pub fn day_and_month(date: Date) -> String {
    format!("{} {}", abbreviate_month(date.month()), date.day())
}

pub fn is_same_day(left: Date, right: Date) -> bool {
    left == right
}

/// Compares against the current UTC date.
pub fn is_today(date: Date) -> bool {
    is_same_day(date, today())
}

fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

fn long_label(date: Date) -> String {
    format!("{}, {}", day_and_month(date), date.year())
}

fn abbreviate_month(month: Month) -> String {
    month.to_string().chars().take(3).collect()
}

fn abbreviate_weekday(weekday: Weekday) -> String {
    weekday.to_string().chars().take(3).collect()
}
