use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::error::ConfigError;
use crate::recurrence::models::{DateToken, IntervalToken, WeekdayToken};

pub mod models;

/// Date format used by the semester description
pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// Turn a `MM/DD/YYYY` (or ISO) string to a date
pub fn parse_date(date: &str) -> Result<NaiveDate, ConfigError> {
    let date = date.trim();
    NaiveDate::parse_from_str(date, DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(date, "%Y-%m-%d"))
        .map_err(|_| ConfigError::InvalidDate(date.to_owned()))
}

pub fn resolve_date(token: &DateToken) -> Result<NaiveDate, ConfigError> {
    match token {
        DateToken::Date(date) => Ok(*date),
        DateToken::Text(text) => parse_date(text),
    }
}

/// Turn a weekday name, abbreviation or index (Monday is 0) to a weekday
pub fn parse_weekday(token: &WeekdayToken) -> Result<Weekday, ConfigError> {
    match token {
        WeekdayToken::Day(day) => Ok(*day),
        WeekdayToken::Index(i) => match i {
            0..=6 => Ok(weekday_from_index(*i)),
            _ => Err(ConfigError::UnknownWeekday(i.to_string())),
        },
        WeekdayToken::Name(name) => {
            let clean = name.trim().to_lowercase();
            match clean.as_str() {
                "monday" | "mon" => Ok(Weekday::Mon),
                "tuesday" | "tue" => Ok(Weekday::Tue),
                "wednesday" | "wed" => Ok(Weekday::Wed),
                "thursday" | "thu" => Ok(Weekday::Thu),
                "friday" | "fri" => Ok(Weekday::Fri),
                "saturday" | "sat" => Ok(Weekday::Sat),
                "sunday" | "sun" => Ok(Weekday::Sun),
                // Indexes written as strings, i.e. "3"
                _ => match clean.parse::<i64>() {
                    Ok(i) if (0..=6).contains(&i) => Ok(weekday_from_index(i)),
                    _ => Err(ConfigError::UnknownWeekday(name.clone())),
                },
            }
        }
    }
}

fn weekday_from_index(i: i64) -> Weekday {
    match i {
        0 => Weekday::Mon,
        1 => Weekday::Tue,
        2 => Weekday::Wed,
        3 => Weekday::Thu,
        4 => Weekday::Fri,
        5 => Weekday::Sat,
        _ => Weekday::Sun,
    }
}

/// Turn a number of days (`7`, `"7"`, `"7 days"`) to a positive duration
pub fn parse_interval(token: &IntervalToken) -> Result<Duration, ConfigError> {
    let days = match token {
        IntervalToken::Duration(duration) => {
            // Only whole days make sense between two classes
            if duration.num_seconds() % 86_400 != 0 {
                return Err(ConfigError::InvalidInterval(duration.to_string()));
            }
            duration.num_days()
        }
        IntervalToken::Days(days) => *days,
        IntervalToken::Text(text) => {
            let clean = text.trim().to_lowercase();
            let number = clean
                .strip_suffix("days")
                .or_else(|| clean.strip_suffix("day"))
                .or_else(|| clean.strip_suffix('d'))
                .unwrap_or(&clean)
                .trim();
            number
                .parse()
                .map_err(|_| ConfigError::InvalidInterval(text.clone()))?
        }
    };

    if days <= 0 {
        return Err(ConfigError::NonPositiveInterval(days));
    }

    Duration::try_days(days).ok_or_else(|| ConfigError::InvalidInterval(days.to_string()))
}

/// First date on or after `from` that falls on `weekday`
pub fn next_weekday(from: NaiveDate, weekday: Weekday) -> NaiveDate {
    let offset = (7 + weekday.num_days_from_monday() - from.weekday().num_days_from_monday()) % 7;
    from + Duration::days(i64::from(offset))
}

/// When the task of a class is due: one interval after it, never in the past
pub fn due_date(date: NaiveDate, interval: Duration, today: NaiveDate) -> NaiveDate {
    date.checked_add_signed(interval)
        .map_or(today, |due| due.max(today))
}

pub trait Capitalize {
    /// Capitalize string
    fn capitalize(&self) -> String;
}

impl Capitalize for str {
    fn capitalize(&self) -> String {
        let mut string = self.to_owned();
        if let Some(r) = string.get_mut(0..1) {
            r.make_ascii_uppercase();
        }

        string
    }
}
