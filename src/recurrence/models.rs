use chrono::{Duration, NaiveDate, Weekday};
use serde::Deserialize;

/// A date, either already parsed or as written in the description
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DateToken {
    Date(NaiveDate),
    Text(String),
}

impl From<NaiveDate> for DateToken {
    fn from(date: NaiveDate) -> Self {
        Self::Date(date)
    }
}

impl From<&str> for DateToken {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

/// A space between two classes
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum IntervalToken {
    /// Number of days
    Days(i64),
    /// Number of days as text, i.e. `"7"` or `"7 days"`
    Text(String),
    #[serde(skip_deserializing)]
    Duration(Duration),
}

impl From<Duration> for IntervalToken {
    fn from(duration: Duration) -> Self {
        Self::Duration(duration)
    }
}

/// A day of the week, as a name, an abbreviation or an index (Monday is 0)
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum WeekdayToken {
    Index(i64),
    Name(String),
    #[serde(skip_deserializing)]
    Day(Weekday),
}

impl From<&str> for WeekdayToken {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

impl From<Weekday> for WeekdayToken {
    fn from(day: Weekday) -> Self {
        Self::Day(day)
    }
}

/// Everything needed to build a rule, before any validation
#[derive(Clone, Debug)]
pub struct RawRule {
    pub subject: String,
    pub start: DateToken,
    pub end: DateToken,
    pub interval: IntervalToken,
    pub dayoffs: Vec<WeekdayToken>,
}

/// One class of a rule
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Occurrence<'a> {
    /// Subject of the class
    pub subject: &'a str,

    /// Day the class takes place
    pub date: NaiveDate,

    /// Position among the classes of the rule, starting at 0
    pub number: usize,
}
