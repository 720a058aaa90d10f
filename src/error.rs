use chrono::NaiveDate;
use thiserror::Error;

/// Problems found while reading the semester description
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("invalid date `{0}`, expected MM/DD/YYYY")]
    InvalidDate(String),
    #[error("invalid interval `{0}`, expected a number of days")]
    InvalidInterval(String),
    #[error("interval must be a positive number of days, got {0}")]
    NonPositiveInterval(i64),
    #[error("unknown weekday `{0}`")]
    UnknownWeekday(String),
    #[error("start {start} is after end {end}")]
    StartAfterEnd { start: NaiveDate, end: NaiveDate },
    #[error("`end` and `count` can't be given together")]
    EndAndCount,
    #[error("`count` of {0} occurrences overflows the calendar")]
    CountOverflow(u32),
    #[error("{subject}: {source}")]
    InSubject {
        subject: String,
        #[source]
        source: Box<ConfigError>,
    },
}

/// Rules that would never produce a class
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ExpansionError {
    #[error("{0}: every weekday is excluded")]
    AllWeekdaysExcluded(String),
}

/// Failures reported by the to-do list service, passed through as-is
#[derive(Error, Debug)]
pub enum ExternalServiceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("service answered {status}: {message}")]
    Status { status: u16, message: String },
    #[error("command `{command}` rejected: {message}")]
    Command { command: String, message: String },
    #[error("command `{0}` got no answer")]
    Unanswered(String),
    #[error("can't encode commands: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("expansion error: {0}")]
    Expansion(#[from] ExpansionError),
    #[error("to-do list error: {0}")]
    External(#[from] ExternalServiceError),
    #[error("can't read description: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid description: {0}")]
    Json(#[from] serde_json::Error),
    #[error("prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
