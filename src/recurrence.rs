use std::{collections::HashSet, iter::FusedIterator};

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::error::{ConfigError, Error, ExpansionError};
use crate::utils::{parse_interval, parse_weekday, resolve_date};

pub mod models;

use models::{Occurrence, RawRule};

/// A class repeating every `interval` from `start` (included) to `end` (excluded),
/// never on an excluded weekday
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecurrenceRule {
    subject: String,
    start: NaiveDate,
    end: NaiveDate,
    interval: Duration,
    excluded: HashSet<Weekday>,
}

impl RecurrenceRule {
    /// Build a rule from already parsed values
    pub fn new(
        subject: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
        interval: Duration,
        excluded: impl IntoIterator<Item = Weekday>,
    ) -> Result<Self, Error> {
        let subject = subject.into();

        let days = interval.num_days();
        if interval != Duration::days(days) {
            return Err(ConfigError::InvalidInterval(interval.to_string()).into());
        }
        if days <= 0 {
            return Err(ConfigError::NonPositiveInterval(days).into());
        }
        if start > end {
            return Err(ConfigError::StartAfterEnd { start, end }.into());
        }

        let excluded: HashSet<_> = excluded.into_iter().collect();
        if excluded.len() == 7 {
            return Err(ExpansionError::AllWeekdaysExcluded(subject).into());
        }

        Ok(Self {
            subject,
            start,
            end,
            interval,
            excluded,
        })
    }

    /// Build a rule from the values written in a description
    pub fn from_raw(raw: RawRule) -> Result<Self, Error> {
        let start = resolve_date(&raw.start)?;
        let end = resolve_date(&raw.end)?;
        let interval = parse_interval(&raw.interval)?;
        let excluded = raw
            .dayoffs
            .iter()
            .map(parse_weekday)
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(raw.subject, start, end, interval, excluded)
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn excluded(&self) -> &HashSet<Weekday> {
        &self.excluded
    }

    /// Every class of the rule, from the start each time it's called
    pub fn occurrences(&self) -> Occurrences<'_> {
        let mut occurrences = Occurrences {
            rule: self,
            cursor: Some(self.start),
            number: 0,
        };
        occurrences.skip_excluded();

        occurrences
    }

    fn is_excluded(&self, date: NaiveDate) -> bool {
        self.excluded.contains(&date.weekday())
    }
}

/// Lazy list of the classes of a [`RecurrenceRule`]
#[derive(Clone, Debug)]
pub struct Occurrences<'a> {
    rule: &'a RecurrenceRule,
    /// Next candidate, `None` once the calendar overflowed
    cursor: Option<NaiveDate>,
    number: usize,
}

impl Occurrences<'_> {
    /// Move the cursor one interval forward
    fn step(&mut self) {
        self.cursor = self
            .cursor
            .and_then(|date| date.checked_add_signed(self.rule.interval));
    }

    /// Move the cursor past excluded weekdays, stopping at the end of the rule
    fn skip_excluded(&mut self) {
        while let Some(date) = self.cursor {
            if date >= self.rule.end || !self.rule.is_excluded(date) {
                break;
            }
            self.step();
        }
    }
}

impl<'a> Iterator for Occurrences<'a> {
    type Item = Occurrence<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let date = self.cursor.filter(|date| *date < self.rule.end)?;

        let occurrence = Occurrence {
            subject: &self.rule.subject,
            date,
            number: self.number,
        };

        self.step();
        self.skip_excluded();
        self.number += 1;

        Some(occurrence)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.cursor.filter(|date| *date < self.rule.end) {
            None => (0, Some(0)),
            Some(date) => {
                let remaining = (self.rule.end - date).num_days();
                let interval = self.rule.interval.num_days();
                // Lower bound is 1 since the cursor is already on an allowed day
                let upper = usize::try_from((remaining + interval - 1) / interval).ok();
                (1, upper)
            }
        }
    }
}

impl FusedIterator for Occurrences<'_> {}
