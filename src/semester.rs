use std::{fs, path::Path};

use chrono::{Datelike, Duration, NaiveDate};
use tracing::{debug, warn};

use crate::error::{ConfigError, Error, Result};
use crate::recurrence::{
    models::{DateToken, IntervalToken, Occurrence, RawRule, WeekdayToken},
    RecurrenceRule,
};
use crate::utils::{next_weekday, parse_date, parse_interval, parse_weekday};

pub mod models;

use models::{Category, Description, Fragment, SubjectEntry};

/// Classes of a semester, sorted by category
#[derive(Clone, Debug)]
pub struct Semester {
    pub number: u32,
    pub begin: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    lectures: Vec<RecurrenceRule>,
    practicals: Vec<RecurrenceRule>,
    labs: Vec<RecurrenceRule>,
}

/// Values a fragment falls back to
struct Defaults<'a> {
    subject: &'a str,
    begin: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

impl Semester {
    /// Read a semester description from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> Result<Self> {
        let description: Description = serde_json::from_str(data)?;
        Self::parse(&description)
    }

    /// Build every rule of the description, stopping at the first invalid one
    pub fn parse(description: &Description) -> Result<Self> {
        let info = &description.semester;
        let number = info
            .number
            .ok_or(ConfigError::MissingField("semester.number"))?;
        let begin = info.begin.as_deref().map(parse_date).transpose()?;
        let end = info.end.as_deref().map(parse_date).transpose()?;
        if let (Some(begin), Some(end)) = (begin, end) {
            if begin > end {
                return Err(ConfigError::StartAfterEnd { start: begin, end }.into());
            }
        }

        let mut semester = Self {
            number,
            begin,
            end,
            lectures: vec![],
            practicals: vec![],
            labs: vec![],
        };

        for category in Category::ALL {
            let rules = description
                .classes
                .get(category)
                .iter()
                .map(|entry| semester.parse_subject(entry))
                .collect::<Result<Vec<_>>>()?
                .into_iter()
                .flatten()
                .collect();
            *semester.rules_mut(category) = rules;
            debug!(
                category = category.name(),
                rules = semester.rules(category).len(),
                "parsed category"
            );
        }

        Ok(semester)
    }

    fn parse_subject(&self, entry: &SubjectEntry) -> Result<Vec<RecurrenceRule>> {
        let subject = entry
            .subject
            .as_deref()
            .ok_or(ConfigError::MissingField("subject"))?;
        let defaults = Defaults {
            subject,
            begin: self.begin,
            end: self.end,
        };

        let mut rules = vec![];
        for (day, fragments) in &entry.schedule {
            for fragment in fragments {
                let rule = build_rule(fragment, day, &defaults).map_err(|err| match err {
                    Error::Config(source) => Error::Config(ConfigError::InSubject {
                        subject: subject.to_owned(),
                        source: Box::new(source),
                    }),
                    other => other,
                })?;
                debug!(
                    subject = rule.subject(),
                    start = %rule.start(),
                    end = %rule.end(),
                    interval = rule.interval().num_days(),
                    excluded = ?rule.excluded(),
                    "parsed rule"
                );
                rules.push(rule);
            }
        }

        Ok(rules)
    }

    pub fn rules(&self, category: Category) -> &[RecurrenceRule] {
        match category {
            Category::Lectures => &self.lectures,
            Category::Practicals => &self.practicals,
            Category::Labs => &self.labs,
        }
    }

    fn rules_mut(&mut self, category: Category) -> &mut Vec<RecurrenceRule> {
        match category {
            Category::Lectures => &mut self.lectures,
            Category::Practicals => &mut self.practicals,
            Category::Labs => &mut self.labs,
        }
    }

    /// Classes of a category, rule after rule, with the rule that produced them
    pub fn occurrences(
        &self,
        category: Category,
    ) -> impl Iterator<Item = (&RecurrenceRule, Occurrence<'_>)> {
        self.rules(category)
            .iter()
            .flat_map(|rule| rule.occurrences().map(move |occurrence| (rule, occurrence)))
    }
}

/// Apply the defaults to a fragment: fragment, then semester, then hardcoded values
fn build_rule(fragment: &Fragment, day: &str, defaults: &Defaults) -> Result<RecurrenceRule> {
    let weekday = parse_weekday(&WeekdayToken::Name(day.to_owned()))?;

    // Only a written start can be after the end, a derived one is clamped
    let derived = fragment.start.is_none();
    let start = match &fragment.start {
        Some(start) => {
            let start = parse_date(start)?;
            if start.weekday() != weekday {
                warn!(
                    subject = defaults.subject,
                    %start,
                    "start isn't a {weekday}, keeping it anyway"
                );
            }
            start
        }
        None => next_weekday(
            defaults.begin.ok_or(ConfigError::MissingField("start"))?,
            weekday,
        ),
    };

    let interval = match &fragment.interval {
        Some(interval) => parse_interval(interval)?,
        None => Duration::days(1),
    };

    let end = match (&fragment.end, fragment.count) {
        (Some(_), Some(_)) => return Err(ConfigError::EndAndCount.into()),
        (Some(end), None) => parse_date(end)?,
        (None, Some(count)) => interval
            .checked_mul(i32::try_from(count).map_err(|_| ConfigError::CountOverflow(count))?)
            .and_then(|span| start.checked_add_signed(span))
            .ok_or(ConfigError::CountOverflow(count))?,
        (None, None) => defaults.end.ok_or(ConfigError::MissingField("end"))?,
    };
    let start = if derived { start.min(end) } else { start };

    RecurrenceRule::from_raw(RawRule {
        subject: defaults.subject.to_owned(),
        start: DateToken::Date(start),
        end: DateToken::Date(end),
        interval: IntervalToken::Duration(interval),
        dayoffs: fragment.dayoffs.clone().unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    use crate::error::ExpansionError;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    /// Unwrap the subject context of a configuration error
    fn config_error(err: Error) -> ConfigError {
        match err {
            Error::Config(ConfigError::InSubject { source, .. }) => *source,
            Error::Config(err) => err,
            other => panic!("expected a configuration error, got {other}"),
        }
    }

    const DESCRIPTION: &str = r#"{
        "semester": {"number": 2, "begin": "01/01/2024", "end": "05/31/2024"},
        "classes": {
            "lectures": [
                {"subject": "Maths", "schedule": {"Monday": [{"interval": 7}]}}
            ],
            "practicals": [
                {"subject": "Physics", "schedule": {"wed": [{"interval": "14 days", "count": 3}]}}
            ],
            "labs": [
                {"subject": "Chemistry", "schedule": {
                    "Tue": [{"start": "01/02/2024", "end": "01/30/2024", "interval": 7}],
                    "4": [{"start": "01/05/2024", "count": 4, "interval": 1, "dayoffs": ["Sat", 6]}]
                }},
                {"subject": "Biology", "schedule": {"thursday": [{"interval": 7, "count": 2}]}}
            ]
        }
    }"#;

    #[test]
    fn parses_every_category_from_its_own_key() {
        let semester = Semester::from_json(DESCRIPTION).unwrap();

        assert_eq!(semester.number, 2);
        assert_eq!(semester.begin, Some(date(1, 1)));
        assert_eq!(semester.end, Some(date(5, 31)));

        assert_eq!(semester.rules(Category::Lectures).len(), 1);
        assert_eq!(semester.rules(Category::Practicals).len(), 1);
        assert_eq!(semester.rules(Category::Practicals)[0].subject(), "Physics");
        assert_eq!(semester.rules(Category::Labs).len(), 3);
    }

    #[test]
    fn fragments_inherit_semester_bounds() {
        let semester = Semester::from_json(DESCRIPTION).unwrap();
        let maths = &semester.rules(Category::Lectures)[0];

        // 2024-01-01 is already a Monday
        assert_eq!(maths.start(), date(1, 1));
        assert_eq!(maths.end(), date(5, 31));
        assert_eq!(maths.interval(), Duration::days(7));
        assert!(maths.excluded().is_empty());
    }

    #[test]
    fn default_start_is_moved_to_the_weekday() {
        let semester = Semester::from_json(DESCRIPTION).unwrap();
        let physics = &semester.rules(Category::Practicals)[0];

        assert_eq!(physics.start(), date(1, 3));
        // 3 times 14 days
        assert_eq!(physics.end(), date(2, 14));
        assert_eq!(
            physics.occurrences().map(|o| o.date).collect::<Vec<_>>(),
            vec![date(1, 3), date(1, 17), date(1, 31)]
        );
    }

    #[test]
    fn count_and_dayoffs() {
        let semester = Semester::from_json(DESCRIPTION).unwrap();
        let chemistry = &semester.rules(Category::Labs)[1];

        assert_eq!(chemistry.end(), date(1, 9));
        assert_eq!(
            chemistry.excluded(),
            &std::collections::HashSet::from([Weekday::Sat, Weekday::Sun])
        );
        // Weekend classes are dropped, not moved
        assert_eq!(
            chemistry.occurrences().map(|o| o.date).collect::<Vec<_>>(),
            vec![date(1, 5), date(1, 8)]
        );
    }

    #[test]
    fn occurrences_follow_rule_order() {
        let semester = Semester::from_json(DESCRIPTION).unwrap();
        let labs: Vec<_> = semester
            .occurrences(Category::Labs)
            .map(|(_, o)| (o.subject, o.date, o.number))
            .collect();

        assert_eq!(
            labs,
            vec![
                ("Chemistry", date(1, 2), 0),
                ("Chemistry", date(1, 9), 1),
                ("Chemistry", date(1, 16), 2),
                ("Chemistry", date(1, 23), 3),
                ("Chemistry", date(1, 5), 0),
                ("Chemistry", date(1, 8), 1),
                ("Biology", date(1, 4), 0),
                ("Biology", date(1, 11), 1),
            ]
        );
    }

    #[test]
    fn missing_categories_are_empty() {
        let semester = Semester::from_json(
            r#"{"semester": {"number": 1, "begin": "09/02/2024", "end": "12/20/2024"}}"#,
        )
        .unwrap();
        for category in Category::ALL {
            assert!(semester.rules(category).is_empty());
        }
    }

    #[test]
    fn unknown_weekday_key_fails() {
        let err = Semester::from_json(
            r#"{"semester": {"number": 1, "begin": "09/02/2024", "end": "12/20/2024"},
                "classes": {"labs": [{"subject": "Lab", "schedule": {"Funday": [{}]}}]}}"#,
        )
        .unwrap_err();
        assert_eq!(
            config_error(err),
            ConfigError::UnknownWeekday("Funday".into())
        );
    }

    #[test]
    fn unknown_dayoff_fails() {
        let err = Semester::from_json(
            r#"{"semester": {"number": 1, "begin": "09/02/2024", "end": "12/20/2024"},
                "classes": {"labs": [{"subject": "Lab", "schedule": {"mon": [{"dayoffs": ["Funday"]}]}}]}}"#,
        )
        .unwrap_err();
        assert!(matches!(
            &err,
            Error::Config(ConfigError::InSubject { subject, .. }) if subject == "Lab"
        ));
        assert_eq!(
            config_error(err),
            ConfigError::UnknownWeekday("Funday".into())
        );
    }

    #[test]
    fn missing_bounds_fail() {
        let err = Semester::from_json(
            r#"{"semester": {"number": 1},
                "classes": {"labs": [{"subject": "Lab", "schedule": {"mon": [{}]}}]}}"#,
        )
        .unwrap_err();
        assert_eq!(config_error(err), ConfigError::MissingField("start"));

        let err = Semester::from_json(
            r#"{"semester": {"number": 1, "begin": "09/02/2024"},
                "classes": {"labs": [{"subject": "Lab", "schedule": {"mon": [{}]}}]}}"#,
        )
        .unwrap_err();
        assert_eq!(config_error(err), ConfigError::MissingField("end"));
    }

    #[test]
    fn missing_subject_fails() {
        let err = Semester::from_json(
            r#"{"semester": {"number": 1, "begin": "09/02/2024", "end": "12/20/2024"},
                "classes": {"labs": [{"schedule": {"mon": [{}]}}]}}"#,
        )
        .unwrap_err();
        assert_eq!(config_error(err), ConfigError::MissingField("subject"));
    }

    #[test]
    fn end_and_count_together_fail() {
        let err = Semester::from_json(
            r#"{"semester": {"number": 1, "begin": "09/02/2024", "end": "12/20/2024"},
                "classes": {"labs": [{"subject": "Lab", "schedule": {"mon": [{"end": "10/01/2024", "count": 2}]}}]}}"#,
        )
        .unwrap_err();
        assert_eq!(config_error(err), ConfigError::EndAndCount);
    }

    #[test]
    fn invalid_values_fail() {
        let err = Semester::from_json(
            r#"{"semester": {"number": 1, "begin": "09/02/2024", "end": "12/20/2024"},
                "classes": {"labs": [{"subject": "Lab", "schedule": {"mon": [{"interval": 0}]}}]}}"#,
        )
        .unwrap_err();
        assert_eq!(config_error(err), ConfigError::NonPositiveInterval(0));

        let err = Semester::from_json(
            r#"{"semester": {"number": 1, "begin": "2024/09/02", "end": "12/20/2024"}}"#,
        )
        .unwrap_err();
        assert_eq!(
            config_error(err),
            ConfigError::InvalidDate("2024/09/02".into())
        );

        let err = Semester::from_json(
            r#"{"semester": {"number": 1, "begin": "12/20/2024", "end": "09/02/2024"}}"#,
        )
        .unwrap_err();
        assert!(matches!(
            config_error(err),
            ConfigError::StartAfterEnd { .. }
        ));
    }

    #[test]
    fn every_weekday_off_fails() {
        let err = Semester::from_json(
            r#"{"semester": {"number": 1, "begin": "09/02/2024", "end": "12/20/2024"},
                "classes": {"labs": [{"subject": "Lab", "schedule": {"mon": [
                    {"dayoffs": [0, 1, 2, 3, 4, 5, 6]}
                ]}}]}}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::Expansion(ExpansionError::AllWeekdaysExcluded(subject)) if subject == "Lab"
        ));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = Semester::from_json(
            r#"{"semester": {"number": 1, "begin": "09/02/2024", "end": "12/20/2024"},
                "classes": {"labs": [{"subject": "Lab", "schedule": {"mon": [{"every": 7}]}}]}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn weekday_never_reached_gives_an_empty_rule() {
        // 2024-01-01 is a Monday, the semester stops before the first Wednesday
        let semester = Semester::from_json(
            r#"{"semester": {"number": 1, "begin": "01/01/2024", "end": "01/02/2024"},
                "classes": {"labs": [{"subject": "Lab", "schedule": {"wed": [{"interval": 7}]}}]}}"#,
        )
        .unwrap();

        let lab = &semester.rules(Category::Labs)[0];
        assert_eq!(lab.start(), date(1, 2));
        assert_eq!(lab.occurrences().count(), 0);
    }

    #[test]
    fn end_before_first_weekday_gives_an_empty_rule() {
        // 2024-09-02 is a Monday, the first Friday comes after the end
        let semester = Semester::from_json(
            r#"{"semester": {"number": 1, "begin": "09/02/2024", "end": "12/20/2024"},
                "classes": {"labs": [{"subject": "Lab", "schedule": {"fri": [{"interval": 7, "end": "09/05/2024"}]}}]}}"#,
        )
        .unwrap();

        let lab = &semester.rules(Category::Labs)[0];
        assert_eq!(lab.start(), date(9, 5));
        assert_eq!(lab.occurrences().next(), None);
    }

    #[test]
    fn written_start_after_end_fails() {
        let err = Semester::from_json(
            r#"{"semester": {"number": 1, "begin": "09/02/2024", "end": "12/20/2024"},
                "classes": {"labs": [{"subject": "Lab", "schedule": {"fri": [{"start": "09/06/2024", "end": "09/05/2024"}]}}]}}"#,
        )
        .unwrap_err();
        assert!(matches!(
            config_error(err),
            ConfigError::StartAfterEnd { .. }
        ));
    }

    #[test]
    fn loads_example_file() {
        let semester = Semester::load(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/data/semester_example.json"
        ))
        .unwrap();

        assert_eq!(semester.number, 5);
        let labs = semester.rules(Category::Labs);
        assert_eq!(labs.len(), 4);

        let counts: Vec<_> = labs.iter().map(|rule| rule.occurrences().count()).collect();
        assert_eq!(counts, [7, 6, 4, 4]);
        assert_eq!(
            semester
                .occurrences(Category::Labs)
                .filter(|(_, o)| o.subject == "Databases")
                .map(|(_, o)| o.date)
                .take(5)
                .collect::<Vec<_>>(),
            [
                date(9, 6),
                date(9, 13),
                date(9, 20),
                date(9, 27),
                date(11, 8),
            ]
        );
    }

    #[test]
    fn missing_file_fails() {
        assert!(matches!(
            Semester::load("does/not/exist.json"),
            Err(Error::Io(_))
        ));
    }
}
