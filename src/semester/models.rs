use clap::ValueEnum;
use indexmap::IndexMap;
use serde::Deserialize;

use crate::recurrence::models::{IntervalToken, WeekdayToken};
use crate::utils::Capitalize;

/// Whole semester description, as read from the JSON file
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Description {
    pub semester: SemesterInfo,
    #[serde(default)]
    pub classes: Classes,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SemesterInfo {
    pub number: Option<u32>,
    pub begin: Option<String>,
    pub end: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Classes {
    #[serde(default)]
    pub lectures: Vec<SubjectEntry>,
    #[serde(default)]
    pub practicals: Vec<SubjectEntry>,
    #[serde(default)]
    pub labs: Vec<SubjectEntry>,
}

impl Classes {
    pub fn get(&self, category: Category) -> &[SubjectEntry] {
        match category {
            Category::Lectures => &self.lectures,
            Category::Practicals => &self.practicals,
            Category::Labs => &self.labs,
        }
    }
}

/// A subject and its weekly schedule
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubjectEntry {
    pub subject: Option<String>,
    /// Weekday token => classes starting on that day, in file order
    #[serde(default)]
    pub schedule: IndexMap<String, Vec<Fragment>>,
}

/// One schedule entry, before defaults are applied
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fragment {
    pub start: Option<String>,
    pub end: Option<String>,
    pub count: Option<u32>,
    pub interval: Option<IntervalToken>,
    pub dayoffs: Option<Vec<WeekdayToken>>,
}

/// Kinds of classes of a semester
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum)]
pub enum Category {
    Lectures,
    Practicals,
    Labs,
}

impl Category {
    pub const ALL: [Category; 3] = [Self::Lectures, Self::Practicals, Self::Labs];

    /// Name of the category in the description
    pub fn name(self) -> &'static str {
        match self {
            Self::Lectures => "lectures",
            Self::Practicals => "practicals",
            Self::Labs => "labs",
        }
    }

    /// Name used for the project of the category, i.e. `Labs`
    pub fn title(self) -> String {
        self.name().capitalize()
    }

    /// Name of one class of the category, i.e. `Lab`
    pub fn singular(self) -> &'static str {
        match self {
            Self::Lectures => "Lecture",
            Self::Practicals => "Practical",
            Self::Labs => "Lab",
        }
    }
}
