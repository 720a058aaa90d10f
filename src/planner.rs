use std::collections::HashMap;

use chrono::NaiveDate;
use dialoguer::Confirm;
use tracing::{debug, info};

use crate::error::Result;
use crate::semester::{models::Category, Semester};
use crate::todoist::{models::NewTask, TaskList};
use crate::utils::due_date;

/// Format of the due dates sent to the to-do list
const DUE_FORMAT: &str = "%Y-%m-%d";

/// What to do when the root project already exists
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RootPolicy {
    /// Ask the user
    Ask,
    /// Delete and recreate it
    Clear,
    /// Add to it
    Keep,
}

/// What a synchronisation created
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Subject header tasks
    pub groups: usize,
    /// Class tasks
    pub tasks: usize,
}

/// Turns the classes of a semester category into a tree of tasks:
/// root project > category project > semester task > subject task > class task
pub struct Planner<'a> {
    semester: &'a Semester,
    category: Category,
    today: NaiveDate,
}

impl<'a> Planner<'a> {
    pub fn new(semester: &'a Semester, category: Category, today: NaiveDate) -> Self {
        Self {
            semester,
            category,
            today,
        }
    }

    /// Find or create the top-level project everything goes into, returns its id
    pub async fn ensure_root(
        list: &mut dyn TaskList,
        name: &str,
        policy: RootPolicy,
    ) -> Result<String> {
        list.sync().await?;

        let existing = list
            .projects()
            .iter()
            .find(|project| project.name == name && project.parent_id.is_none())
            .map(|project| project.id.clone());

        let Some(id) = existing else {
            info!(name, "Creating root project");
            let id = list.create_project(name, None);
            list.commit().await?;
            return Ok(id);
        };

        let clear = match policy {
            RootPolicy::Clear => true,
            RootPolicy::Keep => false,
            RootPolicy::Ask => Confirm::new()
                .with_prompt(format!("Project « {name} » already exists, clear it?"))
                .default(false)
                .interact()?,
        };

        if clear {
            info!(name, "Clearing root project");
            list.delete_project(&id);
            let id = list.create_project(name, None);
            list.commit().await?;
            Ok(id)
        } else {
            debug!(name, %id, "Reusing root project");
            Ok(id)
        }
    }

    /// Create the tasks of the category under the root project
    pub async fn sync(&self, list: &mut dyn TaskList, root_id: &str) -> Result<SyncReport> {
        // The root id may come from another session, load what already exists
        list.sync().await?;

        let title = self.category.title();
        let existing = list
            .projects()
            .iter()
            .find(|project| project.name == title && project.parent_id.as_deref() == Some(root_id))
            .map(|project| project.id.clone());
        let category_id = match existing {
            Some(id) => id,
            None => {
                info!(project = title.as_str(), "Creating category project");
                let id = list.create_project(&title, Some(root_id));
                list.commit().await?;
                id
            }
        };

        let summary_id = list.create_task(NewTask {
            content: format!("Semester {}", self.semester.number),
            project_id: category_id.clone(),
            parent_id: None,
            due: None,
        });

        let mut report = SyncReport::default();
        // Subject of the current group and its header task
        let mut group: Option<(&str, String)> = None;
        // Classes seen so far per subject, kept across groups
        let mut counts: HashMap<&str, usize> = HashMap::new();

        for (rule, occurrence) in self.semester.occurrences(self.category) {
            let header_id = match &group {
                Some((subject, header_id)) if *subject == occurrence.subject => header_id.clone(),
                _ => {
                    if group.is_some() {
                        list.commit().await?;
                    }
                    debug!(subject = occurrence.subject, "New subject group");
                    let header_id = list.create_task(NewTask {
                        content: occurrence.subject.to_owned(),
                        project_id: category_id.clone(),
                        parent_id: Some(summary_id.clone()),
                        due: None,
                    });
                    group = Some((occurrence.subject, header_id.clone()));
                    report.groups += 1;
                    header_id
                }
            };

            let n = counts.entry(occurrence.subject).or_insert(0);
            *n += 1;

            let due = due_date(occurrence.date, rule.interval(), self.today);
            list.create_task(NewTask {
                content: format!("{}. {} #{n}", occurrence.subject, self.category.singular()),
                project_id: category_id.clone(),
                parent_id: Some(header_id),
                due: Some(due.format(DUE_FORMAT).to_string()),
            });
            report.tasks += 1;
        }

        list.commit().await?;
        info!(
            groups = report.groups,
            tasks = report.tasks,
            "Synchronised {}",
            self.category.name()
        );

        Ok(report)
    }
}
