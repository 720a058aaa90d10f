use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::error::ExternalServiceError;

pub mod models;

use models::{Command, NewTask, Project, SyncResponse};

const DEFAULT_BASE_URL: &str = "https://api.todoist.com/api/v1";

/// What the planner needs from a to-do list service.
///
/// Creations are queued and only reach the service on [`TaskList::commit`].
/// The returned ids can be used as parents by the next creations, in the
/// same batch or in a later one.
#[async_trait]
pub trait TaskList: Send {
    /// Load the current state of the service
    async fn sync(&mut self) -> Result<(), ExternalServiceError>;

    /// Projects known since the last sync or commit
    fn projects(&self) -> &[Project];

    fn create_project(&mut self, name: &str, parent_id: Option<&str>) -> String;

    fn create_task(&mut self, task: NewTask) -> String;

    fn delete_project(&mut self, id: &str);

    /// Send every queued operation
    async fn commit(&mut self) -> Result<(), ExternalServiceError>;
}

/// Client of the Todoist Sync API
pub struct Todoist {
    http: reqwest::Client,
    token: String,
    base_url: String,
    sync_token: String,
    projects: Vec<Project>,
    queue: Vec<Command>,
    /// Temporary ids of past batches => real ids
    temp_ids: HashMap<String, String>,
}

impl Todoist {
    pub fn new(token: impl Into<String>) -> Result<Self, ExternalServiceError> {
        Self::with_base_url(token, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(
        token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, ExternalServiceError> {
        let user_agent = format!("semester-planner/{}", env!("CARGO_PKG_VERSION"));

        // Use custom User-Agent
        let http = reqwest::Client::builder().user_agent(user_agent).build()?;

        Ok(Self {
            http,
            token: token.into(),
            base_url: base_url.into(),
            sync_token: "*".to_owned(),
            projects: vec![],
            queue: vec![],
            temp_ids: HashMap::new(),
        })
    }

    /// Real id when a temporary one was already committed
    fn resolve(&self, id: &str) -> String {
        self.temp_ids
            .get(id)
            .cloned()
            .unwrap_or_else(|| id.to_owned())
    }

    /// Queue a command, returns its temporary id
    fn push(&mut self, kind: &'static str, args: serde_json::Value, creates: bool) -> String {
        let temp_id = Uuid::new_v4().to_string();
        self.queue.push(Command {
            kind,
            uuid: Uuid::new_v4().to_string(),
            temp_id: creates.then(|| temp_id.clone()),
            args,
        });

        temp_id
    }

    /// Send the commands, keeping the project list up to date
    async fn request(&mut self, commands: Vec<Command>) -> Result<(), ExternalServiceError> {
        let commands_json = serde_json::to_string(&commands)?;
        let form = [
            ("sync_token", self.sync_token.clone()),
            ("resource_types", r#"["projects"]"#.to_owned()),
            ("commands", commands_json),
        ];

        let response = self
            .http
            .post(format!("{}/sync", self.base_url))
            .bearer_auth(&self.token)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ExternalServiceError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let answer: SyncResponse = response.json().await?;
        self.apply(&commands, answer)
    }

    fn apply(
        &mut self,
        commands: &[Command],
        answer: SyncResponse,
    ) -> Result<(), ExternalServiceError> {
        // Keep the mapping even when a command failed, the others went through
        self.temp_ids.extend(answer.temp_id_mapping);

        if let Some(token) = answer.sync_token {
            self.sync_token = token;
        }

        if answer.full_sync {
            self.projects.clear();
        }
        for project in answer.projects {
            self.projects.retain(|known| known.id != project.id);
            if !project.is_deleted {
                self.projects.push(project);
            }
        }

        for command in commands {
            match answer.sync_status.get(&command.uuid) {
                None => {
                    return Err(ExternalServiceError::Unanswered(command.kind.to_owned()));
                }
                Some(status) if status == "ok" => (),
                Some(status) => {
                    let message = status
                        .get("error")
                        .and_then(|e| e.as_str())
                        .map_or_else(|| status.to_string(), ToOwned::to_owned);
                    return Err(ExternalServiceError::Command {
                        command: command.kind.to_owned(),
                        message,
                    });
                }
            }
        }

        Ok(())
    }
}

#[async_trait]
impl TaskList for Todoist {
    #[instrument(skip(self))]
    async fn sync(&mut self) -> Result<(), ExternalServiceError> {
        debug!("Loading projects");
        self.request(vec![]).await?;
        info!(projects = self.projects.len(), "Synchronised with Todoist");

        Ok(())
    }

    fn projects(&self) -> &[Project] {
        &self.projects
    }

    fn create_project(&mut self, name: &str, parent_id: Option<&str>) -> String {
        let parent_id = parent_id.map(|id| self.resolve(id));
        self.push(
            "project_add",
            json!({ "name": name, "parent_id": parent_id }),
            true,
        )
    }

    fn create_task(&mut self, task: NewTask) -> String {
        let mut args = json!({
            "content": task.content,
            "project_id": self.resolve(&task.project_id),
        });
        if let Some(parent_id) = task.parent_id {
            args["parent_id"] = json!(self.resolve(&parent_id));
        }
        if let Some(due) = task.due {
            args["due"] = json!({ "string": due });
        }

        self.push("item_add", args, true)
    }

    fn delete_project(&mut self, id: &str) {
        let id = self.resolve(id);
        self.push("project_delete", json!({ "id": id }), false);
    }

    #[instrument(skip(self))]
    async fn commit(&mut self) -> Result<(), ExternalServiceError> {
        if self.queue.is_empty() {
            return Ok(());
        }

        let commands = std::mem::take(&mut self.queue);
        debug!(commands = commands.len(), "Sending batch");
        self.request(commands).await
    }
}

/// Prints what would be created instead of calling a service
#[derive(Default)]
pub struct Preview {
    projects: Vec<Project>,
    /// Indentation of everything created so far
    depths: HashMap<String, usize>,
    pending: usize,
    next_id: usize,
}

impl Preview {
    fn new_id(&mut self, depth: usize) -> String {
        self.next_id += 1;
        let id = format!("preview-{}", self.next_id);
        self.depths.insert(id.clone(), depth);
        self.pending += 1;

        id
    }

    fn depth(&self, id: Option<&str>) -> usize {
        id.and_then(|id| self.depths.get(id))
            .map_or(0, |depth| depth + 1)
    }
}

#[async_trait]
impl TaskList for Preview {
    async fn sync(&mut self) -> Result<(), ExternalServiceError> {
        Ok(())
    }

    fn projects(&self) -> &[Project] {
        &self.projects
    }

    fn create_project(&mut self, name: &str, parent_id: Option<&str>) -> String {
        let depth = self.depth(parent_id);
        let id = self.new_id(depth);
        println!("{:indent$}# {name}", "", indent = depth * 2);
        self.projects.push(Project {
            id: id.clone(),
            name: name.to_owned(),
            parent_id: parent_id.map(ToOwned::to_owned),
            is_deleted: false,
        });

        id
    }

    fn create_task(&mut self, task: NewTask) -> String {
        let parent = task.parent_id.as_deref().unwrap_or(&task.project_id);
        let depth = self.depth(Some(parent));
        let id = self.new_id(depth);
        match task.due {
            Some(due) => println!("{:indent$}- {} (due {due})", "", task.content, indent = depth * 2),
            None => println!("{:indent$}- {}", "", task.content, indent = depth * 2),
        }

        id
    }

    fn delete_project(&mut self, id: &str) {
        self.projects.retain(|project| project.id != id);
    }

    async fn commit(&mut self) -> Result<(), ExternalServiceError> {
        debug!(operations = self.pending, "Preview batch");
        self.pending = 0;

        Ok(())
    }
}
