use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A project known by the to-do list
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub is_deleted: bool,
}

/// A task waiting to be created
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewTask {
    pub content: String,
    pub project_id: String,
    /// Task this one is a sub-task of
    pub parent_id: Option<String>,
    /// Due date, as understood by the service (`YYYY-MM-DD`)
    pub due: Option<String>,
}

/// One queued write of the Sync API
#[derive(Clone, Debug, Serialize)]
pub struct Command {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub uuid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_id: Option<String>,
    pub args: serde_json::Value,
}

/// Answer of the Sync API, only the parts we read
#[derive(Debug, Default, Deserialize)]
pub struct SyncResponse {
    pub sync_token: Option<String>,
    #[serde(default)]
    pub full_sync: bool,
    #[serde(default)]
    pub projects: Vec<Project>,
    /// Command uuid => `"ok"` or an error object
    #[serde(default)]
    pub sync_status: HashMap<String, serde_json::Value>,
    /// Temporary id => real id
    #[serde(default)]
    pub temp_id_mapping: HashMap<String, String>,
}
