use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::client::HawkeyeClient;
use crate::errors::ApiError;
use crate::lenient;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub create_time: Option<String>,
    #[serde(default)]
    pub update_time: Option<String>,
    #[serde(default)]
    pub project_state: Option<String>,
    #[serde(default)]
    pub sync_state: Option<String>,
    #[serde(default)]
    pub training_state: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProjectList {
    #[serde(default, deserialize_with = "lenient::vec_of")]
    specs: Vec<Project>,
}

#[derive(Debug, Deserialize)]
struct ProjectEnvelope {
    project: Option<Project>,
}

/// All projects visible to the authenticated user.
pub async fn list_projects(client: &HawkeyeClient) -> Result<Vec<Project>, ApiError> {
    let list: ProjectList = client.request(Method::GET, "/api/v1/project", None).await?;
    Ok(list.specs)
}

pub async fn get_project(client: &HawkeyeClient, project_uuid: &str) -> Result<Option<Project>, ApiError> {
    let endpoint = format!("/api/v1/project/{}", project_uuid);
    let envelope: ProjectEnvelope = client.request(Method::GET, &endpoint, None).await?;
    Ok(envelope.project)
}

pub async fn create_project(client: &HawkeyeClient, project: &Value) -> Result<Option<Project>, ApiError> {
    let body = json!({
        "project": project,
        "request": { "request_id": HawkeyeClient::generate_request_id() },
    });
    let envelope: ProjectEnvelope = client.request(Method::POST, "/api/v1/project", Some(&body)).await?;
    Ok(envelope.project)
}

/// First project whose name matches exactly.
pub async fn find_project_by_name(client: &HawkeyeClient, name: &str) -> Result<Option<Project>, ApiError> {
    let projects = list_projects(client).await?;
    let found = projects.into_iter().find(|p| p.name == name);
    match &found {
        Some(project) => tracing::info!(name, uuid = %project.uuid, "project resolved"),
        None => tracing::warn!(name, "no project with this name"),
    }
    Ok(found)
}
