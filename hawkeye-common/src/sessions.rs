use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::client::HawkeyeClient;
use crate::errors::ApiError;
use crate::lenient;
use crate::poll::{CompletionPoller, DelayPolicy};
use crate::sse::streaming::{decode_stream, DecodeOptions, StreamObserver, StreamResult};

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    #[serde(default, deserialize_with = "lenient::text")]
    pub session_uuid: String,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub create_time: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub last_update: Option<String>,
    #[serde(default, deserialize_with = "lenient::texts")]
    pub prompt_cycle_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewSession {
    pub session_uuid: String,
    pub project_uuid: String,
}

pub const STATUS_COMPLETED: &str = "PROMPT_STATUS_COMPLETED";
pub const STATUS_ERROR: &str = "PROMPT_STATUS_ERROR";

/// Prompt cycle status. Non-terminal values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CycleStatus {
    Completed,
    Error,
    Other(String),
}

impl CycleStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Completed => STATUS_COMPLETED,
            Self::Error => STATUS_ERROR,
            Self::Other(raw) => raw,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }
}

impl From<String> for CycleStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            STATUS_COMPLETED => Self::Completed,
            STATUS_ERROR => Self::Error,
            _ => Self::Other(raw),
        }
    }
}

impl From<CycleStatus> for String {
    fn from(status: CycleStatus) -> Self {
        match status {
            CycleStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleContent {
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub content_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::texts")]
    pub parts: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleMessage {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub content: Option<CycleContent>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleRequest {
    #[serde(default, deserialize_with = "lenient::vec_of")]
    pub messages: Vec<CycleMessage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThoughtStep {
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub investigation: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleSource {
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub title: Option<String>,
}

/// One question/answer unit of a session. Unlisted fields are kept in `extra`.
///
/// Only `id` and `status` decide completion; every other field degrades to
/// its default when the backend sends an unexpected shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptCycle {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub status: Option<CycleStatus>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub request: Option<CycleRequest>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub final_answer: Option<String>,
    #[serde(default, deserialize_with = "lenient::vec_of")]
    pub chain_of_thoughts: Vec<ThoughtStep>,
    #[serde(default, deserialize_with = "lenient::vec_of")]
    pub sources: Vec<CycleSource>,
    #[serde(default, deserialize_with = "lenient::texts")]
    pub follow_up_suggestions: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PromptCycle {
    /// First part of the first request message, if any.
    pub fn question(&self) -> Option<&str> {
        self.request
            .as_ref()?
            .messages
            .first()?
            .content
            .as_ref()?
            .parts
            .first()
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionDetails {
    pub session_info: Value,
    pub prompt_cycles: Vec<PromptCycle>,
}

#[derive(Debug, Deserialize)]
struct InspectResponse {
    #[serde(default)]
    session_info: Option<Value>,
    #[serde(default, deserialize_with = "lenient::vec_of")]
    prompt_cycle: Vec<PromptCycle>,
}

#[derive(Debug, Deserialize)]
struct SessionList {
    #[serde(default, deserialize_with = "lenient::vec_of")]
    sessions: Vec<SessionSummary>,
}

#[derive(Debug, Deserialize)]
struct SessionEnvelope {
    session: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct CreatedSession {
    session_uuid: Option<String>,
}

// ============================================================================
// Endpoints
// ============================================================================

pub async fn list_sessions(
    client: &HawkeyeClient,
    project_uuid: &str,
    organization_uuid: &str,
) -> Result<Vec<SessionSummary>, ApiError> {
    let body = json!({
        "request": { "id": HawkeyeClient::generate_request_id() },
        "project_uuid": project_uuid,
        "organization_uuid": organization_uuid,
    });
    let list: SessionList = client
        .request(Method::POST, "/api/v1/inference/session/list", Some(&body))
        .await?;
    Ok(list.sessions)
}

pub async fn get_session(client: &HawkeyeClient, session_uuid: &str) -> Result<Option<Value>, ApiError> {
    let endpoint = format!("/api/v1/inference/session/{}", session_uuid);
    let envelope: SessionEnvelope = client.request(Method::GET, &endpoint, None).await?;
    Ok(envelope.session)
}

pub async fn create_session(
    client: &HawkeyeClient,
    project_uuid: &str,
    organization_uuid: &str,
) -> Result<NewSession, ApiError> {
    let body = json!({
        "filter_chain": null,
        "gendb_spec": { "uuid": HawkeyeClient::generate_request_id() },
        "organization_uuid": organization_uuid,
        "project_uuid": project_uuid,
        "request": { "request_id": HawkeyeClient::generate_request_id() },
    });
    let created: CreatedSession = client
        .request(Method::POST, "/api/v1/inference/new_session", Some(&body))
        .await?;

    let session_uuid = created
        .session_uuid
        .filter(|s| !s.is_empty())
        .ok_or(ApiError::MissingSession)?;
    tracing::info!(%session_uuid, "session created");

    Ok(NewSession {
        session_uuid,
        project_uuid: project_uuid.to_string(),
    })
}

/// Session info plus every prompt cycle recorded so far.
pub async fn inspect_session(
    client: &HawkeyeClient,
    session_uuid: &str,
    project_uuid: &str,
    organization_uuid: &str,
) -> Result<SessionDetails, ApiError> {
    let body = json!({
        "request": { "id": HawkeyeClient::generate_request_id() },
        "session_uuid": session_uuid,
        "project_uuid": project_uuid,
        "organization_uuid": organization_uuid,
    });
    let inspected: InspectResponse = client
        .request(Method::POST, "/api/v1/inference/session/inspect", Some(&body))
        .await?;

    Ok(SessionDetails {
        session_info: inspected.session_info.unwrap_or_else(|| json!({})),
        prompt_cycles: inspected.prompt_cycle,
    })
}

pub fn prompt_payload(session_uuid: &str, project_uuid: &str, prompt: &str) -> Value {
    json!({
        "action": "ACTION_NEXT",
        "session_uuid": session_uuid,
        "project_uuid": project_uuid,
        "messages": [{
            "content": {
                "content_type": "CONTENT_TYPE_CHAT_PROMPT",
                "parts": [prompt],
            }
        }],
        "request": { "request_id": HawkeyeClient::generate_request_id() },
        "prompt_options": {
            "disable_replay": false,
            "source_focus_categories": [],
        },
    })
}

/// Send a prompt and wait for the full JSON answer.
pub async fn send_prompt(
    client: &HawkeyeClient,
    session_uuid: &str,
    project_uuid: &str,
    prompt: &str,
) -> Result<StreamResult, ApiError> {
    let endpoint = "/api/v1/inference/session";
    let payload = prompt_payload(session_uuid, project_uuid, prompt);
    let response = client.send(Method::POST, endpoint, Some(&payload)).await?;
    let text = response.text().await?;
    let body: Value = serde_json::from_str(&text).map_err(|e| ApiError::decode(endpoint, e))?;

    Ok(StreamResult {
        session_uuid: session_uuid.to_string(),
        message_id: body
            .pointer("/message/id")
            .and_then(|id| id.as_str())
            .map(String::from),
        response: text,
    })
}

/// Send a prompt and decode the streamed answer.
pub async fn stream_prompt<O: StreamObserver>(
    client: &HawkeyeClient,
    session_uuid: &str,
    project_uuid: &str,
    prompt: &str,
    observer: O,
    options: &DecodeOptions,
) -> Result<StreamResult, ApiError> {
    let payload = prompt_payload(session_uuid, project_uuid, prompt);
    let response = client
        .send(Method::POST, "/api/v1/inference/session", Some(&payload))
        .await?;

    let result = decode_stream(response.bytes_stream(), session_uuid, observer, options).await?;
    Ok(result)
}

/// Poll the session until the cycle `prompt_cycle_id` is terminal.
pub async fn poll_for_completion<P: DelayPolicy>(
    client: &HawkeyeClient,
    session_uuid: &str,
    prompt_cycle_id: &str,
    project_uuid: &str,
    organization_uuid: &str,
    poller: &CompletionPoller<P>,
) -> Result<PromptCycle, ApiError> {
    let cycle = poller
        .poll(prompt_cycle_id, move || async move {
            inspect_session(client, session_uuid, project_uuid, organization_uuid)
                .await
                .map(|details| details.prompt_cycles)
        })
        .await?;
    Ok(cycle)
}
