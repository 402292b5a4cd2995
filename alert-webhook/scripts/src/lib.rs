//! Alertmanager webhook that turns firing alerts into Hawkeye investigations.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use hawkeye_common::alert::AlertPayload;
use hawkeye_common::projects::find_project_by_name;
use hawkeye_common::sessions::{create_session, stream_prompt};
use hawkeye_common::sse::streaming::{DecodeOptions, NoopObserver};
use hawkeye_common::HawkeyeConfig;
use serde_json::{json, Value};
use std::sync::Arc;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Clone)]
pub struct AppState {
    config: Arc<HawkeyeConfig>,
    project: Arc<str>,
}

impl AppState {
    pub fn new(config: HawkeyeConfig, project: &str) -> Self {
        Self {
            config: Arc::new(config),
            project: Arc::from(project),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/alert", post(alert_receiver))
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
}

async fn alert_receiver(
    State(state): State<AppState>,
    Json(payload): Json<AlertPayload>,
) -> (StatusCode, Json<Value>) {
    let prompts = payload.firing_prompts();
    tracing::info!(
        receiver = %payload.receiver,
        alerts = payload.alerts.len(),
        firing = prompts.len(),
        "alert payload received"
    );

    for prompt in &prompts {
        let state = state.clone();
        let prompt = prompt.clone();
        tokio::spawn(async move {
            if let Err(e) = investigate(&state, &prompt).await {
                tracing::error!(error = %e, %prompt, "send prompt failed");
            }
        });
    }

    (StatusCode::ACCEPTED, Json(json!({ "dispatched": prompts.len() })))
}

/// Log in, open a fresh session in the configured project and send `prompt`.
async fn investigate(state: &AppState, prompt: &str) -> Result<(), BoxError> {
    let client = hawkeye_common::connect(&state.config).await?;
    let project = find_project_by_name(&client, &state.project)
        .await?
        .ok_or_else(|| format!("unable to get UUID for {} project", state.project))?;
    let session = create_session(&client, &project.uuid, &state.config.organization_uuid).await?;

    let result = stream_prompt(
        &client,
        &session.session_uuid,
        &project.uuid,
        prompt,
        NoopObserver,
        &DecodeOptions::default(),
    )
    .await?;

    tracing::info!(
        session_uuid = %result.session_uuid,
        message_id = ?result.message_id,
        "prompt sent successfully"
    );
    Ok(())
}
