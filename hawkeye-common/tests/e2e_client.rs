//! Endpoint wrappers against a local mock of the Hawkeye API.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use futures_util::stream;
use hawkeye_common::poll::CompletionPoller;
use hawkeye_common::projects::{create_project, find_project_by_name, get_project, list_projects};
use hawkeye_common::sessions::{
    create_session, get_session, list_sessions, poll_for_completion, send_prompt, stream_prompt,
    CycleStatus,
};
use hawkeye_common::sse::streaming::{DecodeOptions, NoopObserver};
use hawkeye_common::{connect, ApiError, Credentials, HawkeyeClient, HawkeyeConfig, PollError};
use serde_json::{json, Value};
use std::io;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

const TOKEN: &str = "tok-1";

async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map_or(false, |v| v == format!("Bearer {}", TOKEN))
}

fn config(api_url: &str, credentials: Credentials) -> HawkeyeConfig {
    HawkeyeConfig {
        api_url: api_url.to_string(),
        credentials,
        organization_uuid: "org-1".into(),
        stream_response: false,
        poll_max_attempts: 5,
        poll_interval: Duration::from_millis(10),
        project: None,
    }
}

// ============================================================================
// Authentication and projects
// ============================================================================

async fn login(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    assert_eq!(headers.get("x-client-identifier").unwrap(), "web-app");
    if body["password"] == "right" {
        Json(json!({ "access_token": TOKEN })).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, "bad credentials").into_response()
    }
}

async fn projects(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    assert!(headers.get("content-type").is_none(), "GET carries no body");
    Json(json!({
        "specs": [
            { "uuid": "p-1", "name": "prod", "description": null },
            { "uuid": "p-2", "name": "staging", "create_time": "04/04/25 02:22:51" },
        ]
    }))
    .into_response()
}

fn account_router() -> Router {
    Router::new()
        .route("/api/v1/user/login", post(login))
        .route("/api/v1/project", get(projects))
}

#[tokio::test]
async fn connect_logs_in_and_lists_projects() {
    let base = serve(account_router()).await;
    let client = connect(&config(
        &base,
        Credentials::Password {
            email: "ops@example.com".into(),
            password: "right".into(),
        },
    ))
    .await
    .expect("login should succeed");
    assert_eq!(client.access_token(), Some(TOKEN));

    let projects = list_projects(&client).await.unwrap();
    assert_eq!(projects.len(), 2);
    assert_eq!(projects[1].create_time.as_deref(), Some("04/04/25 02:22:51"));

    let staging = find_project_by_name(&client, "staging").await.unwrap();
    assert_eq!(staging.map(|p| p.uuid).as_deref(), Some("p-2"));
    assert!(find_project_by_name(&client, "nope").await.unwrap().is_none());
}

#[tokio::test]
async fn wrong_password_is_http_error() {
    let base = serve(account_router()).await;
    let mut client = HawkeyeClient::new(&base).unwrap();
    let err = client.authenticate("ops@example.com", "wrong").await.unwrap_err();
    match err {
        ApiError::Http { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "bad credentials");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(client.access_token(), None);
}

#[tokio::test]
async fn token_credentials_skip_login() {
    let base = serve(account_router()).await;
    let client = connect(&config(&base, Credentials::Token(TOKEN.into()))).await.unwrap();
    assert_eq!(list_projects(&client).await.unwrap().len(), 2);

    let anonymous = HawkeyeClient::new(&base).unwrap();
    assert!(matches!(
        list_projects(&anonymous).await,
        Err(ApiError::Http { status: 401, .. })
    ));
}

// ============================================================================
// Sessions and prompts
// ============================================================================

async fn streamed_prompt(Json(body): Json<Value>) -> Response {
    assert_eq!(body["action"], "ACTION_NEXT");
    assert_eq!(body["messages"][0]["content"]["content_type"], "CONTENT_TYPE_CHAT_PROMPT");
    let session = body["session_uuid"].as_str().unwrap_or_default().to_string();

    let frames = vec![
        format!(
            "data: {{\"session_uuid\":\"{}\",\"message\":{{\"content\":{{\"content_type\":\"CONTENT_TYPE_PROGRESS_STATUS\",\"parts\":[\"Thinking\"]}}}}}}\n\n",
            session
        ),
        format!("data: {{\"session_uuid\":\"{}\",\"message\":{{\"id\":\"cyc", session),
        "le-5\",\"status\":\"STATUS_DONE\"}}\n\n".to_string(),
    ];
    let chunks = frames.into_iter().map(|f| Ok::<_, io::Error>(Bytes::from(f)));
    Body::from_stream(stream::iter(chunks)).into_response()
}

#[tokio::test]
async fn stream_prompt_returns_cycle_id() {
    let router = Router::new().route("/api/v1/inference/session", post(streamed_prompt));
    let client = HawkeyeClient::new(&serve(router).await).unwrap().with_token(TOKEN);

    let result = stream_prompt(
        &client,
        "sess-1",
        "p-1",
        "Why is checkout slow?",
        NoopObserver,
        &DecodeOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(result.session_uuid, "sess-1");
    assert_eq!(result.message_id.as_deref(), Some("cycle-5"));
}

#[tokio::test]
async fn send_prompt_reads_message_id() {
    let router = Router::new().route(
        "/api/v1/inference/session",
        post(|| async { Json(json!({ "message": { "id": "cycle-9" } })) }),
    );
    let client = HawkeyeClient::new(&serve(router).await).unwrap().with_token(TOKEN);

    let result = send_prompt(&client, "sess-1", "p-1", "hello").await.unwrap();
    assert_eq!(result.message_id.as_deref(), Some("cycle-9"));
    assert!(result.response.contains("cycle-9"));
}

#[tokio::test]
async fn create_session_requires_uuid() {
    let router = Router::new()
        .route(
            "/api/v1/inference/new_session",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["organization_uuid"], "org-1");
                assert!(body["filter_chain"].is_null());
                Json(json!({ "session_uuid": "" }))
            }),
        )
        .route(
            "/api/v1/inference/session/list",
            post(|| async {
                Json(json!({ "sessions": [{ "session_uuid": "s-1", "prompt_cycle_ids": null }] }))
            }),
        );
    let client = HawkeyeClient::new(&serve(router).await).unwrap().with_token(TOKEN);

    let err = create_session(&client, "p-1", "org-1").await.unwrap_err();
    assert!(matches!(err, ApiError::MissingSession));

    let sessions = list_sessions(&client, "p-1", "org-1").await.unwrap();
    assert_eq!(sessions.len(), 1);
    assert!(sessions[0].prompt_cycle_ids.is_empty());
}

#[tokio::test]
async fn single_resources_are_unwrapped() {
    let router = Router::new()
        .route(
            "/api/v1/project/:uuid",
            get(|Path(uuid): Path<String>| async move {
                Json(json!({ "project": { "uuid": uuid, "name": "prod", "sync_state": "SYNCED" } }))
            }),
        )
        .route(
            "/api/v1/inference/session/:uuid",
            get(|Path(uuid): Path<String>| async move {
                Json(json!({ "session": { "session_uuid": uuid, "name": "Checkout latency" } }))
            }),
        );
    let client = HawkeyeClient::new(&serve(router).await).unwrap().with_token(TOKEN);

    let project = get_project(&client, "p-1").await.unwrap().expect("project present");
    assert_eq!(project.uuid, "p-1");
    assert_eq!(project.sync_state.as_deref(), Some("SYNCED"));

    let session = get_session(&client, "sess-3").await.unwrap().expect("session present");
    assert_eq!(session["session_uuid"], "sess-3");
}

#[tokio::test]
async fn create_project_wraps_request_id() {
    let router = Router::new().route(
        "/api/v1/project",
        post(|Json(body): Json<Value>| async move {
            assert!(body["request"]["request_id"].as_str().is_some_and(|id| !id.is_empty()));
            let mut project = body["project"].clone();
            project["uuid"] = json!("p-new");
            Json(json!({ "project": project }))
        }),
    );
    let client = HawkeyeClient::new(&serve(router).await).unwrap().with_token(TOKEN);

    let created = create_project(&client, &json!({ "name": "checkout", "description": "EKS" }))
        .await
        .unwrap()
        .expect("project echoed back");
    assert_eq!(created.uuid, "p-new");
    assert_eq!(created.description.as_deref(), Some("EKS"));
}

// ============================================================================
// Completion polling
// ============================================================================

async fn inspect(State(calls): State<Arc<AtomicU32>>) -> Json<Value> {
    let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
    let status = if n >= 3 {
        "PROMPT_STATUS_COMPLETED"
    } else {
        "PROMPT_STATUS_IN_PROGRESS"
    };
    Json(json!({
        "session_info": { "session_uuid": "sess-1" },
        "prompt_cycle": [{ "id": "cycle-1", "status": status, "final_answer": "All good" }],
    }))
}

#[tokio::test]
async fn poll_for_completion_waits_for_terminal_status() {
    let calls = Arc::new(AtomicU32::new(0));
    let router = Router::new()
        .route("/api/v1/inference/session/inspect", post(inspect))
        .with_state(calls.clone());
    let client = HawkeyeClient::new(&serve(router).await).unwrap().with_token(TOKEN);

    let poller = CompletionPoller::new(5, Duration::from_millis(10));
    let cycle = poll_for_completion(&client, "sess-1", "cycle-1", "p-1", "org-1", &poller)
        .await
        .unwrap();

    assert_eq!(cycle.status, Some(CycleStatus::Completed));
    assert_eq!(cycle.final_answer.as_deref(), Some("All good"));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn poll_for_completion_surfaces_budget_exhaustion() {
    let calls = Arc::new(AtomicU32::new(0));
    let router = Router::new()
        .route("/api/v1/inference/session/inspect", post(inspect))
        .with_state(calls.clone());
    let client = HawkeyeClient::new(&serve(router).await).unwrap().with_token(TOKEN);

    let poller = CompletionPoller::new(2, Duration::from_millis(10));
    let err = poll_for_completion(&client, "sess-1", "cycle-1", "p-1", "org-1", &poller)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ApiError::Poll(PollError::BudgetExhausted { attempts: 2 })
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
