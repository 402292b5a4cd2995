use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::ConfigError;
use crate::poll::{CompletionPoller, DEFAULT_INTERVAL, DEFAULT_MAX_ATTEMPTS};

pub const DEFAULT_ORGANIZATION_UUID: &str = "ORGANIZATION_NAME_ROOT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    Password { email: String, password: String },
    Token(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HawkeyeConfig {
    pub api_url: String,
    pub credentials: Credentials,
    pub organization_uuid: String,
    pub stream_response: bool,
    pub poll_max_attempts: u32,
    pub poll_interval: Duration,
    /// Project name used by the alert webhook.
    pub project: Option<String>,
}

impl HawkeyeConfig {
    /// Load `.env` (if present) and read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let saved_token = load_saved_token();
        Self::from_lookup(|key| std::env::var(key).ok(), saved_token)
    }

    /// Build from an arbitrary variable lookup. `saved_token` is used when
    /// neither `HAWKEYE_TOKEN` nor email/password are set.
    pub fn from_lookup<F>(lookup: F, saved_token: Option<String>) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        // HAWKEYE_URL and HAWKEYE_USER are the names older webhook deployments use.
        let api_url = get("HAWKEYE_API_URL")
            .or_else(|| get("HAWKEYE_URL"))
            .ok_or(ConfigError::Missing("HAWKEYE_API_URL"))?;
        let email = get("HAWKEYE_EMAIL").or_else(|| get("HAWKEYE_USER"));

        let credentials = match (email, get("HAWKEYE_PASSWORD")) {
            (Some(email), Some(password)) => Credentials::Password { email, password },
            (email, _) => match get("HAWKEYE_TOKEN").or(saved_token) {
                Some(token) => Credentials::Token(token),
                None if email.is_none() => return Err(ConfigError::Missing("HAWKEYE_EMAIL")),
                None => return Err(ConfigError::Missing("HAWKEYE_PASSWORD")),
            },
        };

        let stream_response = match get("STREAM_RESPONSE") {
            Some(v) => parse_bool("STREAM_RESPONSE", &v)?,
            None => false,
        };

        let poll_max_attempts = match get("HAWKEYE_POLL_MAX_ATTEMPTS") {
            Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "HAWKEYE_POLL_MAX_ATTEMPTS",
                value: v,
            })?,
            None => DEFAULT_MAX_ATTEMPTS,
        };

        let poll_interval = match get("HAWKEYE_POLL_INTERVAL_MS") {
            Some(v) => Duration::from_millis(v.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "HAWKEYE_POLL_INTERVAL_MS",
                value: v,
            })?),
            None => DEFAULT_INTERVAL,
        };

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            credentials,
            organization_uuid: get("ORGANIZATION_UUID")
                .unwrap_or_else(|| DEFAULT_ORGANIZATION_UUID.to_string()),
            stream_response,
            poll_max_attempts,
            poll_interval,
            project: get("HAWKEYE_PROJECT"),
        })
    }

    pub fn poller(&self) -> CompletionPoller {
        CompletionPoller::new(self.poll_max_attempts, self.poll_interval)
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
        }),
    }
}

pub fn credentials_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".hawkeye/credentials.json"))
}

fn load_saved_token() -> Option<String> {
    read_token_file(&credentials_path()?)
}

/// Read `{"token": "..."}` from a credentials file.
pub fn read_token_file(path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    let creds: serde_json::Value = serde_json::from_str(&content).ok()?;
    creds
        .get("token")
        .and_then(|t| t.as_str())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
}
