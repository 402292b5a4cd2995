use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;

use crate::errors::ApiError;

const CLIENT_IDENTIFIER: &str = "web-app";

/// Thin wrapper around the Hawkeye REST API.
#[derive(Debug, Clone)]
pub struct HawkeyeClient {
    http: Client,
    base_url: String,
    access_token: Option<String>,
}

impl HawkeyeClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        // No overall timeout: streamed prompt responses are guarded by an idle timeout instead.
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn set_access_token(&mut self, token: impl Into<String>) {
        self.access_token = Some(token.into());
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    pub fn generate_request_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// Default headers. `Content-Type` is only sent with a body.
    pub fn headers(&self, with_body: bool) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert("X-Client-Identifier", HeaderValue::from_static(CLIENT_IDENTIFIER));
        if with_body {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        if let Some(token) = &self.access_token {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
                headers.insert(AUTHORIZATION, value);
            }
        }
        headers
    }

    /// Log in and keep the access token for later requests.
    pub async fn authenticate(&mut self, email: &str, password: &str) -> Result<String, ApiError> {
        let body: Value = self
            .request(Method::POST, "/api/v1/user/login", Some(&json!({
                "email": email,
                "password": password,
            })))
            .await?;

        let token = body
            .get("access_token")
            .and_then(|t| t.as_str())
            .filter(|t| !t.is_empty())
            .ok_or(ApiError::MissingToken)?
            .to_string();

        tracing::info!("login successful, access token received");
        self.access_token = Some(token.clone());
        Ok(token)
    }

    /// Send a request and decode the JSON response body.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<T, ApiError> {
        let response = self.send(method, endpoint, body).await?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| ApiError::decode(endpoint, e))
    }

    /// Send a request and return the raw response once its status is a success.
    pub async fn send(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<Response, ApiError> {
        // GET carries no body even when one is supplied.
        let body = body.filter(|_| method != Method::GET);
        tracing::debug!(%method, endpoint, "hawkeye request");

        let mut builder = self
            .http
            .request(method, self.url(endpoint))
            .headers(self.headers(body.is_some()));
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status, endpoint, %body, "request failed");
            return Err(ApiError::Http { status, body });
        }
        Ok(response)
    }
}
