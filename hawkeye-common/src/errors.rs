//! Error types shared by the client, the stream decoder and the poller.

use std::time::Duration;

/// Boxed transport cause carried by [`StreamError::Transport`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Fatal failures of a streamed prompt response.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The connection or body read failed before a terminal envelope arrived.
    #[error("stream transport error: {0}")]
    Transport(#[source] BoxError),
    /// No bytes arrived within the idle window.
    #[error("stream idle timeout ({}s)", .0.as_secs())]
    IdleTimeout(Duration),
    /// The caller cancelled the read.
    #[error("stream cancelled")]
    Cancelled,
}

/// Fatal outcomes of a completion poll.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PollError {
    /// The target cycle reached an error status.
    #[error("prompt cycle {cycle_id} failed with status: {status}")]
    TargetFailed { cycle_id: String, status: String },
    /// No terminal status was observed within the attempt budget.
    #[error("prompt cycle did not complete after {attempts} polling attempts")]
    BudgetExhausted { attempts: u32 },
    /// The caller cancelled the poll.
    #[error("poll cancelled")]
    Cancelled,
}

/// Invalid or missing configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Errors returned by [`crate::client::HawkeyeClient`] and the endpoint wrappers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The API answered with a non-success status.
    #[error("API error: {status} - {body}")]
    Http { status: u16, body: String },
    /// The request could not be sent or the body could not be read.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The response body was not the expected JSON shape.
    #[error("invalid response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("authentication failed: no access token in response")]
    MissingToken,
    #[error("failed to create session: no session UUID returned")]
    MissingSession,
    #[error(transparent)]
    Stream(#[from] StreamError),
    #[error(transparent)]
    Poll(#[from] PollError),
}

impl ApiError {
    pub(crate) fn decode(endpoint: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            endpoint: endpoint.into(),
            source,
        }
    }
}
