//! Shared client code for the Hawkeye inference-session scripts.

pub mod alert;
pub mod client;
pub mod config;
pub mod display;
pub mod errors;
pub mod events;
mod lenient;
pub mod logging;
pub mod poll;
pub mod projects;
pub mod sessions;
pub mod sse;

pub use client::HawkeyeClient;
pub use config::{Credentials, HawkeyeConfig};
pub use errors::{ApiError, ConfigError, PollError, StreamError};
pub use poll::CompletionPoller;
pub use sse::streaming::StreamResult;

/// Build a client from config and log in when needed.
pub async fn connect(config: &HawkeyeConfig) -> Result<HawkeyeClient, ApiError> {
    let mut client = HawkeyeClient::new(&config.api_url)?;
    match &config.credentials {
        Credentials::Token(token) => client.set_access_token(token.clone()),
        Credentials::Password { email, password } => {
            events::emit_authenticating();
            client.authenticate(email, password).await?;
        }
    }
    Ok(client)
}
