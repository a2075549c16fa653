//! Shared HTTP plumbing for the source adapters.

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::trace;

use crate::config::ConfigError;

use super::SourceError;

/// Build the client shared by every source.
///
/// `timeout` is a backstop; the executor enforces the per-source deadline.
pub fn build_client(user_agent: &str, timeout: Duration) -> Result<Client, ConfigError> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()
        .map_err(|e| ConfigError::ValidationError(format!("Failed to create HTTP client: {}", e)))
}

/// GET a URL and return the body of a successful response.
pub(crate) async fn get_text(client: &Client, url: &str) -> Result<String, SourceError> {
    trace!(url, "GET");

    let response = client.get(url).send().await.map_err(map_request_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::HttpStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let body = response.text().await.map_err(map_request_error)?;
    trace!(url, bytes = body.len(), "response received");
    Ok(body)
}

/// GET a URL and decode its JSON body.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
) -> Result<T, SourceError> {
    let body = get_text(client, url).await?;
    serde_json::from_str(&body)
        .map_err(|e| SourceError::Parse(format!("Failed to parse response: {}", e)))
}

fn map_request_error(e: reqwest::Error) -> SourceError {
    if e.is_timeout() {
        SourceError::Timeout
    } else if e.is_decode() {
        SourceError::Parse(e.to_string())
    } else {
        SourceError::Network(e.to_string())
    }
}
