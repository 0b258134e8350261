use reqwest::{Client, Response, StatusCode};
use std::time::Duration;

use crate::error::{Result, VidsubError};

/// HTTP client shared by a backend's requests
pub fn build_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .user_agent(concat!("vidsub/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(VidsubError::Http)
}

/// Rate limiting and server errors are worth retrying
pub fn is_transient_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Turn a non-success response into a translation error carrying the body
pub async fn ensure_success(backend: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = format!("HTTP {}: {}", status, body.trim());
    if is_transient_status(status) {
        Err(VidsubError::transient(backend, message))
    } else {
        Err(VidsubError::translation(backend, message))
    }
}

/// Fetch a required credential or report the backend as not configured
pub fn require<'a>(backend: &str, what: &str, value: &'a Option<String>) -> Result<&'a str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| VidsubError::MissingCredentials {
            backend: backend.to_string(),
            what: what.to_string(),
        })
}
