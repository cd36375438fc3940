//! HTTP client the form uses to reach the submission gateway.
//!
//! Responses are reduced to [`ClientError`] variants so the form can tell a
//! rejected application apart from a gateway it could not reach.

use crate::application::{Application, ErrorResponse, SubmitResponse};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Default request timeout applied to submissions.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(45);
/// Maximum number of error body characters surfaced to the UI.
const MAX_ERROR_CHARS: usize = 200;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Timeout: {0}")]
    Timeout(String),
    #[error("Request failed ({status}): {message}")]
    Http { status: u16, message: String },
    #[error("Response error: {0}")]
    Parse(String),
}

impl ClientError {
    /// True when the gateway was never reached.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout(_))
    }
}

#[derive(Clone, Debug)]
pub struct GatewayClient {
    client: Client,
    submit_url: Url,
}

impl GatewayClient {
    /// # Errors
    /// Returns `ClientError::Config` if the base URL is invalid or the HTTP
    /// client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// # Errors
    /// See [`GatewayClient::new`].
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let submit_url = build_url(base_url, "/submit")?;
        let client = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|err| ClientError::Config(format!("Failed to build client: {err}")))?;

        Ok(Self { client, submit_url })
    }

    #[must_use]
    pub fn submit_url(&self) -> &Url {
        &self.submit_url
    }

    /// Post an application and decode the gateway's answer.
    ///
    /// # Errors
    /// `Network`/`Timeout` when the gateway cannot be reached, `Http` for a
    /// non-2xx answer (carrying the gateway's `error` text) and `Parse` when a
    /// success body cannot be decoded.
    #[instrument(skip_all, fields(url = %self.submit_url))]
    pub async fn submit(&self, application: &Application) -> Result<SubmitResponse, ClientError> {
        let response = self
            .client
            .post(self.submit_url.clone())
            .json(application)
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        debug!("Gateway answered {}", status);

        if status.is_success() {
            return response
                .json::<SubmitResponse>()
                .await
                .map_err(|err| ClientError::Parse(format!("Failed to decode response: {err}")));
        }

        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Http {
            status: status.as_u16(),
            message: error_message(&body),
        })
    }
}

/// Joins the gateway base URL and a path.
fn build_url(base_url: &str, path: &str) -> Result<Url, ClientError> {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim().trim_start_matches('/');
    Url::parse(&format!("{base}/{path}"))
        .map_err(|err| ClientError::Config(format!("Invalid gateway URL '{base_url}': {err}")))
}

/// Maps transport errors into user-facing variants with timeout detection.
fn map_request_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        ClientError::Timeout("Request timed out. Please try again.".to_string())
    } else {
        ClientError::Network(format!("Unable to reach the server: {err}"))
    }
}

/// Prefer the gateway's `{ "error": ... }` text; fall back to a trimmed body.
fn error_message(body: &str) -> String {
    if let Ok(ErrorResponse { error }) = serde_json::from_str::<ErrorResponse>(body) {
        return error;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Request failed".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}
