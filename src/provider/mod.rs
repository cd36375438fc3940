//! Client for the external identity-verification provider.
//!
//! The provider receives the application as JSON with HTTP Basic credentials
//! and answers `201 Created` with an evaluation whose `summary.outcome` is one
//! of the three outcome labels. Every other answer is a [`ProviderError`].
//! Calls are never retried.

use crate::application::{Application, Outcome};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::{future::Future, pin::Pin, time::Duration};
use tracing::{debug, error, info, instrument};
use url::Url;

pub const DEFAULT_PROVIDER_URL: &str = "https://sandbox.alloy.co/v1/evaluations/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Decision returned by the provider for one application.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Evaluation {
    pub outcome: Outcome,
    pub evaluation_token: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("unable to connect to verification provider: {0}")]
    Connect(String),
    #[error("verification provider timed out")]
    Timeout,
    #[error("verification provider answered with status {0}")]
    Status(StatusCode),
    #[error("malformed verification provider response: {0}")]
    Malformed(String),
    #[error("verification provider request failed: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else if err.is_decode() {
            Self::Malformed(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Anything able to turn an application into an [`Evaluation`].
pub trait VerificationProvider: Send + Sync {
    fn evaluate<'a>(
        &'a self,
        application: &'a Application,
    ) -> Pin<Box<dyn Future<Output = Result<Evaluation, ProviderError>> + Send + 'a>>;
}

#[derive(Clone)]
pub struct ProviderConfig {
    url: Url,
    workflow_token: SecretString,
    workflow_secret: SecretString,
    timeout: Duration,
}

impl ProviderConfig {
    #[must_use]
    pub fn new(url: Url, workflow_token: SecretString, workflow_secret: SecretString) -> Self {
        Self {
            url,
            workflow_token,
            workflow_secret,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("url", &self.url.as_str())
            .field("workflow_token", &"***")
            .field("workflow_secret", &"***")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Deserialize)]
struct EvaluationBody {
    summary: EvaluationSummary,
    #[serde(default)]
    evaluation_token: Option<String>,
}

#[derive(Deserialize)]
struct EvaluationSummary {
    outcome: String,
}

/// HTTP implementation of [`VerificationProvider`].
#[derive(Debug, Clone)]
pub struct ProviderClient {
    client: Client,
    config: ProviderConfig,
}

impl ProviderClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|err| ProviderError::Transport(err.to_string()))?;

        Ok(Self { client, config })
    }

    /// Submit one application and map the answer to an [`Evaluation`].
    ///
    /// # Errors
    /// See [`ProviderError`].
    #[instrument(skip_all, fields(provider.url = %self.config.url))]
    pub async fn evaluate_application(
        &self,
        application: &Application,
    ) -> Result<Evaluation, ProviderError> {
        info!("Calling verification provider");

        let response = self
            .client
            .post(self.config.url.clone())
            .basic_auth(
                self.config.workflow_token.expose_secret(),
                Some(self.config.workflow_secret.expose_secret()),
            )
            .json(application)
            .send()
            .await
            .map_err(|err| {
                error!("Verification provider request failed: {err}");
                ProviderError::from(err)
            })?;

        let status = response.status();
        info!("Verification provider response: {}", status);

        if status != StatusCode::CREATED {
            error!("Verification provider error: {}", status);
            return Err(ProviderError::Status(status));
        }

        let body: EvaluationBody = response.json().await.map_err(|err| {
            error!("Failed to decode verification provider response: {err}");
            ProviderError::from(err)
        })?;

        let outcome = Outcome::from_label(&body.summary.outcome).ok_or_else(|| {
            error!("Unknown outcome from provider: {}", body.summary.outcome);
            ProviderError::Malformed(format!("unknown outcome '{}'", body.summary.outcome))
        })?;

        debug!("Outcome: {}", outcome);

        Ok(Evaluation {
            outcome,
            evaluation_token: body.evaluation_token,
        })
    }
}

impl VerificationProvider for ProviderClient {
    fn evaluate<'a>(
        &'a self,
        application: &'a Application,
    ) -> Pin<Box<dyn Future<Output = Result<Evaluation, ProviderError>> + Send + 'a>> {
        Box::pin(self.evaluate_application(application))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use serde_json::json;
    use std::net::TcpListener;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn application() -> Application {
        Application {
            name_first: "Ada".to_string(),
            name_last: "Lovelace".to_string(),
            email_address: "ada@example.com".to_string(),
            phone_number: "5551234567".to_string(),
            document_ssn: "123456789".to_string(),
            birth_date: "1990-12-10".to_string(),
            address_line_1: "12 Analytical Way".to_string(),
            address_line_2: None,
            address_city: "New York".to_string(),
            address_state: "NY".to_string(),
            address_postal_code: "10001".to_string(),
            address_country_code: "US".to_string(),
        }
    }

    fn client_for(server: &MockServer) -> Result<ProviderClient> {
        let url = Url::parse(&format!("{}/v1/evaluations/", server.uri()))?;
        let config = ProviderConfig::new(
            url,
            SecretString::from("workflow-token".to_string()),
            SecretString::from("workflow-secret".to_string()),
        )
        .with_timeout(Duration::from_millis(500));
        Ok(ProviderClient::new(config)?)
    }

    #[tokio::test]
    async fn maps_created_response_to_outcome() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        // base64("workflow-token:workflow-secret")
        Mock::given(method("POST"))
            .and(path("/v1/evaluations/"))
            .and(header(
                "authorization",
                "Basic d29ya2Zsb3ctdG9rZW46d29ya2Zsb3ctc2VjcmV0",
            ))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "evaluation_token": "L-abc123",
                "summary": {"outcome": "Manual Review", "result": "success"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let evaluation = client_for(&server)?.evaluate(&application()).await?;

        assert_eq!(evaluation.outcome, Outcome::ManualReview);
        assert_eq!(evaluation.evaluation_token.as_deref(), Some("L-abc123"));
        Ok(())
    }

    #[tokio::test]
    async fn forwards_application_json() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "summary": {"outcome": "Approved"}
            })))
            .mount(&server)
            .await;

        client_for(&server)?.evaluate(&application()).await?;

        let requests = server.received_requests().await.unwrap_or_default();
        assert_eq!(requests.len(), 1);
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body)?;
        assert_eq!(body["document_ssn"], "123456789");
        assert_eq!(body["address_country_code"], "US");
        Ok(())
    }

    #[tokio::test]
    async fn non_created_status_is_an_error() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "summary": {"outcome": "Approved"}
            })))
            .mount(&server)
            .await;

        let result = client_for(&server)?.evaluate(&application()).await;
        assert!(matches!(result, Err(ProviderError::Status(StatusCode::OK))));
        Ok(())
    }

    #[tokio::test]
    async fn unknown_outcome_is_malformed() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "summary": {"outcome": "Pending"}
            })))
            .mount(&server)
            .await;

        let result = client_for(&server)?.evaluate(&application()).await;
        assert!(matches!(result, Err(ProviderError::Malformed(_))));
        Ok(())
    }

    #[tokio::test]
    async fn missing_summary_is_malformed() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201).set_body_string("not json"))
            .mount(&server)
            .await;

        let result = client_for(&server)?.evaluate(&application()).await;
        assert!(matches!(result, Err(ProviderError::Malformed(_))));
        Ok(())
    }

    #[tokio::test]
    async fn slow_provider_times_out() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({"summary": {"outcome": "Approved"}}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let result = client_for(&server)?.evaluate(&application()).await;
        assert!(matches!(result, Err(ProviderError::Timeout)));
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_provider_is_a_connect_error() -> Result<()> {
        let port = {
            let Ok(listener) = TcpListener::bind("127.0.0.1:0") else {
                eprintln!("Skipping test: cannot bind localhost");
                return Ok(());
            };
            listener.local_addr()?.port()
        };
        let config = ProviderConfig::new(
            Url::parse(&format!("http://127.0.0.1:{port}/v1/evaluations/"))?,
            SecretString::from("token".to_string()),
            SecretString::from("secret".to_string()),
        );
        let result = ProviderClient::new(config)?.evaluate(&application()).await;
        assert!(matches!(result, Err(ProviderError::Connect(_))));
        Ok(())
    }

    #[test]
    fn config_defaults_and_timeout_override() -> Result<()> {
        let url = Url::parse(DEFAULT_PROVIDER_URL)?;
        let config = ProviderConfig::new(
            url.clone(),
            SecretString::from("token".to_string()),
            SecretString::from("secret".to_string()),
        );
        assert_eq!(config.url(), &url);
        assert_eq!(config.timeout(), DEFAULT_TIMEOUT);
        assert_eq!(config.timeout(), Duration::from_secs(30));

        let config = config.with_timeout(Duration::from_secs(5));
        assert_eq!(config.timeout(), Duration::from_secs(5));
        Ok(())
    }

    #[test]
    fn debug_redacts_credentials() -> Result<()> {
        let config = ProviderConfig::new(
            Url::parse(DEFAULT_PROVIDER_URL)?,
            SecretString::from("token-value".to_string()),
            SecretString::from("secret-value".to_string()),
        );
        let debug = format!("{config:?}");
        assert!(!debug.contains("token-value"));
        assert!(!debug.contains("secret-value"));
        assert!(debug.contains("sandbox.alloy.co"));
        Ok(())
    }
}
