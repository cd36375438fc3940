//! `POST /submit`: rate limit, re-validate, forward to the provider.

use super::{rate_limit::RateLimitDecision, GatewayState};
use crate::{
    application::{
        validate_application, Application, ErrorResponse, SubmitResponse, ValidationError,
    },
    provider::ProviderError,
};
use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, Extension},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Local;
use std::{net::SocketAddr, sync::Arc};
use tracing::{error, info, instrument, warn};

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("rate limited")]
    RateLimited,
    #[error("invalid payload")]
    InvalidPayload,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl SubmitError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many requests. Please try again later.".to_string(),
            ),
            Self::InvalidPayload => (StatusCode::BAD_REQUEST, "Invalid data format".to_string()),
            Self::Validation(err) => (StatusCode::BAD_REQUEST, err.message.clone()),
            Self::Provider(ProviderError::Connect(_)) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Unable to connect to verification service".to_string(),
            ),
            Self::Provider(ProviderError::Timeout) => (
                StatusCode::GATEWAY_TIMEOUT,
                "Request timed out. Please try again.".to_string(),
            ),
            Self::Provider(ProviderError::Status(_) | ProviderError::Malformed(_)) => (
                StatusCode::BAD_GATEWAY,
                "Verification service error".to_string(),
            ),
            Self::Provider(ProviderError::Transport(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected error occurred".to_string(),
            ),
        }
    }
}

impl IntoResponse for SubmitError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

#[utoipa::path(
    post,
    path = "/submit",
    request_body = Application,
    responses(
        (status = 200, description = "Application evaluated", body = SubmitResponse),
        (status = 400, description = "Missing or invalid field", body = ErrorResponse),
        (status = 429, description = "Rate limited", body = ErrorResponse),
        (status = 500, description = "Unexpected error", body = ErrorResponse),
        (status = 502, description = "Verification service error", body = ErrorResponse),
        (status = 503, description = "Verification service unreachable", body = ErrorResponse),
        (status = 504, description = "Verification service timed out", body = ErrorResponse)
    ),
    tag = "onboarding"
)]
#[instrument(skip_all)]
pub async fn submit(
    headers: HeaderMap,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    Extension(state): Extension<Arc<GatewayState>>,
    payload: Result<Json<Application>, JsonRejection>,
) -> Result<Json<SubmitResponse>, SubmitError> {
    let peer = connect_info.map(|ConnectInfo(addr)| addr.ip());
    let client_ip = state.client_ip(&headers, peer);

    // Counted before anything else so invalid payloads also use up the quota.
    if state.rate_limiter().check_ip(client_ip.as_deref()) == RateLimitDecision::Limited {
        warn!(
            client_ip = client_ip.as_deref().unwrap_or("unknown"),
            "Rate limit exceeded"
        );
        return Err(SubmitError::RateLimited);
    }

    let Json(application) = payload.map_err(|rejection| {
        warn!("Invalid payload: {}", rejection.body_text());
        SubmitError::InvalidPayload
    })?;

    info!("Received application submission");

    validate_application(&application, Local::now().date_naive()).map_err(|err| {
        warn!(field = err.field.key(), "Validation failed: {}", err);
        err
    })?;

    let evaluation = state.provider().evaluate(&application).await.map_err(|err| {
        error!("Verification failed: {}", err);
        err
    })?;

    info!("Outcome: {}", evaluation.outcome);

    Ok(Json(SubmitResponse {
        outcome: evaluation.outcome,
        evaluation_token: evaluation.evaluation_token,
    }))
}
