use super::Outcome;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of a successful `POST /submit`.
#[derive(ToSchema, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SubmitResponse {
    pub outcome: Outcome,
    /// Provider reference for the evaluation, when one was issued.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation_token: Option<String>,
}

/// Body of every failed request.
#[derive(ToSchema, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
