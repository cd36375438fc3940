//! Headless form controller for the onboarding UI.
//!
//! [`FormState`] owns the field values, the per-field error map and the
//! submission status. A view layer renders from it and feeds events back:
//! [`FormState::input`] on every keystroke, [`FormState::submit`] on submit
//! and [`FormState::reset`] after an outcome has been shown.
//!
//! Flow Overview: Editing -> Submitting -> Completed | Failed -> (reset) Editing.
//! A failed attempt keeps the values so the user can fix them and resubmit.

mod client;
mod input;

pub use self::client::{ClientError, GatewayClient};
pub use self::input::{filter_input, max_len, CharClass};

use crate::application::{
    validate_critical, validate_field, Application, Field, Outcome, SubmitResponse,
};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Message shown when the gateway cannot be reached at all.
pub const CONNECTION_FAILURE: &str =
    "Unable to reach the server. Please check your connection and try again.";

/// Banner shown above the form after a failed attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Banner {
    /// Blocked locally before any request was sent.
    Validation(String),
    /// The gateway answered with an error.
    Rejected(String),
    /// The gateway could not be reached.
    Connection(String),
}

impl Banner {
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(message) | Self::Rejected(message) | Self::Connection(message) => {
                message
            }
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FormStatus {
    #[default]
    Editing,
    Submitting,
    Completed {
        outcome: Outcome,
        evaluation_token: Option<String>,
    },
    Failed(Banner),
}

impl FormStatus {
    /// Text for the outcome screen or the error banner, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Editing | Self::Submitting => None,
            Self::Completed { outcome, .. } => Some(outcome.message()),
            Self::Failed(banner) => Some(banner.message()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormState {
    application: Application,
    errors: BTreeMap<Field, String>,
    status: FormStatus,
}

impl Default for FormState {
    fn default() -> Self {
        Self::new()
    }
}

impl FormState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            application: Application::blank(),
            errors: BTreeMap::new(),
            status: FormStatus::Editing,
        }
    }

    #[must_use]
    pub fn application(&self) -> &Application {
        &self.application
    }

    #[must_use]
    pub fn value(&self, field: Field) -> &str {
        self.application.value(field)
    }

    #[must_use]
    pub fn error(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    #[must_use]
    pub fn errors(&self) -> &BTreeMap<Field, String> {
        &self.errors
    }

    #[must_use]
    pub fn status(&self) -> &FormStatus {
        &self.status
    }

    /// The submit control is disabled while a request is in flight.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        !matches!(self.status, FormStatus::Submitting)
    }

    /// Field-level check for `value`, independent of the current state.
    #[must_use]
    pub fn validate_field(field: Field, value: &str, today: NaiveDate) -> Option<String> {
        validate_field(field, value, today)
            .err()
            .map(|err| err.message)
    }

    /// Apply a keystroke or paste: filter the raw text, store it and refresh
    /// that field's error.
    pub fn input(&mut self, field: Field, raw: &str, today: NaiveDate) {
        let value = filter_input(field, raw);
        match Self::validate_field(field, &value, today) {
            Some(message) => {
                self.errors.insert(field, message);
            }
            None => {
                self.errors.remove(&field);
            }
        }
        self.application.set(field, value);
    }

    /// Re-run the critical checks (email, phone, SSN, age).
    ///
    /// # Errors
    /// Returns the first failing message.
    pub fn validate_form(&self, today: NaiveDate) -> Result<(), String> {
        validate_critical(&self.application, today).map_err(|err| err.message)
    }

    /// Move to `Submitting` and hand out the payload to send.
    ///
    /// Returns `None` when a request is already in flight or the critical
    /// checks fail; in the latter case the status shows the failing message.
    pub fn begin_submit(&mut self, today: NaiveDate) -> Option<Application> {
        if !self.can_submit() {
            debug!("Submission already in flight");
            return None;
        }

        if let Err(err) = validate_critical(&self.application, today) {
            warn!(field = err.field.key(), "Blocked submission: {}", err);
            self.errors.insert(err.field, err.message.clone());
            self.status = FormStatus::Failed(Banner::Validation(err.message));
            return None;
        }

        self.status = FormStatus::Submitting;
        Some(self.application.clone())
    }

    /// Record the gateway's answer for the attempt started by `begin_submit`.
    pub fn finish_submit(&mut self, result: Result<SubmitResponse, ClientError>) {
        self.status = match result {
            Ok(SubmitResponse {
                outcome,
                evaluation_token,
            }) => FormStatus::Completed {
                outcome,
                evaluation_token,
            },
            Err(err) if err.is_transport() => {
                warn!("Submission failed: {}", err);
                FormStatus::Failed(Banner::Connection(CONNECTION_FAILURE.to_string()))
            }
            Err(ClientError::Http { message, .. }) => FormStatus::Failed(Banner::Rejected(message)),
            Err(err) => {
                warn!("Submission failed: {}", err);
                FormStatus::Failed(Banner::Rejected(
                    "Something went wrong. Please try again.".to_string(),
                ))
            }
        };
    }

    /// Validate, send and record the result in one step.
    pub async fn submit(&mut self, client: &GatewayClient, today: NaiveDate) -> &FormStatus {
        if let Some(application) = self.begin_submit(today) {
            let result = client.submit(&application).await;
            self.finish_submit(result);
        }
        &self.status
    }

    /// Clear all values, errors and status for a new application.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
