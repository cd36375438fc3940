//! Field rules shared by the form controller and the submission gateway.

use super::{age_on, parse_birth_date, Application, Field, COUNTRY_CODE, MINIMUM_AGE};
use chrono::NaiveDate;
use regex::Regex;

/// A field that failed its rule, with the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: Field,
    pub message: String,
}

impl ValidationError {
    fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    fn missing(field: Field) -> Self {
        Self::new(field, format!("Missing required field: {}", field.label()))
    }
}

fn matches(pattern: &str, value: &str) -> bool {
    Regex::new(pattern).is_ok_and(|regex| regex.is_match(value))
}

fn letters_and_spaces(value: &str) -> bool {
    matches(r"^[A-Za-z ]+$", value)
}

fn valid_email(email: &str) -> bool {
    matches(r"^[^@\s]+@[^@\s]+\.[^@\s]+$", email)
}

/// Digits left after dropping separators such as `-`, `(`, `)` and spaces.
pub(crate) fn phone_digits(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

/// Check one field. Empty required fields fail with a "missing" message; the
/// optional address line accepts anything.
///
/// # Errors
/// Returns the first rule the value breaks.
pub fn validate_field(field: Field, value: &str, today: NaiveDate) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return if field.is_required() {
            Err(ValidationError::missing(field))
        } else {
            Ok(())
        };
    }

    match field {
        Field::NameFirst | Field::NameLast | Field::AddressCity => {
            if !letters_and_spaces(value) {
                return Err(ValidationError::new(
                    field,
                    format!("{} may only contain letters and spaces", field.label()),
                ));
            }
        }
        Field::EmailAddress => {
            if !valid_email(value) {
                return Err(ValidationError::new(field, "Invalid email format"));
            }
        }
        Field::PhoneNumber => {
            if phone_digits(value).len() != 10 {
                return Err(ValidationError::new(field, "Phone number must be 10 digits"));
            }
        }
        Field::DocumentSsn => {
            if !matches(r"^[0-9]{9}$", value) {
                return Err(ValidationError::new(
                    field,
                    "SSN must be exactly 9 digits with no dashes",
                ));
            }
        }
        Field::BirthDate => {
            let birth = parse_birth_date(value).ok_or_else(|| {
                ValidationError::new(field, "Date of Birth must be in YYYY-MM-DD format")
            })?;
            if age_on(birth, today) < MINIMUM_AGE {
                return Err(ValidationError::new(
                    field,
                    format!("Must be at least {MINIMUM_AGE} years old"),
                ));
            }
        }
        Field::AddressState => {
            if !matches(r"^[A-Z]{2}$", value) {
                return Err(ValidationError::new(
                    field,
                    "State must be a 2-letter code (e.g., NY, CA)",
                ));
            }
        }
        Field::AddressPostalCode => {
            if !matches(r"^[0-9]{5}$", value) {
                return Err(ValidationError::new(field, "Postal code must be 5 digits"));
            }
        }
        Field::AddressCountryCode => {
            if value != COUNTRY_CODE {
                return Err(ValidationError::new(
                    field,
                    format!("Country must be '{COUNTRY_CODE}'"),
                ));
            }
        }
        Field::AddressLine1 | Field::AddressLine2 => {}
    }

    Ok(())
}

/// Full server-side check: every required field must be present before any
/// format rule runs, then each field is checked in form order.
///
/// # Errors
/// Returns the first failing field.
pub fn validate_application(
    application: &Application,
    today: NaiveDate,
) -> Result<(), ValidationError> {
    if let Some(field) = Field::ALL
        .into_iter()
        .find(|field| field.is_required() && application.value(*field).trim().is_empty())
    {
        return Err(ValidationError::missing(field));
    }

    Field::ALL
        .into_iter()
        .try_for_each(|field| validate_field(field, application.value(field), today))
}

/// Pre-submit check run by the form: email, phone, SSN and age.
///
/// # Errors
/// Returns the first failing field.
pub fn validate_critical(
    application: &Application,
    today: NaiveDate,
) -> Result<(), ValidationError> {
    [
        Field::EmailAddress,
        Field::PhoneNumber,
        Field::DocumentSsn,
        Field::BirthDate,
    ]
    .into_iter()
    .try_for_each(|field| validate_field(field, application.value(field), today))
}
