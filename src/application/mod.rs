//! The onboarding application record and the rules both the form and the
//! gateway apply to it.

mod age;
mod outcome;
mod response;
mod rules;

pub use self::age::{age_on, parse_birth_date, MINIMUM_AGE};
pub use self::outcome::Outcome;
pub use self::response::{ErrorResponse, SubmitResponse};
pub use self::rules::{validate_application, validate_critical, validate_field, ValidationError};

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Country code every application must carry.
pub const COUNTRY_CODE: &str = "US";

/// Identifies one attribute of an [`Application`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    NameFirst,
    NameLast,
    EmailAddress,
    PhoneNumber,
    DocumentSsn,
    BirthDate,
    AddressLine1,
    AddressLine2,
    AddressCity,
    AddressState,
    AddressPostalCode,
    AddressCountryCode,
}

impl Field {
    /// Every field, in form order.
    pub const ALL: [Self; 12] = [
        Self::NameFirst,
        Self::NameLast,
        Self::EmailAddress,
        Self::PhoneNumber,
        Self::DocumentSsn,
        Self::BirthDate,
        Self::AddressLine1,
        Self::AddressLine2,
        Self::AddressCity,
        Self::AddressState,
        Self::AddressPostalCode,
        Self::AddressCountryCode,
    ];

    /// JSON key used on the wire.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::NameFirst => "name_first",
            Self::NameLast => "name_last",
            Self::EmailAddress => "email_address",
            Self::PhoneNumber => "phone_number",
            Self::DocumentSsn => "document_ssn",
            Self::BirthDate => "birth_date",
            Self::AddressLine1 => "address_line_1",
            Self::AddressLine2 => "address_line_2",
            Self::AddressCity => "address_city",
            Self::AddressState => "address_state",
            Self::AddressPostalCode => "address_postal_code",
            Self::AddressCountryCode => "address_country_code",
        }
    }

    /// Human label used in user-facing messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NameFirst => "First Name",
            Self::NameLast => "Last Name",
            Self::EmailAddress => "Email Address",
            Self::PhoneNumber => "Phone Number",
            Self::DocumentSsn => "Social Security Number",
            Self::BirthDate => "Date of Birth",
            Self::AddressLine1 => "Address Line 1",
            Self::AddressLine2 => "Address Line 2",
            Self::AddressCity => "City",
            Self::AddressState => "State",
            Self::AddressPostalCode => "Postal Code",
            Self::AddressCountryCode => "Country",
        }
    }

    #[must_use]
    pub const fn is_required(self) -> bool {
        !matches!(self, Self::AddressLine2)
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Identity and address data submitted for onboarding.
///
/// Missing keys and `null` values deserialize to empty strings so the gateway
/// can answer with a "missing required field" message instead of a generic
/// decoding error.
#[derive(ToSchema, Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Application {
    #[serde(deserialize_with = "null_as_empty")]
    pub name_first: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub name_last: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub email_address: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub phone_number: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub document_ssn: String,
    /// `YYYY-MM-DD`
    #[serde(deserialize_with = "null_as_empty")]
    pub birth_date: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub address_line_1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_line_2: Option<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub address_city: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub address_state: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub address_postal_code: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub address_country_code: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Application {
    /// Blank application with the country preset, matching a freshly rendered form.
    #[must_use]
    pub fn blank() -> Self {
        Self {
            address_country_code: COUNTRY_CODE.to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::NameFirst => &self.name_first,
            Field::NameLast => &self.name_last,
            Field::EmailAddress => &self.email_address,
            Field::PhoneNumber => &self.phone_number,
            Field::DocumentSsn => &self.document_ssn,
            Field::BirthDate => &self.birth_date,
            Field::AddressLine1 => &self.address_line_1,
            Field::AddressLine2 => self.address_line_2.as_deref().unwrap_or_default(),
            Field::AddressCity => &self.address_city,
            Field::AddressState => &self.address_state,
            Field::AddressPostalCode => &self.address_postal_code,
            Field::AddressCountryCode => &self.address_country_code,
        }
    }

    pub fn set(&mut self, field: Field, value: String) {
        match field {
            Field::NameFirst => self.name_first = value,
            Field::NameLast => self.name_last = value,
            Field::EmailAddress => self.email_address = value,
            Field::PhoneNumber => self.phone_number = value,
            Field::DocumentSsn => self.document_ssn = value,
            Field::BirthDate => self.birth_date = value,
            Field::AddressLine1 => self.address_line_1 = value,
            Field::AddressLine2 => {
                self.address_line_2 = if value.is_empty() { None } else { Some(value) };
            }
            Field::AddressCity => self.address_city = value,
            Field::AddressState => self.address_state = value,
            Field::AddressPostalCode => self.address_postal_code = value,
            Field::AddressCountryCode => self.address_country_code = value,
        }
    }
}
