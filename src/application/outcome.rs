use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Decision returned for a verified application.
#[derive(ToSchema, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Approved,
    #[serde(rename = "Manual Review")]
    ManualReview,
    Denied,
}

impl Outcome {
    /// Map a provider label onto an outcome. Unknown labels yield `None`.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "Approved" => Some(Self::Approved),
            "Manual Review" => Some(Self::ManualReview),
            "Denied" => Some(Self::Denied),
            _ => None,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Approved => "Approved",
            Self::ManualReview => "Manual Review",
            Self::Denied => "Denied",
        }
    }

    /// Text shown on the outcome screen.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Approved => "Your application has been approved. Welcome aboard!",
            Self::ManualReview => {
                "Your application is under review. We will contact you once a decision has been made."
            }
            Self::Denied => "We are unable to approve your application at this time.",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
