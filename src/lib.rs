//! # Onboard (Account Onboarding Gateway)
//!
//! `onboard` collects identity data for new accounts and hands it to an external
//! identity-verification provider, returning a coarse decision for display.
//!
//! ## Components
//!
//! - **Form controller** ([`form`]): headless form state for the client. Filters
//!   keystrokes per field, reports field errors as the user types, re-checks the
//!   critical fields before submitting and tracks the submission status.
//! - **Submission gateway** ([`api`]): `POST /submit` re-validates every field,
//!   caps requests per client address and forwards accepted applications to the
//!   provider ([`provider`]).
//!
//! Both sides share the rules in [`application`], so a payload accepted by the
//! form is accepted by the gateway and vice versa.
//!
//! ## Outcomes
//!
//! The provider decision is reduced to exactly one of `Approved`, `Manual Review`
//! or `Denied`. Anything else the provider returns is treated as a provider error.
//! Nothing is persisted: an application lives for a single request.

pub mod api;
pub mod application;
pub mod cli;
pub mod form;
pub mod provider;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
