use crate::cli::{
    actions::{server::Args, Action},
    commands::{provider, server},
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::time::Duration;
use url::Url;

/// # Errors
/// Returns an error if required arguments are missing or the provider URL is invalid.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches
        .get_one::<u16>(server::ARG_PORT)
        .copied()
        .unwrap_or(5001);
    let allowed_origins = matches
        .get_many::<String>(server::ARG_ALLOWED_ORIGIN)
        .map(|values| {
            values
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    let rate_limit = matches
        .get_one::<u32>(server::ARG_RATE_LIMIT)
        .copied()
        .context("missing argument: --rate-limit")?;
    let rate_limit_window = matches
        .get_one::<u64>(server::ARG_RATE_LIMIT_WINDOW)
        .copied()
        .map(Duration::from_secs)
        .context("missing argument: --rate-limit-window")?;
    let hourly_rate_limit = matches
        .get_one::<u32>(server::ARG_HOURLY_RATE_LIMIT)
        .copied()
        .context("missing argument: --hourly-rate-limit")?;
    let trust_forwarded_for = matches.get_flag(server::ARG_TRUST_FORWARDED_FOR);

    let provider_url = matches
        .get_one::<String>(provider::ARG_PROVIDER_URL)
        .context("missing argument: --provider-url")?;
    let provider_url = Url::parse(provider_url.trim())
        .with_context(|| format!("invalid ONBOARD_PROVIDER_URL: {provider_url}"))?;
    let workflow_token = matches
        .get_one::<String>(provider::ARG_WORKFLOW_TOKEN)
        .cloned()
        .map(SecretString::from)
        .context("missing required argument: --workflow-token")?;
    let workflow_secret = matches
        .get_one::<String>(provider::ARG_WORKFLOW_SECRET)
        .cloned()
        .map(SecretString::from)
        .context("missing required argument: --workflow-secret")?;
    let provider_timeout = matches
        .get_one::<u64>(provider::ARG_PROVIDER_TIMEOUT)
        .copied()
        .map(Duration::from_secs)
        .context("missing argument: --provider-timeout")?;

    Ok(Action::Server(Args {
        port,
        allowed_origins,
        rate_limit,
        rate_limit_window,
        hourly_rate_limit,
        trust_forwarded_for,
        provider_url,
        workflow_token,
        workflow_secret,
        provider_timeout,
    }))
}
