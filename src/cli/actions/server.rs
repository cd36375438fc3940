use crate::{
    api::{self, GatewayConfig},
    provider::{ProviderClient, ProviderConfig},
};
use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};
use std::{sync::Arc, time::Duration};
use tracing::info;
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub rate_limit: u32,
    pub rate_limit_window: Duration,
    pub hourly_rate_limit: u32,
    pub trust_forwarded_for: bool,
    pub provider_url: Url,
    pub workflow_token: SecretString,
    pub workflow_secret: SecretString,
    pub provider_timeout: Duration,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the provider client cannot be built or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let provider_config = ProviderConfig::new(
        args.provider_url,
        args.workflow_token,
        args.workflow_secret,
    )
    .with_timeout(args.provider_timeout);
    let provider =
        ProviderClient::new(provider_config).context("Could not build the provider client")?;

    let config = GatewayConfig {
        port: args.port,
        allowed_origins: args.allowed_origins,
        rate_limit: args.rate_limit,
        rate_limit_window: args.rate_limit_window,
        hourly_rate_limit: args.hourly_rate_limit,
        trust_forwarded_for: args.trust_forwarded_for,
    };

    api::new(config, Arc::new(provider)).await
}

fn log_startup_args(args: &Args) {
    info!("{}", startup_message(args));
}

fn startup_message(args: &Args) -> String {
    let entries = [
        ("listen", format!("tcp:{}", args.port)),
        ("allowed_origins", args.allowed_origins.join(", ")),
        (
            "rate_limit",
            format!(
                "{} per {}s",
                args.rate_limit,
                args.rate_limit_window.as_secs()
            ),
        ),
        (
            "hourly_rate_limit",
            if args.hourly_rate_limit == 0 {
                "off".to_string()
            } else {
                format!("{} per hour", args.hourly_rate_limit)
            },
        ),
        ("trust_forwarded_for", args.trust_forwarded_for.to_string()),
        ("provider_url", args.provider_url.to_string()),
        ("provider_timeout", format!("{}s", args.provider_timeout.as_secs())),
        ("workflow_token", redact(&args.workflow_token)),
        (
            "workflow_secret_set",
            (!args.workflow_secret.expose_secret().is_empty()).to_string(),
        ),
    ];

    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = format!("{}\n\nStartup configuration:", banner());
    for (key, value) in &entries {
        let padding = " ".repeat(max_key_len.saturating_sub(key.len()));
        let _ =
            std::fmt::Write::write_fmt(&mut message, format_args!("\n  {key}:{padding} {value}"));
    }
    message
}

/// Keep the first four characters so operators can tell tokens apart.
fn redact(secret: &SecretString) -> String {
    let exposed = secret.expose_secret();
    if exposed.chars().count() <= 8 {
        return "REDACTED".to_string();
    }
    let prefix: String = exposed.chars().take(4).collect();
    format!("{prefix}...REDACTED")
}

fn banner() -> String {
    let short_hash = short_commit(crate::GIT_COMMIT_HASH);
    BANNER.replace(
        "{VERSION}",
        &format!(" - {} - {}", env!("CARGO_PKG_VERSION"), short_hash),
    )
}

fn short_commit(hash: &str) -> String {
    hash.trim().chars().take(7).collect()
}

const BANNER: &str = r"
   ___
  / _ \  _ __
 | | | || '_ \
 | |_| || | | |
  \___/ |_| |_|  O N B O A R D {VERSION}";
