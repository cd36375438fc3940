use crate::provider::DEFAULT_PROVIDER_URL;
use clap::{Arg, Command};

pub const ARG_PROVIDER_URL: &str = "provider-url";
pub const ARG_WORKFLOW_TOKEN: &str = "workflow-token";
pub const ARG_WORKFLOW_SECRET: &str = "workflow-secret";
pub const ARG_PROVIDER_TIMEOUT: &str = "provider-timeout";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_PROVIDER_URL)
                .long("provider-url")
                .help("Identity verification evaluations endpoint")
                .default_value(DEFAULT_PROVIDER_URL)
                .env("ONBOARD_PROVIDER_URL"),
        )
        .arg(
            Arg::new(ARG_WORKFLOW_TOKEN)
                .long("workflow-token")
                .help("Provider workflow token (basic auth user)")
                .env("WORKFLOW_TOKEN")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_WORKFLOW_SECRET)
                .long("workflow-secret")
                .help("Provider workflow secret (basic auth password)")
                .env("WORKFLOW_SECRET")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_PROVIDER_TIMEOUT)
                .long("provider-timeout")
                .help("Provider request timeout in seconds")
                .default_value("30")
                .env("ONBOARD_PROVIDER_TIMEOUT")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
}
