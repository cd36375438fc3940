use crate::api::DEFAULT_ALLOWED_ORIGINS;
use clap::{builder::BoolishValueParser, Arg, ArgAction, Command};

pub const ARG_PORT: &str = "port";
pub const ARG_ALLOWED_ORIGIN: &str = "allowed-origin";
pub const ARG_RATE_LIMIT: &str = "rate-limit";
pub const ARG_RATE_LIMIT_WINDOW: &str = "rate-limit-window";
pub const ARG_HOURLY_RATE_LIMIT: &str = "hourly-rate-limit";
pub const ARG_TRUST_FORWARDED_FOR: &str = "trust-forwarded-for";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("5001")
                .env("ONBOARD_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_ALLOWED_ORIGIN)
                .long("allowed-origin")
                .help("Browser origin allowed to call the gateway (repeatable, comma separated)")
                .env("ONBOARD_ALLOWED_ORIGINS")
                .action(ArgAction::Append)
                .value_delimiter(',')
                .default_values(DEFAULT_ALLOWED_ORIGINS),
        )
        .arg(
            Arg::new(ARG_RATE_LIMIT)
                .long("rate-limit")
                .help("Submissions allowed per client address within one window")
                .default_value("5")
                .env("ONBOARD_RATE_LIMIT")
                .value_parser(clap::value_parser!(u32).range(1..)),
        )
        .arg(
            Arg::new(ARG_RATE_LIMIT_WINDOW)
                .long("rate-limit-window")
                .help("Rate limit window in seconds")
                .default_value("60")
                .env("ONBOARD_RATE_LIMIT_WINDOW")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_HOURLY_RATE_LIMIT)
                .long("hourly-rate-limit")
                .help("Submissions allowed per client address per hour (0 disables)")
                .default_value("100")
                .env("ONBOARD_HOURLY_RATE_LIMIT")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new(ARG_TRUST_FORWARDED_FOR)
                .long("trust-forwarded-for")
                .help("Key rate limits on X-Forwarded-For / X-Real-IP (only behind a trusted proxy)")
                .env("ONBOARD_TRUST_FORWARDED_FOR")
                .action(ArgAction::SetTrue)
                .value_parser(BoolishValueParser::new()),
        )
}
