pub mod logging;
pub mod provider;
pub mod server;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    ColorChoice, Command,
};

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("onboard")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles);

    let command = server::with_args(command);
    let command = provider::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    const ENV_KEYS: [&str; 11] = [
        "ONBOARD_HOURLY_RATE_LIMIT",
        "ONBOARD_PORT",
        "ONBOARD_ALLOWED_ORIGINS",
        "ONBOARD_RATE_LIMIT",
        "ONBOARD_RATE_LIMIT_WINDOW",
        "ONBOARD_TRUST_FORWARDED_FOR",
        "ONBOARD_PROVIDER_URL",
        "ONBOARD_PROVIDER_TIMEOUT",
        "ONBOARD_LOG_LEVEL",
        "WORKFLOW_TOKEN",
        "WORKFLOW_SECRET",
    ];

    fn clean_env<F: FnOnce()>(f: F) {
        temp_env::with_vars_unset(ENV_KEYS, f);
    }

    fn required() -> Vec<OsString> {
        ["onboard", "--workflow-token", "token", "--workflow-secret", "secret"]
            .into_iter()
            .map(OsString::from)
            .collect()
    }

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "onboard");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some(env!("CARGO_PKG_DESCRIPTION").to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_defaults() {
        clean_env(|| {
            let matches = new().get_matches_from(required());

            assert_eq!(matches.get_one::<u16>(server::ARG_PORT).copied(), Some(5001));
            assert_eq!(
                matches.get_one::<u32>(server::ARG_RATE_LIMIT).copied(),
                Some(5)
            );
            assert_eq!(
                matches.get_one::<u64>(server::ARG_RATE_LIMIT_WINDOW).copied(),
                Some(60)
            );
            assert_eq!(
                matches.get_one::<u32>(server::ARG_HOURLY_RATE_LIMIT).copied(),
                Some(100)
            );
            assert!(!matches.get_flag(server::ARG_TRUST_FORWARDED_FOR));
            assert_eq!(
                matches
                    .get_many::<String>(server::ARG_ALLOWED_ORIGIN)
                    .map(|values| values.cloned().collect::<Vec<_>>()),
                Some(vec![
                    "http://localhost:3000".to_string(),
                    "http://127.0.0.1:3000".to_string()
                ])
            );
            assert_eq!(
                matches
                    .get_one::<String>(provider::ARG_PROVIDER_URL)
                    .cloned(),
                Some(crate::provider::DEFAULT_PROVIDER_URL.to_string())
            );
            assert_eq!(
                matches.get_one::<u64>(provider::ARG_PROVIDER_TIMEOUT).copied(),
                Some(30)
            );
            assert_eq!(
                matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                Some(0)
            );
        });
    }

    #[test]
    fn test_credentials_are_required() {
        clean_env(|| {
            let result = new().try_get_matches_from(vec!["onboard"]);
            assert_eq!(
                result.map_err(|e| e.kind()).err(),
                Some(clap::error::ErrorKind::MissingRequiredArgument)
            );
        });
    }

    #[test]
    fn test_check_args() {
        clean_env(|| {
            let mut args = required();
            args.extend(
                [
                    "--port",
                    "8443",
                    "--allowed-origin",
                    "https://signup.onboard.dev",
                    "--allowed-origin",
                    "https://www.onboard.dev,https://onboard.dev",
                    "--rate-limit",
                    "10",
                    "--trust-forwarded-for",
                    "-vvv",
                ]
                .map(OsString::from),
            );
            let matches = new().get_matches_from(args);

            assert_eq!(matches.get_one::<u16>(server::ARG_PORT).copied(), Some(8443));
            assert_eq!(
                matches
                    .get_many::<String>(server::ARG_ALLOWED_ORIGIN)
                    .map(Iterator::count),
                Some(3)
            );
            assert_eq!(
                matches.get_one::<u32>(server::ARG_RATE_LIMIT).copied(),
                Some(10)
            );
            assert!(matches.get_flag(server::ARG_TRUST_FORWARDED_FOR));
            assert_eq!(
                matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                Some(3)
            );
        });
    }

    #[test]
    fn test_zero_rate_limit_is_rejected() {
        clean_env(|| {
            let mut args = required();
            args.extend(["--rate-limit", "0"].map(OsString::from));
            let result = new().try_get_matches_from(args);
            assert_eq!(
                result.map_err(|e| e.kind()).err(),
                Some(clap::error::ErrorKind::ValueValidation)
            );
        });
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("ONBOARD_PORT", Some("443")),
                (
                    "ONBOARD_ALLOWED_ORIGINS",
                    Some("https://a.onboard.dev,https://b.onboard.dev"),
                ),
                ("ONBOARD_RATE_LIMIT", Some("20")),
                ("ONBOARD_RATE_LIMIT_WINDOW", Some("120")),
                ("ONBOARD_HOURLY_RATE_LIMIT", Some("0")),
                ("ONBOARD_TRUST_FORWARDED_FOR", Some("true")),
                ("ONBOARD_PROVIDER_URL", Some("http://127.0.0.1:9000/v1/evaluations/")),
                ("ONBOARD_PROVIDER_TIMEOUT", Some("5")),
                ("ONBOARD_LOG_LEVEL", Some("info")),
                ("WORKFLOW_TOKEN", Some("token")),
                ("WORKFLOW_SECRET", Some("secret")),
            ],
            || {
                let matches = new().get_matches_from(vec!["onboard"]);
                assert_eq!(matches.get_one::<u16>(server::ARG_PORT).copied(), Some(443));
                assert_eq!(
                    matches
                        .get_many::<String>(server::ARG_ALLOWED_ORIGIN)
                        .map(|values| values.cloned().collect::<Vec<_>>()),
                    Some(vec![
                        "https://a.onboard.dev".to_string(),
                        "https://b.onboard.dev".to_string()
                    ])
                );
                assert_eq!(
                    matches.get_one::<u32>(server::ARG_RATE_LIMIT).copied(),
                    Some(20)
                );
                assert_eq!(
                    matches.get_one::<u64>(server::ARG_RATE_LIMIT_WINDOW).copied(),
                    Some(120)
                );
                assert_eq!(
                    matches.get_one::<u32>(server::ARG_HOURLY_RATE_LIMIT).copied(),
                    Some(0)
                );
                assert!(matches.get_flag(server::ARG_TRUST_FORWARDED_FOR));
                assert_eq!(
                    matches
                        .get_one::<String>(provider::ARG_WORKFLOW_TOKEN)
                        .cloned(),
                    Some("token".to_string())
                );
                assert_eq!(
                    matches.get_one::<u64>(provider::ARG_PROVIDER_TIMEOUT).copied(),
                    Some(5)
                );
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(2)
                );
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        // loop cover all possible value_parse
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars(
                [
                    ("ONBOARD_LOG_LEVEL", Some(level)),
                    ("WORKFLOW_TOKEN", Some("token")),
                    ("WORKFLOW_SECRET", Some("secret")),
                ],
                || {
                    let matches = new().get_matches_from(vec!["onboard"]);
                    assert_eq!(
                        matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                        u8::try_from(index).ok()
                    );
                },
            );
        }
    }
}
