//! Structured logging setup.
//!
//! Library code only emits `tracing` events; binaries and test harnesses
//! decide where they go by installing a subscriber here.

use crate::config::ConfigError;
use tracing_subscriber::EnvFilter;

/// Directive used when neither `RUST_LOG` nor the caller provides one.
pub const DEFAULT_FILTER: &str = "taskboard=info";

/// Parses a filter directive such as `taskboard=debug,warn`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] when the directive does not parse.
pub fn parse_filter(directive: &str) -> Result<EnvFilter, ConfigError> {
    EnvFilter::try_new(directive).map_err(|err| ConfigError::InvalidValue {
        key: "log filter".to_owned(),
        value: directive.to_owned(),
        reason: err.to_string(),
    })
}

/// Installs a compact stderr subscriber.
///
/// `RUST_LOG` takes precedence over `directive`. Returns `Ok(false)` when a
/// global subscriber was already installed, in which case nothing changes.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] when `directive` is used and does
/// not parse.
pub fn init_tracing(directive: &str) -> Result<bool, ConfigError> {
    let from_env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = resolve_filter(from_env.as_deref(), directive)?;
    Ok(install(filter))
}

/// Picks the filter to install: a parsable `from_env` value, otherwise
/// `directive`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] when `directive` is used and does
/// not parse.
pub fn resolve_filter(from_env: Option<&str>, directive: &str) -> Result<EnvFilter, ConfigError> {
    from_env
        .and_then(|value| EnvFilter::try_new(value).ok())
        .map_or_else(|| parse_filter(directive), Ok)
}

/// Installs `filter` behind a compact stderr subscriber. Returns `false`
/// when a global subscriber was already installed.
#[must_use]
pub fn install(filter: EnvFilter) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("taskboard=debug")]
    #[case("warn,taskboard::board=trace")]
    fn valid_directives_parse(#[case] directive: &str) {
        assert!(parse_filter(directive).is_ok());
    }

    #[rstest]
    fn invalid_directive_is_reported() {
        let result = parse_filter("taskboard=loud");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[rstest]
    #[case(Some("taskboard=debug"), "taskboard=trace", "taskboard=debug")]
    #[case(Some("taskboard=loud"), "taskboard=trace", "taskboard=trace")]
    #[case(None, "taskboard=trace", "taskboard=trace")]
    fn environment_filter_wins_when_it_parses(
        #[case] from_env: Option<&str>,
        #[case] directive: &str,
        #[case] expected: &str,
    ) {
        let filter = resolve_filter(from_env, directive).expect("a filter resolves");
        assert_eq!(filter.to_string(), expected);
    }

    #[rstest]
    fn unusable_environment_and_directive_is_an_error() {
        let result = resolve_filter(Some("taskboard=loud"), "taskboard=loud");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[rstest]
    fn repeated_installation_is_harmless() {
        let filter = || parse_filter(DEFAULT_FILTER).expect("default directive parses");
        let _first = install(filter());
        assert!(!install(filter()));
    }
}
