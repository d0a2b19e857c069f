//! Logging initialization.
//!
//! Log output goes to stderr so stdout stays free for command output.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the logging subsystem.
///
/// `level` is the default filter directive; `RUST_LOG` overrides it when set.
pub fn init(level: &str, json_format: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Initialize logging from the `[logging]` config section, with CLI overrides.
pub fn init_from_config(config: &imgnorm_core::Config, verbose: bool, json_logs: bool) {
    let level = resolve_level(&config.logging.level, verbose);
    let json_format = json_logs || config.logging.format.eq_ignore_ascii_case("json");
    init(level, json_format);
}

/// `--verbose` raises the level to debug but never lowers a trace setting.
fn resolve_level(configured: &str, verbose: bool) -> &str {
    let configured = configured.trim();
    if verbose && !configured.eq_ignore_ascii_case("trace") {
        "debug"
    } else if configured.is_empty() {
        "info"
    } else {
        configured
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_level() {
        assert_eq!(resolve_level("info", false), "info");
        assert_eq!(resolve_level("info", true), "debug");
        assert_eq!(resolve_level("trace", true), "trace");
        assert_eq!(resolve_level("warn", false), "warn");
        assert_eq!(resolve_level("", false), "info");
    }
}
