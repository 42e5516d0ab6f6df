//! Tracing setup for the CLI.
//!
//! Logs go to stderr so stdout stays clean for the import report.
//! `RUST_LOG` overrides `--log-level`; `--verbose` raises the level to debug.

use tracing_subscriber::EnvFilter;

use crate::types::LogLevel;

pub fn init(level: LogLevel, verbose: bool) {
    let level = if verbose { level.max(LogLevel::Debug) } else { level };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    // A second init (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_raises_but_never_lowers() {
        assert_eq!(LogLevel::Warn.max(LogLevel::Debug), LogLevel::Debug);
        assert_eq!(LogLevel::Trace.max(LogLevel::Debug), LogLevel::Trace);
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init(LogLevel::Warn, false);
        init(LogLevel::Debug, true);
    }
}
