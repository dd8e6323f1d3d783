//! # Structured Logging
//!
//! The protocol crate only emits `tracing` events: `block admitted` and
//! `evidence verified` at debug, `block rejected` at warn with the
//! rejection kind as a field. This module installs the subscriber that
//! renders them for `meridian-node`.
//!
//! Events go to stderr. Stdout is reserved for the command's own output,
//! so `meridian-node validate ... > verdict.txt` captures only the verdict.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format, selected by `--log-format` or `MERIDIAN_LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines, one per event.
    Pretty,
    /// One JSON object per event; `height` and `kind` become JSON fields.
    Json,
}

impl LogFormat {
    /// Parse a format string. Accepts "json" or "pretty" (case-insensitive).
    /// Returns `Pretty` for any unrecognized value.
    pub fn from_str_lossy(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Install the global subscriber for one `meridian-node` invocation.
///
/// `default_level` is the per-command filter (`validate` keeps the protocol
/// crate at `warn` so only rejections show). `RUST_LOG` replaces it when
/// set, e.g. to see every admitted block and verified evidence item:
///
/// ```text
/// RUST_LOG=meridian_protocol=debug meridian-node validate --block b.json
/// ```
///
/// Panics if a subscriber is already installed.
pub fn init_logging(default_level: &str, format: LogFormat) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_file(false)
                        .with_line_number(false),
                )
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr).with_target(true))
                .init();
        }
    }

    tracing::debug!(?format, "logging initialized");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parsing_is_lossy() {
        assert_eq!(LogFormat::from_str_lossy("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::from_str_lossy("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str_lossy("xml"), LogFormat::Pretty);
    }
}
