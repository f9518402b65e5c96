//! Logging System
//!
//! Installs a `tracing-subscriber` registry for the CLI. The level comes from
//! the caller; `FLATFS_LOG` overrides it with a full `EnvFilter` directive
//! (for example `flatfs::sql=trace,info`).

use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::FsError;

/// Environment variable holding a filter directive that replaces the level.
pub const LOG_ENV: &str = "FLATFS_LOG";

/// Build the filter: `FLATFS_LOG` when set, otherwise `level`.
///
/// # Errors
///
/// - [`FsError::InvalidConfig`] if the directive does not parse
pub fn build_env_filter(level: &str) -> Result<EnvFilter, FsError> {
    let directive = match std::env::var(LOG_ENV) {
        Ok(env) if !env.trim().is_empty() => env,
        _ => level.to_string(),
    };
    EnvFilter::try_new(&directive).map_err(|e| FsError::InvalidConfig {
        field: "log_level",
        reason: format!("{directive:?}: {e}"),
    })
}

/// Initialize the global subscriber, writing to stderr.
///
/// Text output by default, one JSON object per event when `json` is set.
///
/// # Errors
///
/// - [`FsError::InvalidConfig`] if the filter is invalid or a global
///   subscriber is already installed
pub fn init_logging(level: &str, json: bool) -> Result<(), FsError> {
    let filter = build_env_filter(level)?;
    let base_subscriber = Registry::default().with(filter);

    let installed = if json {
        base_subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        base_subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };
    installed.map_err(|e| FsError::InvalidConfig {
        field: "logging",
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_directive_parses() {
        assert!(build_env_filter("debug").is_ok());
        assert!(build_env_filter("flatfs=trace,warn").is_ok());
    }
}
