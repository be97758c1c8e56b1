use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{Result, SkyViewError};

/// Filter used when `RUST_LOG` is not set, e.g. `skyview=info`.
pub fn default_directive(level: &str) -> String {
    format!("skyview={}", level.trim().to_lowercase())
}

fn env_filter(level: &str) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive(level)))
        .map_err(|e| SkyViewError::Config(format!("invalid log level {:?}: {}", level, e)))
}

/// Installs the global subscriber. Output goes to stderr so stdout stays free
/// for frame data; `json` switches from the compact text format to one JSON
/// object per event.
pub fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = env_filter(level)?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if json {
        registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_ansi(false)
                    .json(),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .compact(),
            )
            .try_init()
    };
    installed.map_err(|e| SkyViewError::Config(format!("logging already initialised: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive("info"), "skyview=info");
        assert_eq!(default_directive(" DEBUG "), "skyview=debug");
    }

    #[test]
    fn test_known_levels_build_a_filter() {
        for level in ["error", "warn", "info", "debug", "trace", "off"] {
            assert!(EnvFilter::try_new(default_directive(level)).is_ok(), "{}", level);
        }
    }
}
