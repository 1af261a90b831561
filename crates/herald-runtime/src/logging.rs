//! Logging setup for the Herald runtime.
//!
//! A thin, configuration-driven wrapper over `tracing-subscriber`. The base
//! level comes from [`LoggingConfig`], but an explicit `RUST_LOG` environment
//! variable always wins.
//!
//! ```rust,ignore
//! let config = HeraldConfig::load()?;
//! logging::init_from_config(&config.logging);
//! ```

use std::ffi::OsStr;
use std::path::Path;

use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LogFormat, LoggingConfig};

/// Initializes logging from configuration.
///
/// Safe to call more than once; a second initialization is silently ignored.
pub fn init_from_config(config: &LoggingConfig) {
    let _ = try_init_from_config(config);
}

/// Initializes logging from configuration, returning an error if a
/// subscriber is already installed.
pub fn try_init_from_config(config: &LoggingConfig) -> Result<(), TryInitError> {
    let filter = build_filter(&config.level);

    // Macro rather than a generic helper: the fmt layer's formatter type
    // changes with every builder call, which defeats a fn signature.
    macro_rules! configure {
        ($layer:expr) => {
            $layer
                .with_thread_ids(config.thread_ids)
                .with_file(config.file_location)
                .with_line_number(config.file_location)
        };
    }

    macro_rules! init_with_writer {
        ($writer:expr) => {
            match config.format {
                #[cfg(feature = "json-log")]
                LogFormat::Json => {
                    let layer = fmt::layer().json().with_writer($writer);
                    tracing_subscriber::registry()
                        .with(layer)
                        .with(filter)
                        .try_init()
                }
                #[cfg(not(feature = "json-log"))]
                LogFormat::Json => {
                    // Without the feature, fall back to compact output.
                    let layer = configure!(fmt::layer().compact().with_writer($writer));
                    tracing_subscriber::registry()
                        .with(layer)
                        .with(filter)
                        .try_init()
                }
                LogFormat::Compact => {
                    let layer = configure!(fmt::layer().compact().with_writer($writer));
                    tracing_subscriber::registry()
                        .with(layer)
                        .with(filter)
                        .try_init()
                }
                LogFormat::Full => {
                    let layer = configure!(fmt::layer().with_writer($writer));
                    tracing_subscriber::registry()
                        .with(layer)
                        .with(filter)
                        .try_init()
                }
                LogFormat::Pretty => {
                    let layer = configure!(fmt::layer().pretty().with_writer($writer));
                    tracing_subscriber::registry()
                        .with(layer)
                        .with(filter)
                        .try_init()
                }
            }
        };
    }

    match &config.file_path {
        Some(path) => {
            let appender = tracing_appender::rolling::never(
                path.parent().unwrap_or_else(|| Path::new(".")),
                path.file_name().unwrap_or_else(|| OsStr::new("herald.log")),
            );
            init_with_writer!(appender)
        }
        None => init_with_writer!(std::io::stdout),
    }
}

fn build_filter(base_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(base_level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_uses_base_level() {
        // RUST_LOG is not set in the test environment for this name.
        let filter = build_filter("debug");
        assert!(filter.to_string().contains("debug"));
    }
}
