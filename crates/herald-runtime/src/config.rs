//! Configuration for the Herald runtime.
//!
//! Configuration is layered with figment: built-in defaults, then an optional
//! `herald.toml`, then `HERALD_*` environment variables. Nested keys use a
//! double underscore, e.g. `HERALD_LOGGING__LEVEL=debug`.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use crate::error::RuntimeResult;

/// The environment variable prefix for configuration overrides.
const ENV_PREFIX: &str = "HERALD_";

/// The default configuration file name.
const CONFIG_FILE: &str = "herald.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeraldConfig {
    /// The agent's name, used to compile directed-at-me patterns.
    #[serde(default = "default_name")]
    pub name: String,

    /// An optional shorter alias the agent also answers to.
    #[serde(default)]
    pub alias: Option<String>,

    /// Buffer size of the adapter-to-dispatcher event channel.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for HeraldConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            alias: None,
            event_buffer: default_event_buffer(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_name() -> String {
    "herald".to_string()
}

fn default_event_buffer() -> usize {
    64
}

impl HeraldConfig {
    /// Loads configuration from `herald.toml` in the current directory,
    /// layered with environment overrides.
    pub fn load() -> RuntimeResult<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Loads configuration from a specific file, layered with environment
    /// overrides. A missing file is not an error; defaults apply.
    pub fn load_from(path: &Path) -> RuntimeResult<Self> {
        let config = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        Ok(config)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single-line compact output.
    #[default]
    Compact,
    /// Standard multi-field output.
    Full,
    /// Multi-line human-friendly output.
    Pretty,
    /// Newline-delimited JSON (requires the `json-log` feature).
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Base log level (trace, debug, info, warn, error). `RUST_LOG`
    /// overrides this when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include thread IDs in output.
    #[serde(default)]
    pub thread_ids: bool,

    /// Include source file and line number in output.
    #[serde(default)]
    pub file_location: bool,

    /// Write to this file instead of stdout.
    #[serde(default)]
    pub file_path: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            thread_ids: false,
            file_location: false,
            file_path: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HeraldConfig::default();
        assert_eq!(config.name, "herald");
        assert_eq!(config.alias, None);
        assert_eq!(config.event_buffer, 64);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Compact);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        figment::Jail::expect_with(|_| {
            let config = HeraldConfig::load_from(Path::new("does-not-exist.toml")).unwrap();
            assert_eq!(config.name, "herald");
            Ok(())
        });
    }

    #[test]
    fn test_toml_layer_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "herald.toml",
                r#"
                    name = "hal"
                    alias = "computer"

                    [logging]
                    level = "debug"
                    format = "pretty"
                "#,
            )?;

            let config = HeraldConfig::load_from(Path::new("herald.toml")).unwrap();
            assert_eq!(config.name, "hal");
            assert_eq!(config.alias.as_deref(), Some("computer"));
            assert_eq!(config.logging.level, "debug");
            assert_eq!(config.logging.format, LogFormat::Pretty);
            Ok(())
        });
    }

    #[test]
    fn test_env_layer_wins() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("herald.toml", r#"name = "hal""#)?;
            jail.set_env("HERALD_NAME", "marvin");
            jail.set_env("HERALD_LOGGING__LEVEL", "trace");

            let config = HeraldConfig::load_from(Path::new("herald.toml")).unwrap();
            assert_eq!(config.name, "marvin");
            assert_eq!(config.logging.level, "trace");
            Ok(())
        });
    }
}
