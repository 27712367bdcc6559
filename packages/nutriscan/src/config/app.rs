use super::{LogConfig, ServiceConfig, DEFAULT_CONFIG_FILE_PATH, NS_PREFIX};
use crate::error::{ConfigError, Error};
use crate::log::CONFIG;
use crate::Args;
use config::{Config, Environment};
use regex::Regex;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::debug;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Config defaults to a file called `nutriscan.toml` in the current directory.
/// Supports TOML and JSON.
/// Variable names should match the struct field names.
///
/// ENV vars can be used to override file settings.
///
/// ENV vars must be prefixed with `NS_`, nested values use `__`
/// eg `NS_SERVICE__BASE_URL`
///
impl AppConfig {
    pub fn default_path() -> String {
        DEFAULT_CONFIG_FILE_PATH.to_string()
    }

    pub fn load(args: &Args) -> Result<AppConfig, Error> {
        if !PathBuf::from(&args.config_file_path).exists() {
            debug!(
                target: CONFIG,
                msg = "Configuration file was not found, loading from environment variables",
                path = args.config_file_path.as_str()
            );
        }
        let mut config = AppConfig::build(&args.config_file_path)?;

        // If log level is default, it has not been set by the user in config
        if config.log.level == LogConfig::default_log_level() {
            config.log.level = args.log_level;
        }

        // If log format is default, it has not been set by the user in config
        if config.log.format == LogConfig::default_log_format() {
            config.log.format = args.log_format;
        }

        if let Some(base_url) = &args.base_url {
            config.service.base_url = base_url.to_owned();
        }

        config.service.validate()?;

        Ok(config)
    }

    pub fn build(path: &str) -> Result<Self, Error> {
        // For parsing nested env values such as NS_SERVICE__BASE_URL, NS_LOG__LEVEL
        let ns_env_source = Environment::with_prefix(NS_PREFIX)
            .try_parsing(true)
            .separator("__")
            .prefix_separator("_");

        let config: Self = Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(ns_env_source)
            .build()?
            .try_deserialize()
            .map_err(|err| match err {
                config::ConfigError::Message(ref s) => match s {
                    s if s.contains("missing field") => {
                        let name = extract_field_name(s).unwrap_or_else(|| "unknown".to_string());
                        ConfigError::MissingParameter { name }
                    }
                    s if s.contains("unknown variant") => {
                        let (name, value) = extract_invalid_variant(s);
                        ConfigError::InvalidParameter { name, value }
                    }
                    _ => err.into(),
                },
                _ => err.into(),
            })?;

        debug!(target: CONFIG, msg = "Configuration loaded", path, base_url = config.service.base_url);

        Ok(config)
    }
}

///
/// Extracts a field name (if present) from a config::ConfigError::Message
/// This is called in `build` if a ConfigError message contains the string `missing field`
///
fn extract_field_name(input: &str) -> Option<String> {
    let re = Regex::new(r"`(\w+)`").ok()?;
    re.captures(input)
        .and_then(|caps| caps.get(1).map(|m| m.as_str().to_string()))
}

///
/// Extracts the rejected value and the first expected variant from a serde message
///
/// Error string is "unknown variant `{value}`, expected one of `a`, `b`"
///
fn extract_invalid_variant(input: &str) -> (String, String) {
    let default_name = "unknown".to_string();

    let re = match Regex::new(r"`([^`]*)`") {
        Ok(re) => re,
        Err(_) => return (default_name, String::new()),
    };

    let mut values = re
        .captures_iter(input)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()));

    let value = values.next().unwrap_or_default();
    let expected = values.collect::<Vec<_>>().join("|");

    let name = if expected.is_empty() {
        default_name
    } else {
        expected
    };

    (name, value)
}
