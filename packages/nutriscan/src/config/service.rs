use super::{DEFAULT_BASE_URL, DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_TIMEOUT_MS};
use crate::error::{ConfigError, Error};
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;

///
/// Location and limits of the remote inference service
///
#[derive(Clone, Debug, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "ServiceConfig::default_base_url")]
    pub base_url: String,

    #[serde(default = "ServiceConfig::default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "ServiceConfig::default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            base_url: ServiceConfig::default_base_url(),
            timeout_ms: ServiceConfig::default_timeout_ms(),
            connect_timeout_ms: ServiceConfig::default_connect_timeout_ms(),
        }
    }
}

impl ServiceConfig {
    pub fn with_base_url(base_url: &str) -> Self {
        ServiceConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        }
    }

    pub fn default_base_url() -> String {
        DEFAULT_BASE_URL.to_string()
    }

    pub fn default_timeout_ms() -> u64 {
        DEFAULT_TIMEOUT_MS
    }

    pub fn default_connect_timeout_ms() -> u64 {
        DEFAULT_CONNECT_TIMEOUT_MS
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    ///
    /// Checks the base url parses as an http or https address and the timeout is usable
    ///
    pub fn validate(&self) -> Result<(), Error> {
        let url = Url::parse(&self.base_url).map_err(|_| ConfigError::InvalidBaseUrl {
            url: self.base_url.to_owned(),
        })?;

        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.to_owned(),
            }
            .into());
        }

        if self.timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout.into());
        }

        Ok(())
    }

    ///
    /// Full url for a service path such as `/predict`
    /// Tolerates a trailing slash on the configured base url
    ///
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let config = ServiceConfig::with_base_url("http://10.0.0.7:5000/");
        assert_eq!(config.endpoint("/predict"), "http://10.0.0.7:5000/predict");

        let config = ServiceConfig::with_base_url("https://api.example.com/v1");
        assert_eq!(
            config.endpoint("/upload-report"),
            "https://api.example.com/v1/upload-report"
        );
    }

    #[test]
    fn validate_rejects_bad_urls() {
        assert!(ServiceConfig::with_base_url("http://127.0.0.1:5000")
            .validate()
            .is_ok());
        assert!(ServiceConfig::with_base_url("127.0.0.1:5000")
            .validate()
            .is_err());
        assert!(ServiceConfig::with_base_url("ftp://files.example.com")
            .validate()
            .is_err());
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let config = ServiceConfig {
            timeout_ms: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::ZeroTimeout)));
    }
}
