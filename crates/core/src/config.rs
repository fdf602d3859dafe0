//! Client runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the transport. Binaries
//! read environment variables and hand the raw values to the parsing helpers here, so nothing in
//! this crate touches the process environment while a request is in flight.

use crate::constants::{DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS};
use crate::{ClientError, ClientResult};
use std::time::Duration;

/// Client configuration resolved at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    api_token: Option<String>,
    timeout: Duration,
}

impl ClientConfig {
    /// Create a new `ClientConfig`.
    ///
    /// The base URL must use `http` or `https` and is stored without a trailing slash, so resource
    /// paths (which always start with `/`) can be appended directly. A blank token is treated as
    /// no token.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidConfig`] if the URL is empty or has an unsupported scheme, or
    /// if the timeout is zero.
    pub fn new(
        base_url: impl AsRef<str>,
        api_token: Option<String>,
        timeout: Duration,
    ) -> ClientResult<Self> {
        let base_url = base_url.as_ref().trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(ClientError::InvalidConfig("base URL cannot be empty".into()));
        }

        let scheme_ok = base_url
            .split_once("://")
            .is_some_and(|(scheme, rest)| matches!(scheme, "http" | "https") && !rest.is_empty());
        if !scheme_ok {
            return Err(ClientError::InvalidConfig(format!(
                "base URL must start with http:// or https://, got `{base_url}`"
            )));
        }

        if timeout.is_zero() {
            return Err(ClientError::InvalidConfig(
                "request timeout must be greater than zero".into(),
            ));
        }

        Ok(Self {
            base_url: base_url.to_owned(),
            api_token: api_token
                .map(|t| t.trim().to_owned())
                .filter(|t| !t.is_empty()),
            timeout,
        })
    }

    /// Build a configuration from optional raw values, applying defaults for missing ones.
    pub fn from_env_values(
        base_url: Option<String>,
        api_token: Option<String>,
        timeout_secs: Option<String>,
    ) -> ClientResult<Self> {
        let base_url = base_url
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_owned());
        let timeout = timeout_from_env_value(timeout_secs)?;
        Self::new(base_url, api_token, timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_token(&self) -> Option<&str> {
        self.api_token.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Absolute URL for a resource path such as `/hospital/drugs/4`.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Parse a request timeout in whole seconds from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default timeout.
pub fn timeout_from_env_value(value: Option<String>) -> ClientResult<Duration> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let Some(value) = value else {
        return Ok(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    };

    let secs = value.parse::<u64>().map_err(|_| {
        ClientError::InvalidConfig(format!("timeout must be a whole number of seconds, got `{value}`"))
    })?;
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_strips_trailing_slash() {
        let cfg = ClientConfig::new("http://localhost:3000/", None, Duration::from_secs(5)).unwrap();
        assert_eq!(cfg.base_url(), "http://localhost:3000");
        assert_eq!(cfg.url_for("/patients"), "http://localhost:3000/patients");
    }

    #[test]
    fn test_new_rejects_missing_scheme() {
        let err = ClientConfig::new("localhost:3000", None, Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, ClientError::InvalidConfig(msg) if msg.contains("http://")));
    }

    #[test]
    fn test_new_rejects_zero_timeout() {
        let err = ClientConfig::new("http://x.test", None, Duration::ZERO).unwrap_err();
        assert!(matches!(err, ClientError::InvalidConfig(msg) if msg.contains("timeout")));
    }

    #[test]
    fn test_blank_token_is_dropped() {
        let cfg = ClientConfig::new("https://api.clinic.test", Some("  ".into()), Duration::from_secs(1))
            .unwrap();
        assert_eq!(cfg.api_token(), None);
    }

    #[test]
    fn test_from_env_values_applies_defaults() {
        let cfg = ClientConfig::from_env_values(None, None, None).unwrap();
        assert_eq!(cfg.base_url(), DEFAULT_API_URL);
        assert_eq!(cfg.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_timeout_from_env_value_rejects_garbage() {
        assert!(timeout_from_env_value(Some("soon".into())).is_err());
        assert_eq!(
            timeout_from_env_value(Some(" 12 ".into())).unwrap(),
            Duration::from_secs(12)
        );
    }
}
