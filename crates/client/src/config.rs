//! Client configuration.
//!
//! Everything here can also be passed explicitly; the environment is only a convenience
//! for the command-line entry point.

use std::time::Duration;

use fleetdeck_core::CsrfToken;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:9001";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Scheme + host (+ optional prefix) the endpoints are relative to.
    pub base_url: String,
    pub csrf_token: Option<CsrfToken>,
    /// Transport timeout; `None` keeps the HTTP client's default.
    pub timeout: Option<Duration>,
    /// Environment options offered for "all environments" expansion.
    pub environment_options: Vec<String>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            csrf_token: None,
            timeout: None,
            environment_options: Vec::new(),
        }
    }

    pub fn with_token(mut self, token: CsrfToken) -> Self {
        self.csrf_token = Some(token);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Read `FLEETDECK_BASE_URL`, `FLEETDECK_CSRF_TOKEN`, `FLEETDECK_TIMEOUT_SECS` and
    /// `FLEETDECK_ENVIRONMENTS` (comma-separated).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("FLEETDECK_BASE_URL").unwrap_or_else(|| {
            tracing::warn!("FLEETDECK_BASE_URL not set; using {}", DEFAULT_BASE_URL);
            DEFAULT_BASE_URL.to_string()
        });
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                name: "FLEETDECK_BASE_URL",
                value: base_url,
            });
        }

        let timeout = match lookup("FLEETDECK_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
                    name: "FLEETDECK_TIMEOUT_SECS",
                    value: raw.clone(),
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        let environment_options = lookup("FLEETDECK_ENVIRONMENTS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|e| !e.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            base_url,
            csrf_token: lookup("FLEETDECK_CSRF_TOKEN").map(CsrfToken::new),
            timeout,
            environment_options,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.timeout, None);
        assert!(cfg.csrf_token.is_none());
        assert!(cfg.environment_options.is_empty());
    }

    #[test]
    fn reads_all_values() {
        let cfg = ClientConfig::from_lookup(lookup(&[
            ("FLEETDECK_BASE_URL", "https://admin.example.com"),
            ("FLEETDECK_CSRF_TOKEN", "abc"),
            ("FLEETDECK_TIMEOUT_SECS", "30"),
            ("FLEETDECK_ENVIRONMENTS", "dev, prod,,"),
        ]))
        .unwrap();
        assert_eq!(cfg.base_url, "https://admin.example.com");
        assert_eq!(cfg.csrf_token, Some(CsrfToken::new("abc")));
        assert_eq!(cfg.timeout, Some(Duration::from_secs(30)));
        assert_eq!(cfg.environment_options, vec!["dev", "prod"]);
    }

    #[test]
    fn rejects_bad_values() {
        let err =
            ClientConfig::from_lookup(lookup(&[("FLEETDECK_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                name: "FLEETDECK_TIMEOUT_SECS",
                value: "soon".into()
            }
        );
        assert!(ClientConfig::from_lookup(lookup(&[("FLEETDECK_BASE_URL", "ftp://x")])).is_err());
    }
}
