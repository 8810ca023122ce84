//! Client configuration
//!
//! Resolution order for the backend URL: explicit override, then the
//! `LOADOPT_API_URL` environment variable, then the config file, then the
//! built-in default.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable selecting the backend
pub const ENV_BASE_URL: &str = "LOADOPT_API_URL";

/// Backend used when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";

/// What to do with the document when the checkout reports a payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentReconciliation {
    /// Show the confirmation only; the user updates the status by hand
    #[default]
    Manual,
    /// Also mark the customer paid through the status coordinator
    AutoMarkPaid,
}

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend origin, e.g. `https://loads.example.com`
    pub base_url: String,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Handling of checkout completion events
    pub reconciliation: PaymentReconciliation,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 30,
            reconciliation: PaymentReconciliation::Manual,
        }
    }
}

impl ClientConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With backend origin
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// With request timeout
    #[inline]
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// With payment reconciliation mode
    #[inline]
    #[must_use]
    pub fn with_reconciliation(mut self, mode: PaymentReconciliation) -> Self {
        self.reconciliation = mode;
        self
    }

    /// Request timeout as a [`Duration`]
    #[inline]
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Parse a TOML configuration
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] for an empty base URL or a zero timeout.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an optional file, then apply the environment override
    ///
    /// # Errors
    /// Fails when the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.display().to_string(),
                    source,
                })?;
                Self::from_toml_str(&raw)?
            }
            None => Self::default(),
        };
        Ok(config.with_base_url_override(std::env::var(ENV_BASE_URL).ok()))
    }

    /// Replace the base URL when `value` is a non-empty override
    #[must_use]
    pub fn with_base_url_override(self, value: Option<String>) -> Self {
        match value.map(|v| v.trim().to_string()) {
            Some(url) if !url.is_empty() => self.with_base_url(url),
            _ => self,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("base_url must not be empty".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = ClientConfig::new();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.reconciliation, PaymentReconciliation::Manual);
    }

    #[test]
    fn parses_partial_toml() {
        let config = ClientConfig::from_toml_str(
            r#"
            base_url = "https://loads.example.com"
            reconciliation = "auto_mark_paid"
            "#,
        )
        .unwrap();
        assert_eq!(config.base_url, "https://loads.example.com");
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.reconciliation, PaymentReconciliation::AutoMarkPaid);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            ClientConfig::from_toml_str("base_url = \"  \""),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ClientConfig::from_toml_str("request_timeout_secs = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ClientConfig::from_toml_str("base_url = ["),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn override_only_applies_when_non_empty() {
        let base = ClientConfig::new();
        assert_eq!(
            base.clone().with_base_url_override(Some("http://10.0.0.5:3000".into())).base_url,
            "http://10.0.0.5:3000"
        );
        assert_eq!(base.clone().with_base_url_override(Some("   ".into())).base_url, DEFAULT_BASE_URL);
        assert_eq!(base.with_base_url_override(None).base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "request_timeout_secs = 5").unwrap();
        let config = ClientConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.request_timeout_secs, 5);
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = ClientConfig::load(Some(Path::new("/nonexistent/loadopt.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
