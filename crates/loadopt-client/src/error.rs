//! Error types for the transport layer
//!
//! - Transport failures with no response
//! - Non-success HTTP statuses with the server's message
//! - Undecodable success bodies
//! - Configuration loading failures

use reqwest::StatusCode;

/// Remote call failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// The request never produced a response
    #[error("{0}")]
    Network(String),

    /// The server answered with a non-success status
    #[error("{message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// `error` field of the body, or `HTTP {status}`
        message: String,
    },

    /// A success response whose body could not be decoded
    #[error("invalid response from server: {0}")]
    Decode(String),
}

impl ClientError {
    /// Build a server error from a raw error body
    #[must_use]
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        Self::Server {
            status: status.as_u16(),
            message: error_message(status, body),
        }
    }

    /// Status code, if the server answered
    #[inline]
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for transport failures
    #[inline]
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

/// Extract `{error: string}` from a body, falling back to `HTTP {status}`
#[must_use]
pub fn error_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("error")
                .and_then(serde_json::Value::as_str)
                .filter(|msg| !msg.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("failed to read configuration {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`crate::ClientConfig`]
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is present but unusable
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
