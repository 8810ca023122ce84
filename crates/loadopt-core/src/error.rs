//! Error types for the coordination layer
//!
//! - [`ValidationError`]: a precondition failed locally, no request was issued
//! - [`SyncError`]: anything a session operation can return

use loadopt_client::ClientError;
use loadopt_model::{EntityId, EntityKind};

/// Local precondition failure
///
/// Display strings are the user-facing notice bodies.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Cargo draft without a name
    #[error("Item name is required.")]
    MissingName,

    /// No snapshot loaded yet
    #[error("Data not loaded yet.")]
    NotLoaded,

    /// Optimization requested with an empty fleet
    #[error("Add trucks in the web Advanced Settings first.")]
    NoTrucks,

    /// Optimization requested without cargo
    #[error("Add cargo items in the Cargo tab first.")]
    NoItems,

    /// A solver run is already outstanding for this session
    #[error("Optimization already in progress.")]
    OptimizeInFlight,

    /// Status change for a customer missing from the snapshot
    #[error("No customer with id {0}.")]
    UnknownCustomer(EntityId),

    /// The id counter cannot advance past its current value
    #[error("No {0} ids left to allocate.")]
    CounterExhausted(EntityKind),
}

impl ValidationError {
    /// Notice title
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Self::MissingName | Self::UnknownCustomer(_) | Self::CounterExhausted(_) => {
                "Validation"
            }
            Self::NotLoaded => "Not ready",
            Self::NoTrucks => "No trucks",
            Self::NoItems => "No items",
            Self::OptimizeInFlight => "Busy",
        }
    }
}

/// Session operation error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyncError {
    /// Backend call failed
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Rejected before any request
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl SyncError {
    /// Check if the backend could not be reached at all
    #[inline]
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Client(e) if e.is_network())
    }

    /// Check if the operation was rejected locally
    #[inline]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// The validation failure, if any
    #[must_use]
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(v) => Some(v),
            Self::Client(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_are_notice_bodies() {
        assert_eq!(ValidationError::MissingName.to_string(), "Item name is required.");
        assert_eq!(ValidationError::NoTrucks.title(), "No trucks");
        assert_eq!(
            ValidationError::NoItems.to_string(),
            "Add cargo items in the Cargo tab first."
        );
    }

    #[test]
    fn classification() {
        let net: SyncError = ClientError::Network("refused".into()).into();
        assert!(net.is_network());
        assert!(!net.is_validation());

        let server: SyncError = ClientError::Server {
            status: 500,
            message: "boom".into(),
        }
        .into();
        assert!(!server.is_network());
        assert_eq!(server.to_string(), "boom");

        let v: SyncError = ValidationError::NotLoaded.into();
        assert!(v.is_validation());
        assert_eq!(v.validation(), Some(&ValidationError::NotLoaded));
    }
}
