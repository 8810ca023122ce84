//! Load Optimizer client core
//!
//! Screen sessions over the shared logistics document:
//! - [`CargoSession`]: add and remove cargo with fetch-merge-write
//! - [`CustomersSession`]: optimistic payment-status edits with reload on failure
//! - [`OptimizeSession`]: guarded solver runs through the [`OptimizationGateway`]
//! - [`FleetSession`] / [`DashboardSession`]: read-only views
//! - [`PaymentBridge`]: untrusted checkout messages turned into outcomes
//!
//! Every session keeps its own snapshot. Nothing is cached across screens.
//!
//! # Example
//!
//! ```rust,ignore
//! use loadopt_client::{ClientConfig, HttpBackend};
//! use loadopt_core::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = Arc::new(HttpBackend::new(&ClientConfig::load(None)?)?);
//! let cargo = CargoSession::new(backend, Arc::new(TracingNotifier));
//!
//! cargo.activate().await?;
//! let added = cargo.add_item(&CargoDraft::named("Pallet A").with_qty("2")).await?;
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod cargo;
pub mod customers;
pub mod error;
pub mod notice;
pub mod optimize;
pub mod overview;
pub mod payment;
pub mod session;

pub use cargo::{CargoDraft, CargoSession, Confirmation};
pub use customers::{CustomersSession, StatusChoice, StatusPicker};
pub use error::{SyncError, ValidationError};
pub use notice::{Notice, NoticeKind, NoticeLog, Notifier, TracingNotifier};
pub use optimize::{OptimizationGateway, OptimizeSession};
pub use overview::{DashboardSession, FleetSession};
pub use payment::{
    bridge_channel, checkout_url, BridgeMessage, BridgeOutcome, BridgeSender, LoadState,
    Navigation, PaymentBridge, PaymentConfirmation,
};
pub use session::{Applied, Screen, Session};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving screen sessions
    pub use crate::{
        Applied, CargoDraft, CargoSession, Confirmation, CustomersSession, DashboardSession,
        FleetSession, Notifier, OptimizeSession, Screen, StatusChoice, SyncError,
        TracingNotifier,
    };
}
