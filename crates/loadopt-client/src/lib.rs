//! Load Optimizer transport
//!
//! Typed access to the backend:
//! - [`DocumentStore`]: whole-document `GET`/`PUT /api/data`
//! - [`Solver`]: `POST /api/optimize`
//! - [`PaymentProvider`]: opaque payment-provider passthroughs
//! - [`HttpBackend`]: reqwest implementation of all three
//! - [`ClientConfig`]: backend selection and timeouts
//!
//! # Example
//!
//! ```rust,ignore
//! use loadopt_client::{ClientConfig, DocumentStore, HttpBackend};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = HttpBackend::new(&ClientConfig::load(None)?)?;
//! let doc = backend.read().await?;
//! println!("{} items", doc.items.len());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod error;
pub mod http;
pub mod store;

pub use config::{ClientConfig, PaymentReconciliation, DEFAULT_BASE_URL, ENV_BASE_URL};
pub use error::{error_message, ClientError, ConfigError};
pub use http::HttpBackend;
pub use store::{DocumentStore, OptimizeRequest, PaymentProvider, Solver};
