//! Testing utilities for the Load Optimizer workspace
//!
//! Shared fake backend, fixtures, and helpers.

#![allow(missing_docs)]

pub mod backend;
pub mod fixtures;

pub use backend::{network_down, server_error, InMemoryBackend};
pub use fixtures::{customer, empty_fleet_document, item, sample_document, sample_plan, truck};

/// Yield to the scheduler until `cond` holds
///
/// Used with a held [`InMemoryBackend`] to wait until a spawned session call
/// has reached the backend.
pub async fn yield_until(mut cond: impl FnMut() -> bool) {
    for _ in 0..10_000 {
        if cond() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}
