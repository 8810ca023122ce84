//! Backend seams
//!
//! The coordinators only ever see these traits, so they run unchanged against
//! the HTTP backend or an in-memory fake.

use crate::error::ClientError;
use async_trait::async_trait;
use loadopt_model::{CargoItem, Carrier, Customer, Document, LoadPlan, Truck};
use serde::Serialize;
use serde_json::Value;

/// Whole-document access to the shared store
///
/// There is no partial update, version token or idempotency key: `write`
/// replaces everything, and concurrent writers are not detected.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch the current full document
    async fn read(&self) -> Result<Document, ClientError>;

    /// Replace the full document; returns what the server stored
    async fn write(&self, document: &Document) -> Result<Document, ClientError>;
}

/// Solver input: the four collections of one snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizeRequest {
    pub trucks: Vec<Truck>,
    pub carriers: Vec<Carrier>,
    pub customers: Vec<Customer>,
    pub items: Vec<CargoItem>,
}

impl OptimizeRequest {
    /// Copy the solver inputs out of a document
    #[must_use]
    pub fn from_document(doc: &Document) -> Self {
        Self {
            trucks: doc.trucks.clone(),
            carriers: doc.carriers.clone(),
            customers: doc.customers.clone(),
            items: doc.items.clone(),
        }
    }
}

/// Remote bin-packing solver
#[async_trait]
pub trait Solver: Send + Sync {
    /// Single opaque request/response
    async fn optimize(&self, request: &OptimizeRequest) -> Result<LoadPlan, ClientError>;
}

/// Payment-provider passthroughs; bodies are opaque to this client
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn payment_config(&self) -> Result<Value, ClientError>;

    async fn create_order(&self, body: &Value) -> Result<Value, ClientError>;

    async fn capture_order(&self, body: &Value) -> Result<Value, ClientError>;
}
