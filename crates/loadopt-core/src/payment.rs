//! Payment bridge between the embedded checkout page and the host
//!
//! The checkout page is server-rendered and talks back over a one-way channel
//! of raw JSON strings. Messages are untrusted:
//! - `{"type":"paid","captureId":...}` confirms a capture
//! - `{"type":"cancelled"}` reports the user backing out
//! - anything else, including malformed JSON, is ignored
//!
//! Completion does not touch the document unless
//! [`PaymentReconciliation::AutoMarkPaid`] is configured.

use crate::customers::{CustomersSession, StatusChoice};
use crate::notice::{Notice, Notifier};
use loadopt_client::PaymentReconciliation;
use loadopt_model::{Customer, EntityId};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;

pub const PAID_TITLE: &str = "\u{2705} Payment Successful!";
pub const CANCELLED_TITLE: &str = "Cancelled";
pub const CANCELLED_BODY: &str = "Payment was cancelled.";
pub const LOAD_FAILED_TITLE: &str = "Could not load payment page";
pub const LOAD_FAILED_HINT: &str =
    "Make sure the server is running and the backend URL is correct.";

/// Checkout page for a customer
#[must_use]
pub fn checkout_url(base_url: &str, customer_id: EntityId) -> String {
    format!("{}/pay/{customer_id}", base_url.trim_end_matches('/'))
}

/// One decoded bridge message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeMessage {
    Paid { capture_id: Option<String> },
    Cancelled,
    /// Valid JSON without a recognised `type`
    Unknown,
    /// Not JSON; carries the parser error
    Malformed(String),
}

impl BridgeMessage {
    /// Decode a raw message; never fails
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => return Self::Malformed(e.to_string()),
        };
        match value.get("type").and_then(Value::as_str) {
            Some("paid") => Self::Paid {
                capture_id: capture_id(value.get("captureId")),
            },
            Some("cancelled") => Self::Cancelled,
            _ => Self::Unknown,
        }
    }
}

fn capture_id(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Embedded-page side of the channel
///
/// Posting is best effort: a closed host drops the message silently.
#[derive(Debug, Clone)]
pub struct BridgeSender {
    tx: mpsc::UnboundedSender<String>,
}

impl BridgeSender {
    pub fn post(&self, raw: impl Into<String>) {
        if self.tx.send(raw.into()).is_err() {
            tracing::debug!("payment bridge closed, message dropped");
        }
    }
}

/// Checkout page load progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    /// Terminal; the page is not retried
    Failed,
}

impl LoadState {
    /// Title and hint shown for a failed load
    #[must_use]
    pub fn failure_text(self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::Failed => Some((LOAD_FAILED_TITLE, LOAD_FAILED_HINT)),
            Self::Loading | Self::Ready => None,
        }
    }
}

/// Where the host should go next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Back,
}

/// Successful capture awaiting acknowledgement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentConfirmation {
    pub customer_id: EntityId,
    pub customer_name: String,
    pub capture_id: Option<String>,
}

impl PaymentConfirmation {
    /// Notice body: customer name and capture id, or a dash when absent
    #[must_use]
    pub fn body(&self) -> String {
        format!(
            "{}\nCapture ID: {}",
            self.customer_name,
            self.capture_id.as_deref().unwrap_or("\u{2014}")
        )
    }

    /// "Done" pressed
    #[must_use]
    pub fn acknowledge(self) -> Navigation {
        Navigation::Back
    }
}

/// Result of handling one bridge message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeOutcome {
    Paid(PaymentConfirmation),
    Cancelled,
}

/// Host side of one checkout
pub struct PaymentBridge {
    customer: Customer,
    url: String,
    rx: mpsc::UnboundedReceiver<String>,
    state: LoadState,
    notifier: Arc<dyn Notifier>,
    reconcile: Option<CustomersSession>,
}

impl std::fmt::Debug for PaymentBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentBridge")
            .field("customer", &self.customer.id)
            .field("url", &self.url)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Open a checkout for `customer` against `base_url`
pub fn bridge_channel(
    base_url: &str,
    customer: Customer,
    notifier: Arc<dyn Notifier>,
) -> (BridgeSender, PaymentBridge) {
    let (tx, rx) = mpsc::unbounded_channel();
    let url = checkout_url(base_url, customer.id);
    let bridge = PaymentBridge {
        customer,
        url,
        rx,
        state: LoadState::Loading,
        notifier,
        reconcile: None,
    };
    (BridgeSender { tx }, bridge)
}

impl PaymentBridge {
    /// Mark the customer paid through `customers` when configured to
    #[must_use]
    pub fn with_reconciliation(
        mut self,
        mode: PaymentReconciliation,
        customers: &CustomersSession,
    ) -> Self {
        self.reconcile = match mode {
            PaymentReconciliation::AutoMarkPaid => Some(customers.clone()),
            PaymentReconciliation::Manual => None,
        };
        self
    }

    #[inline]
    #[must_use]
    pub fn checkout_url(&self) -> &str {
        &self.url
    }

    #[inline]
    #[must_use]
    pub fn customer(&self) -> &Customer {
        &self.customer
    }

    #[inline]
    #[must_use]
    pub fn load_state(&self) -> LoadState {
        self.state
    }

    pub fn on_load_end(&mut self) {
        if self.state == LoadState::Loading {
            self.state = LoadState::Ready;
        }
    }

    pub fn on_load_error(&mut self) {
        if self.state != LoadState::Failed {
            tracing::warn!(url = %self.url, "checkout page failed to load");
        }
        self.state = LoadState::Failed;
    }

    /// Handle one raw message
    ///
    /// Emits exactly one notice for `paid` and `cancelled` and nothing for
    /// anything else.
    pub async fn handle(&self, raw: &str) -> Option<BridgeOutcome> {
        match BridgeMessage::parse(raw) {
            BridgeMessage::Paid { capture_id } => {
                let confirmation = PaymentConfirmation {
                    customer_id: self.customer.id,
                    customer_name: self.customer.name.clone(),
                    capture_id,
                };
                tracing::info!(
                    customer = self.customer.id,
                    capture_id = confirmation.capture_id.as_deref().unwrap_or(""),
                    "payment captured"
                );
                self.notifier
                    .notify(Notice::success(PAID_TITLE, confirmation.body()));
                if let Some(customers) = &self.reconcile {
                    // failures are surfaced by the customers session
                    let _ = customers
                        .select_status(self.customer.id, StatusChoice::MarkPaid)
                        .await;
                }
                Some(BridgeOutcome::Paid(confirmation))
            }
            BridgeMessage::Cancelled => {
                self.notifier
                    .notify(Notice::info(CANCELLED_TITLE, CANCELLED_BODY));
                Some(BridgeOutcome::Cancelled)
            }
            BridgeMessage::Unknown => {
                tracing::debug!("ignoring bridge message without known type");
                None
            }
            BridgeMessage::Malformed(error) => {
                tracing::debug!(%error, "ignoring malformed bridge message");
                None
            }
        }
    }

    /// Wait for the next message that produces an outcome
    ///
    /// Returns `None` once every sender is gone.
    pub async fn next_outcome(&mut self) -> Option<BridgeOutcome> {
        while let Some(raw) = self.rx.recv().await {
            if let Some(outcome) = self.handle(&raw).await {
                return Some(outcome);
            }
        }
        None
    }
}
