//! Customers screen: optimistic payment-status edits
//!
//! A status change is published to the snapshot immediately and then the
//! whole snapshot is written. When the write fails the change is reverted,
//! the error is surfaced and the session reloads. Nothing is retried.

use crate::error::{SyncError, ValidationError};
use crate::notice::{Notice, Notifier};
use crate::session::{Applied, Screen, Session};
use loadopt_client::DocumentStore;
use loadopt_model::{Customer, EntityId, PaymentStatus};
use std::sync::Arc;

const SAVE_ERROR_TITLE: &str = "Save Error";

/// Entry of the status action sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusChoice {
    MarkPaid,
    MarkPending,
    MarkOverdue,
    Cancel,
}

impl StatusChoice {
    /// Sheet entries in display order
    pub const OPTIONS: [StatusChoice; 4] = [
        Self::MarkPaid,
        Self::MarkPending,
        Self::MarkOverdue,
        Self::Cancel,
    ];

    /// Index of [`StatusChoice::Cancel`] in [`StatusChoice::OPTIONS`]
    pub const CANCEL_INDEX: usize = 3;

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::MarkPaid => "\u{2713} Mark Paid",
            Self::MarkPending => "\u{23f3} Mark Pending",
            Self::MarkOverdue => "\u{26a0} Mark Overdue",
            Self::Cancel => "Cancel",
        }
    }

    /// All labels in display order
    #[must_use]
    pub fn labels() -> [&'static str; 4] {
        Self::OPTIONS.map(Self::label)
    }

    /// Entry at a sheet index
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::OPTIONS.get(index).copied()
    }

    /// Target status; `None` for cancel
    #[must_use]
    pub fn status(self) -> Option<PaymentStatus> {
        match self {
            Self::MarkPaid => Some(PaymentStatus::Paid),
            Self::MarkPending => Some(PaymentStatus::Pending),
            Self::MarkOverdue => Some(PaymentStatus::Overdue),
            Self::Cancel => None,
        }
    }

    /// Sheet title for a customer
    #[must_use]
    pub fn sheet_title(customer: &Customer) -> String {
        format!("Payment status \u{2014} {}", customer.name)
    }
}

impl From<PaymentStatus> for StatusChoice {
    fn from(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Paid => Self::MarkPaid,
            PaymentStatus::Pending => Self::MarkPending,
            PaymentStatus::Overdue => Self::MarkOverdue,
        }
    }
}

/// Action-sheet affordance offered by the front end
pub trait StatusPicker: Send + Sync {
    /// Ask the user which status to apply
    fn pick(&self, customer: &Customer) -> StatusChoice;
}

/// Session behind the customer list
#[derive(Debug, Clone)]
pub struct CustomersSession {
    session: Session,
}

impl CustomersSession {
    pub fn new(store: Arc<dyn DocumentStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            session: Session::new("customers", store, notifier),
        }
    }

    /// Customers as currently displayed, including unacknowledged edits
    #[must_use]
    pub fn customers(&self) -> Vec<Customer> {
        self.session
            .with_snapshot(|doc| doc.map(|d| d.customers.clone()).unwrap_or_default())
    }

    #[must_use]
    pub fn customer(&self, id: EntityId) -> Option<Customer> {
        self.session
            .with_snapshot(|doc| doc.and_then(|d| d.customer(id).cloned()))
    }

    /// Displayed status of a customer
    #[must_use]
    pub fn status_of(&self, id: EntityId) -> Option<PaymentStatus> {
        self.customer(id).map(|c| c.status())
    }

    /// Advance a customer to the next status in the cycle
    ///
    /// # Errors
    /// Unknown ids and missing snapshots are rejected without a request;
    /// a failed write is returned after the session has reloaded.
    pub async fn cycle_status(&self, id: EntityId) -> Result<Applied<PaymentStatus>, SyncError> {
        self.apply(id, PaymentStatus::cycle).await
    }

    /// Apply an action-sheet choice; `Cancel` issues no request
    ///
    /// # Errors
    /// Same as [`CustomersSession::cycle_status`].
    pub async fn select_status(
        &self,
        id: EntityId,
        choice: StatusChoice,
    ) -> Result<Applied<Option<PaymentStatus>>, SyncError> {
        let Some(target) = choice.status() else {
            return Ok(Applied::Committed(None));
        };
        Ok(self.apply(id, move |_| target).await?.map(Some))
    }

    /// Pick through the action sheet when one exists, otherwise cycle
    ///
    /// # Errors
    /// Same as [`CustomersSession::cycle_status`].
    pub async fn change_status(
        &self,
        id: EntityId,
        picker: Option<&dyn StatusPicker>,
    ) -> Result<Applied<Option<PaymentStatus>>, SyncError> {
        match picker {
            Some(picker) => {
                let choice = match self.customer(id) {
                    Some(customer) => picker.pick(&customer),
                    None => return Err(self.reject(ValidationError::UnknownCustomer(id))),
                };
                self.select_status(id, choice).await
            }
            None => Ok(self.cycle_status(id).await?.map(Some)),
        }
    }

    async fn apply<F>(&self, id: EntityId, next: F) -> Result<Applied<PaymentStatus>, SyncError>
    where
        F: FnOnce(PaymentStatus) -> PaymentStatus + Send,
    {
        let result = self
            .session
            .write_optimistic(SAVE_ERROR_TITLE, move |doc| {
                let customer = doc
                    .customers
                    .iter_mut()
                    .find(|c| c.id == id)
                    .ok_or(ValidationError::UnknownCustomer(id))?;
                let status = next(customer.status());
                customer.payment_status = Some(status);
                Ok(status)
            })
            .await;

        match result {
            Ok(Applied::Committed(status)) => {
                tracing::info!(customer = id, status = status.as_str(), "payment status saved");
                Ok(Applied::Committed(status))
            }
            Err(SyncError::Validation(err)) => Err(self.reject(err)),
            other => other,
        }
    }

    fn reject(&self, err: ValidationError) -> SyncError {
        self.session.notify(Notice::error(err.title(), err.to_string()));
        err.into()
    }
}

impl Screen for CustomersSession {
    fn session(&self) -> &Session {
        &self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::NoticeLog;
    use loadopt_test_utils::{sample_document, server_error, InMemoryBackend};

    struct Always(StatusChoice);

    impl StatusPicker for Always {
        fn pick(&self, _customer: &Customer) -> StatusChoice {
            self.0
        }
    }

    async fn loaded() -> (Arc<InMemoryBackend>, Arc<NoticeLog>, CustomersSession) {
        let backend = Arc::new(InMemoryBackend::new(sample_document()));
        let log = Arc::new(NoticeLog::new());
        let customers = CustomersSession::new(backend.clone(), log.clone());
        customers.load().await.unwrap();
        (backend, log, customers)
    }

    #[test]
    fn sheet_options() {
        assert_eq!(
            StatusChoice::labels(),
            ["✓ Mark Paid", "⏳ Mark Pending", "⚠ Mark Overdue", "Cancel"]
        );
        assert_eq!(
            StatusChoice::from_index(StatusChoice::CANCEL_INDEX),
            Some(StatusChoice::Cancel)
        );
        assert_eq!(StatusChoice::from_index(4), None);
        assert_eq!(StatusChoice::from(PaymentStatus::Overdue).status(), Some(PaymentStatus::Overdue));
    }

    #[tokio::test]
    async fn cycle_writes_and_adopts_echo() {
        let (backend, _log, customers) = loaded().await;
        let applied = customers.cycle_status(1).await.unwrap();
        assert_eq!(applied, Applied::Committed(PaymentStatus::Paid));
        assert_eq!(backend.document().customer(1).unwrap().status(), PaymentStatus::Paid);
        assert_eq!(customers.status_of(1), Some(PaymentStatus::Paid));
        assert_eq!(backend.reads(), 1);
    }

    #[tokio::test]
    async fn cancel_issues_no_write() {
        let (backend, _log, customers) = loaded().await;
        let applied = customers.select_status(1, StatusChoice::Cancel).await.unwrap();
        assert_eq!(applied, Applied::Committed(None));
        assert_eq!(backend.writes(), 0);
    }

    #[tokio::test]
    async fn unknown_customer_is_rejected_locally() {
        let (backend, log, customers) = loaded().await;
        let err = customers.cycle_status(42).await.unwrap_err();
        assert_eq!(err.validation(), Some(&ValidationError::UnknownCustomer(42)));
        assert_eq!(backend.writes(), 0);
        assert_eq!(log.notices()[0].title, "Validation");
    }

    #[tokio::test]
    async fn not_loaded_is_rejected() {
        let backend = Arc::new(InMemoryBackend::new(sample_document()));
        let log = Arc::new(NoticeLog::new());
        let customers = CustomersSession::new(backend.clone(), log.clone());
        let err = customers.cycle_status(1).await.unwrap_err();
        assert_eq!(err.validation(), Some(&ValidationError::NotLoaded));
        assert_eq!(backend.writes(), 0);
        assert_eq!(log.notices()[0].title, "Not ready");
    }

    #[tokio::test]
    async fn failed_write_reloads_server_state() {
        let (backend, log, customers) = loaded().await;
        backend.mutate(|doc| {
            if let Some(c) = doc.customers.iter_mut().find(|c| c.id == 1) {
                c.payment_status = Some(PaymentStatus::Overdue);
            }
        });
        backend.fail_next_write(server_error(503, "maintenance"));

        let err = customers
            .select_status(1, StatusChoice::MarkPaid)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "maintenance");
        assert_eq!(customers.status_of(1), Some(PaymentStatus::Overdue));
        assert_eq!(backend.reads(), 2);
        assert_eq!(log.notices()[0].title, "Save Error");
    }

    #[tokio::test]
    async fn picker_is_used_when_available() {
        let (_backend, _log, customers) = loaded().await;
        let picker = Always(StatusChoice::MarkOverdue);
        let applied = customers.change_status(2, Some(&picker)).await.unwrap();
        assert_eq!(applied, Applied::Committed(Some(PaymentStatus::Overdue)));

        let applied = customers.change_status(2, None).await.unwrap();
        assert_eq!(applied, Applied::Committed(Some(PaymentStatus::Pending)));
    }
}
