//! Cargo screen: add and remove items with fetch-merge-write

use crate::error::{SyncError, ValidationError};
use crate::notice::{Notice, Notifier};
use crate::session::{Applied, Merge, Screen, Session};
use loadopt_client::DocumentStore;
use loadopt_model::{CargoItem, Customer, EntityId, EntityKind};
use serde_json::Map;
use std::sync::Arc;

const SAVE_ERROR_TITLE: &str = "Save Error";
const REMOVE_ERROR_TITLE: &str = "Error";

/// Add-item form as typed by the user
///
/// Numeric fields that do not parse, or parse to zero, fall back to
/// defaults: 4 ft for each dimension, 0 lbs for both weights, 1 unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CargoDraft {
    pub name: String,
    pub length: String,
    pub width: String,
    pub height: String,
    pub weight: String,
    pub packaging_weight: String,
    pub qty: String,
    pub customer_id: Option<EntityId>,
}

impl Default for CargoDraft {
    /// Blank form
    fn default() -> Self {
        Self {
            name: String::new(),
            length: "4".into(),
            width: "4".into(),
            height: "4".into(),
            weight: "500".into(),
            packaging_weight: "0".into(),
            qty: "1".into(),
            customer_id: None,
        }
    }
}

impl CargoDraft {
    /// Blank form with a name
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_qty(mut self, qty: impl Into<String>) -> Self {
        self.qty = qty.into();
        self
    }

    #[must_use]
    pub fn with_customer(mut self, customer_id: Option<EntityId>) -> Self {
        self.customer_id = customer_id;
        self
    }

    /// Build the item this draft describes
    ///
    /// # Errors
    /// [`ValidationError::MissingName`] when the trimmed name is empty.
    pub fn to_item(&self, id: EntityId) -> Result<CargoItem, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingName);
        }
        Ok(CargoItem {
            id,
            name: name.to_string(),
            length: number_or(&self.length, 4.0),
            width: number_or(&self.width, 4.0),
            height: number_or(&self.height, 4.0),
            weight: number_or(&self.weight, 0.0),
            packaging_weight: number_or(&self.packaging_weight, 0.0),
            qty: units(&self.qty),
            rotate: true,
            customer_id: self.customer_id,
            extra: Map::new(),
        })
    }
}

fn number_or(raw: &str, default: f64) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v != 0.0 => v,
        _ => default,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn units(raw: &str) -> u32 {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 1.0 => v.trunc().min(f64::from(u32::MAX)) as u32,
        _ => 1,
    }
}

/// Explicit answer to the "Remove Item" prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Cancelled,
}

/// Session behind the cargo list
#[derive(Debug, Clone)]
pub struct CargoSession {
    session: Session,
}

impl CargoSession {
    pub fn new(store: Arc<dyn DocumentStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            session: Session::new("cargo", store, notifier),
        }
    }

    /// Items in the snapshot; empty until loaded
    #[must_use]
    pub fn items(&self) -> Vec<CargoItem> {
        self.session
            .with_snapshot(|doc| doc.map(|d| d.items.clone()).unwrap_or_default())
    }

    /// Customers available for assignment
    #[must_use]
    pub fn customers(&self) -> Vec<Customer> {
        self.session
            .with_snapshot(|doc| doc.map(|d| d.customers.clone()).unwrap_or_default())
    }

    /// Add an item under the next free id
    ///
    /// Reads the current document, takes `nextIds.item` as the id, appends
    /// the item, bumps the counter and writes the whole document back.
    ///
    /// # Errors
    /// Validation failures issue no request. Read or write failures leave
    /// the snapshot unchanged.
    pub async fn add_item(&self, draft: &CargoDraft) -> Result<Applied<CargoItem>, SyncError> {
        let mut item = match draft.to_item(0) {
            Ok(item) => item,
            Err(err) => {
                self.session.notify(Notice::error(err.title(), err.to_string()));
                return Err(err.into());
            }
        };

        let applied = self
            .session
            .fetch_merge_write(SAVE_ERROR_TITLE, move |doc| {
                match doc.next_ids.bump(EntityKind::Item) {
                    Some(id) => {
                        item.id = id;
                        doc.items.push(item.clone());
                        Merge::Write(Ok(item))
                    }
                    None => Merge::Skip(Err(ValidationError::CounterExhausted(EntityKind::Item))),
                }
            })
            .await?;
        let applied = match applied {
            Applied::Committed(Ok(item)) => Applied::Committed(item),
            Applied::Committed(Err(err)) => {
                self.session.notify(Notice::error(err.title(), err.to_string()));
                return Err(err.into());
            }
            Applied::Discarded => Applied::Discarded,
        };

        if let Applied::Committed(item) = &applied {
            tracing::info!(id = item.id, name = %item.name, "cargo item added");
        }
        Ok(applied)
    }

    /// Remove an item after explicit confirmation
    ///
    /// Returns whether an item was removed. A cancelled prompt issues no
    /// request; an id missing from the fresh read issues no write.
    ///
    /// # Errors
    /// Read or write failures leave the snapshot unchanged.
    pub async fn remove_item(
        &self,
        id: EntityId,
        confirmation: Confirmation,
    ) -> Result<Applied<bool>, SyncError> {
        if confirmation == Confirmation::Cancelled {
            return Ok(Applied::Committed(false));
        }

        let applied = self
            .session
            .fetch_merge_write(REMOVE_ERROR_TITLE, move |doc| {
                let before = doc.items.len();
                doc.items.retain(|i| i.id != id);
                if doc.items.len() == before {
                    Merge::Skip(false)
                } else {
                    Merge::Write(true)
                }
            })
            .await?;

        if applied == Applied::Committed(true) {
            tracing::info!(id, "cargo item removed");
        }
        Ok(applied)
    }
}

impl Screen for CargoSession {
    fn session(&self) -> &Session {
        &self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::NoticeLog;
    use loadopt_test_utils::{network_down, sample_document, server_error, InMemoryBackend};
    use pretty_assertions::assert_eq;

    fn setup() -> (Arc<InMemoryBackend>, Arc<NoticeLog>, CargoSession) {
        let backend = Arc::new(InMemoryBackend::new(sample_document()));
        let log = Arc::new(NoticeLog::new());
        let cargo = CargoSession::new(backend.clone(), log.clone());
        (backend, log, cargo)
    }

    #[test]
    fn draft_fallbacks() {
        let draft = CargoDraft {
            name: "  Pallet A ".into(),
            length: "abc".into(),
            width: "0".into(),
            height: "6.5".into(),
            weight: String::new(),
            packaging_weight: "12".into(),
            qty: "-3".into(),
            customer_id: Some(2),
        };
        let item = draft.to_item(9).unwrap();
        assert_eq!(item.name, "Pallet A");
        assert_eq!((item.length, item.width, item.height), (4.0, 4.0, 6.5));
        assert_eq!((item.weight, item.packaging_weight), (0.0, 12.0));
        assert_eq!(item.qty, 1);
        assert!(item.rotate);
        assert_eq!(item.customer_id, Some(2));
    }

    #[test]
    fn fractional_qty_truncates() {
        assert_eq!(units("2.7"), 2);
        assert_eq!(units("0.5"), 1);
        assert_eq!(units("3"), 3);
    }

    #[test]
    fn blank_name_is_rejected() {
        assert_eq!(
            CargoDraft::named("   ").to_item(1),
            Err(ValidationError::MissingName)
        );
    }

    #[tokio::test]
    async fn missing_name_issues_no_request() {
        let (backend, log, cargo) = setup();
        let err = cargo.add_item(&CargoDraft::default()).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!((backend.reads(), backend.writes()), (0, 0));
        assert_eq!(log.notices()[0].title, "Validation");
        assert_eq!(log.notices()[0].body, "Item name is required.");
    }

    #[tokio::test]
    async fn add_uses_fresh_counter() {
        let (backend, _log, cargo) = setup();
        let item = cargo
            .add_item(&CargoDraft::named("Pallet A").with_qty("2"))
            .await
            .unwrap()
            .committed()
            .unwrap();
        assert_eq!((item.id, item.qty), (7, 2));

        backend.mutate(|doc| doc.next_ids.item = 20);
        let next = cargo.add_item(&CargoDraft::named("Pallet B")).await.unwrap().committed();
        assert_eq!(next.map(|i| i.id), Some(20));
        assert_eq!(cargo.items().len(), 4);
    }

    #[tokio::test]
    async fn failed_write_leaves_items_unchanged() {
        let (backend, log, cargo) = setup();
        cargo.load().await.unwrap();
        backend.fail_next_write(server_error(500, "disk full"));

        let err = cargo.add_item(&CargoDraft::named("Pallet A")).await.unwrap_err();
        assert_eq!(err.to_string(), "disk full");
        assert_eq!(cargo.items().len(), 2);
        assert_eq!(backend.document().next_ids.item, 7);
        assert_eq!(log.notices()[0].title, "Save Error");
    }

    #[tokio::test]
    async fn exhausted_item_counter_rejects_add() {
        let (backend, log, cargo) = setup();
        backend.mutate(|doc| doc.next_ids.item = EntityId::MAX);

        let err = cargo.add_item(&CargoDraft::named("X")).await.unwrap_err();
        assert_eq!(
            err.validation(),
            Some(&ValidationError::CounterExhausted(EntityKind::Item))
        );
        assert_eq!((backend.reads(), backend.writes()), (1, 0));
        assert_eq!(backend.document().items.len(), 2);
        assert_eq!(cargo.items().len(), 2);
        assert_eq!(log.len(), 1);
        assert_eq!(log.notices()[0].body, "No item ids left to allocate.");
    }

    #[tokio::test]
    async fn failed_read_aborts_add() {
        let (backend, _log, cargo) = setup();
        backend.fail_next_read(network_down());
        assert!(cargo.add_item(&CargoDraft::named("X")).await.unwrap_err().is_network());
        assert_eq!(backend.writes(), 0);
    }

    #[tokio::test]
    async fn cancelled_removal_issues_no_request() {
        let (backend, _log, cargo) = setup();
        let applied = cargo.remove_item(5, Confirmation::Cancelled).await.unwrap();
        assert_eq!(applied, Applied::Committed(false));
        assert_eq!(backend.reads(), 0);
    }

    #[tokio::test]
    async fn confirmed_removal_filters_fresh_read() {
        let (backend, _log, cargo) = setup();
        let applied = cargo.remove_item(5, Confirmation::Confirmed).await.unwrap();
        assert_eq!(applied, Applied::Committed(true));
        let ids: Vec<_> = backend.document().items.iter().map(|i| i.id).collect();
        assert_eq!(ids, [6]);
        assert_eq!(cargo.items().len(), 1);
    }

    #[tokio::test]
    async fn removing_absent_item_skips_write() {
        let (backend, _log, cargo) = setup();
        let applied = cargo.remove_item(99, Confirmation::Confirmed).await.unwrap();
        assert_eq!(applied, Applied::Committed(false));
        assert_eq!((backend.reads(), backend.writes()), (1, 0));
        assert_eq!(cargo.items().len(), 2);
    }

    #[tokio::test]
    async fn remove_failure_uses_error_title() {
        let (backend, log, cargo) = setup();
        backend.fail_next_write(network_down());
        assert!(cargo.remove_item(5, Confirmation::Confirmed).await.is_err());
        assert_eq!(log.notices()[0].title, "Error");
        assert_eq!(backend.document().items.len(), 2);
    }
}
