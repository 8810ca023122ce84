//! The shared document aggregate
//!
//! One JSON document holds every entity plus the id counters. The server
//! replaces it wholesale on every write, so this type round-trips fields it
//! does not know about.

use crate::entity::{CargoItem, Carrier, Customer, EntityId, Truck};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;

/// Kind of entity with its own id counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Truck,
    Carrier,
    Customer,
    Item,
}

impl EntityKind {
    /// All kinds
    pub const ALL: [EntityKind; 4] = [Self::Truck, Self::Carrier, Self::Customer, Self::Item];

    /// Counter key inside `nextIds`
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Truck => "truck",
            Self::Carrier => "carrier",
            Self::Customer => "customer",
            Self::Item => "item",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

fn first_id() -> EntityId {
    1
}

/// Monotonic id allocators, one per [`EntityKind`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextIds {
    #[serde(default = "first_id")]
    pub truck: EntityId,
    #[serde(default = "first_id")]
    pub carrier: EntityId,
    #[serde(default = "first_id")]
    pub customer: EntityId,
    #[serde(default = "first_id")]
    pub item: EntityId,
    /// Counters for kinds this client does not manage
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for NextIds {
    fn default() -> Self {
        Self {
            truck: first_id(),
            carrier: first_id(),
            customer: first_id(),
            item: first_id(),
            extra: Map::new(),
        }
    }
}

impl NextIds {
    /// Current counter value for `kind`
    #[inline]
    #[must_use]
    pub fn get(&self, kind: EntityKind) -> EntityId {
        match kind {
            EntityKind::Truck => self.truck,
            EntityKind::Carrier => self.carrier,
            EntityKind::Customer => self.customer,
            EntityKind::Item => self.item,
        }
    }

    fn slot(&mut self, kind: EntityKind) -> &mut EntityId {
        match kind {
            EntityKind::Truck => &mut self.truck,
            EntityKind::Carrier => &mut self.carrier,
            EntityKind::Customer => &mut self.customer,
            EntityKind::Item => &mut self.item,
        }
    }

    /// Allocate the next id for `kind` and advance the counter
    ///
    /// `None` once the counter can no longer advance; nothing changes then.
    #[must_use]
    pub fn bump(&mut self, kind: EntityKind) -> Option<EntityId> {
        let slot = self.slot(kind);
        let id = *slot;
        *slot = id.checked_add(1)?;
        Some(id)
    }
}

/// A broken document invariant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// Two entities of one kind share an id
    DuplicateId { kind: EntityKind, id: EntityId },
    /// The counter would hand out an id that is already taken
    CounterBehind {
        kind: EntityKind,
        counter: EntityId,
        max_id: EntityId,
    },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateId { kind, id } => write!(f, "duplicate {kind} id {id}"),
            Self::CounterBehind {
                kind,
                counter,
                max_id,
            } => write!(f, "nextIds.{kind} = {counter} but max {kind} id is {max_id}"),
        }
    }
}

/// The single shared aggregate
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub trucks: Vec<Truck>,
    #[serde(default)]
    pub carriers: Vec<Carrier>,
    #[serde(default)]
    pub customers: Vec<Customer>,
    #[serde(default)]
    pub items: Vec<CargoItem>,
    #[serde(default)]
    pub next_ids: NextIds,
    /// Top-level fields owned by other clients (settings, rates, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Document {
    /// Ids currently present for `kind`, in document order
    #[must_use]
    pub fn ids(&self, kind: EntityKind) -> Vec<EntityId> {
        match kind {
            EntityKind::Truck => self.trucks.iter().map(|t| t.id).collect(),
            EntityKind::Carrier => self.carriers.iter().map(|c| c.id).collect(),
            EntityKind::Customer => self.customers.iter().map(|c| c.id).collect(),
            EntityKind::Item => self.items.iter().map(|i| i.id).collect(),
        }
    }

    /// Look up a customer by id
    #[must_use]
    pub fn customer(&self, id: EntityId) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id == id)
    }

    /// Look up a cargo item by id
    #[must_use]
    pub fn item(&self, id: EntityId) -> Option<&CargoItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Check id uniqueness and counter monotonicity for every kind
    #[must_use]
    pub fn check_invariants(&self) -> Vec<InvariantViolation> {
        let mut violations = Vec::new();
        for kind in EntityKind::ALL {
            let ids = self.ids(kind);
            let mut seen = HashSet::with_capacity(ids.len());
            for &id in &ids {
                if !seen.insert(id) {
                    violations.push(InvariantViolation::DuplicateId { kind, id });
                }
            }
            if let Some(&max_id) = ids.iter().max() {
                let counter = self.next_ids.get(kind);
                if counter <= max_id {
                    violations.push(InvariantViolation::CounterBehind {
                        kind,
                        counter,
                        max_id,
                    });
                }
            }
        }
        violations
    }
}
