//! Entity types held inside the shared document
//!
//! - [`CargoItem`]: added and removed by this client, never edited in place
//! - [`Customer`]: only `paymentStatus` is mutated by this client
//! - [`Truck`] / [`Carrier`]: read-only fleet data
//!
//! Every entity keeps the fields it does not model in `extra`, so a
//! whole-document write never drops data another client put there.

use crate::lenient;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Numeric entity id as issued by the `nextIds` counters
pub type EntityId = u64;

/// A cargo item waiting to be loaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CargoItem {
    /// Id allocated from `nextIds.item`
    pub id: EntityId,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Length in feet
    #[serde(default, deserialize_with = "lenient::number")]
    pub length: f64,
    /// Width in feet
    #[serde(default, deserialize_with = "lenient::number")]
    pub width: f64,
    /// Height in feet
    #[serde(default, deserialize_with = "lenient::number")]
    pub height: f64,
    /// Item weight in lbs
    #[serde(default, deserialize_with = "lenient::number")]
    pub weight: f64,
    /// Packaging weight in lbs
    #[serde(default, deserialize_with = "lenient::number")]
    pub packaging_weight: f64,
    /// Number of identical units
    #[serde(default = "default_qty", deserialize_with = "lenient::qty")]
    pub qty: u32,
    /// Whether the solver may rotate the item
    #[serde(default)]
    pub rotate: bool,
    /// Owning customer, if assigned
    #[serde(default)]
    pub customer_id: Option<EntityId>,
    /// Fields this client does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_qty() -> u32 {
    1
}

impl CargoItem {
    /// Item plus packaging weight
    #[inline]
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.weight + self.packaging_weight
    }

    /// Quantity as counted for totals; a stored zero counts as one unit
    #[inline]
    #[must_use]
    pub fn units(&self) -> u64 {
        u64::from(self.qty.max(1))
    }
}

/// Invoice state of a customer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Invoice issued, not yet settled
    #[default]
    Pending,
    /// Invoice settled
    Paid,
    /// Payment is late
    Overdue,
}

impl PaymentStatus {
    /// All states in cycle order
    pub const ALL: [PaymentStatus; 3] = [Self::Pending, Self::Paid, Self::Overdue];

    /// Deterministic successor: pending → paid → overdue → pending
    #[inline]
    #[must_use]
    pub fn cycle(self) -> Self {
        match self {
            Self::Pending => Self::Paid,
            Self::Paid => Self::Overdue,
            Self::Overdue => Self::Pending,
        }
    }

    /// Wire name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
        }
    }

    /// Human-readable label
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Paid => "Paid",
            Self::Overdue => "Overdue",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Unrecognised payment status name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown payment status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for PaymentStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "overdue" => Ok(Self::Overdue),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}

/// Delivery customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
    /// Display colour (CSS hex)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Stop number on the route
    #[serde(
        default,
        deserialize_with = "lenient::opt_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub stop: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    /// Distance in miles
    #[serde(
        default,
        deserialize_with = "lenient::opt_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub distance: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub invoice_amount: Option<f64>,
    /// Absent means pending
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_terms: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Customer {
    /// Effective payment status
    #[inline]
    #[must_use]
    pub fn status(&self) -> PaymentStatus {
        self.payment_status.unwrap_or_default()
    }

    /// Invoice amount, zero when unset
    #[inline]
    #[must_use]
    pub fn invoice(&self) -> f64 {
        self.invoice_amount.unwrap_or(0.0)
    }

    /// Whether a checkout may be started for this customer
    #[must_use]
    pub fn can_pay(&self) -> bool {
        self.invoice() > 0.0 && self.status() != PaymentStatus::Paid
    }
}

/// Own-fleet truck
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Truck {
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub length: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub width: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub height: f64,
    /// Maximum payload in lbs
    #[serde(default, deserialize_with = "lenient::number")]
    pub max_wt: f64,
    #[serde(
        default,
        deserialize_with = "lenient::opt_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub base_rate: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub rate_per_mi: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Truck {
    /// Cargo volume in cubic feet
    #[inline]
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.length * self.width * self.height
    }
}

/// Third-party carrier and the trucks it offers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Carrier {
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub trucks: Vec<CarrierTruck>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Truck offered by a carrier; keyed by `tid` inside its carrier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarrierTruck {
    pub tid: Value,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub length: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub width: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub height: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub max_wt: f64,
    #[serde(
        default,
        deserialize_with = "lenient::opt_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub base_rate: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub rate_per_mi: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn cycle_order() {
        assert_eq!(PaymentStatus::Pending.cycle(), PaymentStatus::Paid);
        assert_eq!(PaymentStatus::Paid.cycle(), PaymentStatus::Overdue);
        assert_eq!(PaymentStatus::Overdue.cycle(), PaymentStatus::Pending);
    }

    #[test]
    fn status_parse_is_case_insensitive() {
        assert_eq!("PAID".parse::<PaymentStatus>(), Ok(PaymentStatus::Paid));
        assert_eq!(" overdue ".parse::<PaymentStatus>(), Ok(PaymentStatus::Overdue));
        assert!("settled".parse::<PaymentStatus>().is_err());
    }

    #[test]
    fn customer_without_status_is_pending() {
        let c: Customer = serde_json::from_value(json!({"id": 3, "name": "Acme"})).unwrap();
        assert_eq!(c.status(), PaymentStatus::Pending);
        assert!(!c.can_pay());
    }

    #[test]
    fn can_pay_requires_open_invoice() {
        let mut c: Customer =
            serde_json::from_value(json!({"id": 1, "name": "A", "invoiceAmount": 120.5})).unwrap();
        assert!(c.can_pay());
        c.payment_status = Some(PaymentStatus::Paid);
        assert!(!c.can_pay());
        c.payment_status = Some(PaymentStatus::Overdue);
        assert!(c.can_pay());
    }

    #[test]
    fn unknown_fields_survive_round_trip() {
        let raw = json!({
            "id": 4, "name": "Beta", "paymentStatus": "overdue",
            "contact": {"email": "ops@beta.test"}
        });
        let c: Customer = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(c.extra.get("contact"), raw.get("contact"));
        assert_eq!(serde_json::to_value(&c).unwrap(), raw);
    }

    #[test]
    fn cargo_item_defaults() {
        let item: CargoItem = serde_json::from_value(json!({"id": 9, "name": "Crate"})).unwrap();
        assert_eq!(item.qty, 1);
        assert_eq!(item.customer_id, None);
        assert_eq!(item.units(), 1);
    }

    #[test]
    fn cargo_item_serializes_null_customer() {
        let item: CargoItem = serde_json::from_value(json!({"id": 9, "name": "Crate"})).unwrap();
        let out = serde_json::to_value(&item).unwrap();
        assert_eq!(out["customerId"], Value::Null);
        assert_eq!(out["packagingWeight"], json!(0.0));
    }

    #[test]
    fn foreign_writes_with_bad_numbers_still_decode() {
        let doc: crate::Document = serde_json::from_value(json!({
            "trucks": [{"id": 1, "name": "Box 26", "length": null, "width": "8", "height": 8.5, "maxWt": 10000}],
            "customers": [{"id": 2, "name": "Acme", "stop": "3", "invoiceAmount": "1200"}],
            "items": [{"id": 3, "name": "Box", "qty": -3, "weight": "abc"}],
        }))
        .unwrap();

        let truck = &doc.trucks[0];
        assert_eq!((truck.length, truck.width, truck.height), (0.0, 8.0, 8.5));
        assert_eq!(doc.customers[0].stop, Some(3));
        assert_eq!(doc.customers[0].invoice(), 1200.0);
        assert_eq!(doc.items[0].qty, 1);
        assert_eq!(doc.items[0].weight, 0.0);
    }

    fn any_status() -> impl Strategy<Value = PaymentStatus> {
        prop_oneof![
            Just(PaymentStatus::Pending),
            Just(PaymentStatus::Paid),
            Just(PaymentStatus::Overdue),
        ]
    }

    proptest! {
        #[test]
        fn cycle_has_no_fixed_point(s in any_status()) {
            prop_assert_ne!(s.cycle(), s);
        }

        #[test]
        fn cycle_returns_after_three_steps(s in any_status()) {
            prop_assert_eq!(s.cycle().cycle().cycle(), s);
        }
    }

    #[test]
    fn cycle_is_a_permutation() {
        let mut images: Vec<_> = PaymentStatus::ALL.iter().map(|s| s.cycle()).collect();
        images.sort_by_key(|s| s.as_str());
        let mut all = PaymentStatus::ALL.to_vec();
        all.sort_by_key(|s| s.as_str());
        assert_eq!(images, all);
    }
}
