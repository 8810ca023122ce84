//! Load Optimizer data model
//!
//! Typed view of the single shared logistics document:
//! - [`Document`]: trucks, carriers, customers, cargo items and id counters
//! - [`PaymentStatus`]: the three-state invoice cycle
//! - [`LoadPlan`]: transient solver output and its [`PlanSummary`]
//! - [`DashboardSummary`]: fleet and receivables totals
//!
//! Unknown JSON fields are carried through untouched, because the backend
//! only offers whole-document replacement.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod document;
pub mod entity;
mod lenient;
pub mod plan;
pub mod summary;

pub use document::{Document, EntityKind, InvariantViolation, NextIds};
pub use entity::{
    CargoItem, Carrier, CarrierTruck, Customer, EntityId, ParseStatusError, PaymentStatus, Truck,
};
pub use plan::{
    FillLevel, LoadPlan, Packer, Placement, PlanSummary, PlanTruck, SplitWarning,
    TruckUtilisation, TruckZoneSummary, UnplacedItem, ZoneCustomer, ZoneStop,
};
pub use summary::DashboardSummary;
