//! Optimization results
//!
//! A [`LoadPlan`] is pure view state: it is produced by the solver, shown,
//! and thrown away. [`PlanSummary`] derives the headline numbers shown above
//! the per-truck breakdown.

use crate::entity::EntityId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Truck as echoed back inside a plan (own fleet or carrier)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanTruck {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub length: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub max_wt: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One placed unit inside a truck
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub length: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Placement {
    fn volume(&self) -> f64 {
        self.length * self.width * self.height
    }
}

/// Contents of one truck
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Packer {
    #[serde(default)]
    pub truck: PlanTruck,
    #[serde(default)]
    pub placements: Vec<Placement>,
    #[serde(default)]
    pub used_weight: f64,
}

/// Customer reference inside a zone stop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneCustomer {
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
}

/// A delivery zone served by one truck
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ZoneStop {
    #[serde(default)]
    pub zone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(default)]
    pub customers: Vec<ZoneCustomer>,
}

/// Route summary for the packer at the same index
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TruckZoneSummary {
    #[serde(default)]
    pub zones: Vec<ZoneStop>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_cost: Option<f64>,
}

/// A customer whose cargo ended up on more than one truck
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SplitWarning {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub trucks: Vec<String>,
}

/// A unit that did not fit anywhere
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UnplacedItem {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub length: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

/// Solver output
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadPlan {
    #[serde(default)]
    pub packers: Vec<Packer>,
    #[serde(default)]
    pub truck_zone_summary: Vec<TruckZoneSummary>,
    #[serde(default)]
    pub split_warn: Vec<SplitWarning>,
    #[serde(default)]
    pub unplaced: Vec<UnplacedItem>,
}

/// Traffic-light utilisation band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillLevel {
    /// Below 70%
    Ok,
    /// 70% up to 90%
    Warn,
    /// 90% and above
    Full,
}

impl FillLevel {
    #[must_use]
    pub fn from_percent(pct: u32) -> Self {
        match pct {
            90.. => Self::Full,
            70..=89 => Self::Warn,
            _ => Self::Ok,
        }
    }
}

/// Utilisation of one truck
#[derive(Debug, Clone, PartialEq)]
pub struct TruckUtilisation {
    pub name: String,
    pub volume_pct: u32,
    pub weight_pct: u32,
    pub volume_fill: FillLevel,
    pub weight_fill: FillLevel,
    pub estimated_cost: Option<f64>,
    /// More than one zone on this run
    pub multi_zone: bool,
}

/// Headline numbers for a plan
#[derive(Debug, Clone, PartialEq)]
pub struct PlanSummary {
    pub trucks_used: usize,
    pub items_placed: usize,
    pub total_cost: f64,
    pub trucks: Vec<TruckUtilisation>,
    /// Unplaced units, one entry per name
    pub unplaced: Vec<UnplacedItem>,
}

/// Rounded percentage capped at 100; zero capacity reads as 0%
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn percent(used: f64, capacity: f64) -> u32 {
    if capacity <= 0.0 {
        return 0;
    }
    // clamped to [0, 100] before the cast
    (used / capacity * 100.0).round().clamp(0.0, 100.0) as u32
}

impl LoadPlan {
    /// Derive the headline summary
    #[must_use]
    pub fn summary(&self) -> PlanSummary {
        let total_cost = self
            .truck_zone_summary
            .iter()
            .filter_map(|ts| ts.estimated_cost)
            .sum();
        let items_placed = self.packers.iter().map(|p| p.placements.len()).sum();

        let trucks = self
            .packers
            .iter()
            .enumerate()
            .map(|(i, packer)| {
                let truck = &packer.truck;
                let capacity = truck.length * truck.width * truck.height;
                let used: f64 = packer.placements.iter().map(Placement::volume).sum();
                let volume_pct = percent(used, capacity);
                let weight_pct = percent(packer.used_weight, truck.max_wt);
                let zones = self.truck_zone_summary.get(i);
                TruckUtilisation {
                    name: truck.name.clone(),
                    volume_pct,
                    weight_pct,
                    volume_fill: FillLevel::from_percent(volume_pct),
                    weight_fill: FillLevel::from_percent(weight_pct),
                    estimated_cost: zones.and_then(|z| z.estimated_cost),
                    multi_zone: zones.is_some_and(|z| z.zones.len() > 1),
                }
            })
            .collect();

        PlanSummary {
            trucks_used: self.packers.len(),
            items_placed,
            total_cost,
            trucks,
            unplaced: dedup_by_name(&self.unplaced),
        }
    }
}

/// First-seen order, last-seen value
fn dedup_by_name(items: &[UnplacedItem]) -> Vec<UnplacedItem> {
    let mut out: Vec<UnplacedItem> = Vec::new();
    for item in items {
        match out.iter_mut().find(|u| u.name == item.name) {
            Some(existing) => *existing = item.clone(),
            None => out.push(item.clone()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn plan() -> LoadPlan {
        serde_json::from_value(json!({
            "packers": [
                {
                    "truck": {"name": "Box 26", "length": 10, "width": 10, "height": 10, "maxWt": 1000},
                    "placements": [
                        {"name": "A", "length": 5, "width": 10, "height": 10},
                        {"name": "B", "length": 2, "width": 10, "height": 10}
                    ],
                    "usedWeight": 950
                },
                {
                    "truck": {"name": "Sprinter", "length": 0, "width": 0, "height": 0, "maxWt": 0},
                    "placements": [],
                    "usedWeight": 0
                }
            ],
            "truckZoneSummary": [
                {"zones": [{"zone": "North", "distance": 12, "customers": [{"id": 1, "name": "Acme"}]},
                           {"zone": "East", "customers": []}],
                 "estimatedCost": 310.0},
                {"zones": [], "estimatedCost": 90.5}
            ],
            "splitWarn": [{"name": "Acme", "trucks": ["Box 26", "Sprinter"]}],
            "unplaced": [
                {"name": "Piano", "length": 6, "width": 5, "height": 4},
                {"name": "Sofa", "length": 7, "width": 3, "height": 3},
                {"name": "Piano", "length": 6, "width": 5, "height": 5}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn missing_lists_default_empty() {
        let p: LoadPlan = serde_json::from_value(json!({})).unwrap();
        assert!(p.packers.is_empty());
        assert!(p.unplaced.is_empty());
    }

    #[test]
    fn headline_numbers() {
        let summary = plan().summary();
        assert_eq!(summary.trucks_used, 2);
        assert_eq!(summary.items_placed, 2);
        assert!((summary.total_cost - 400.5).abs() < f64::EPSILON);
    }

    #[test]
    fn per_truck_utilisation() {
        let summary = plan().summary();
        let first = &summary.trucks[0];
        assert_eq!(first.volume_pct, 70);
        assert_eq!(first.volume_fill, FillLevel::Warn);
        assert_eq!(first.weight_pct, 95);
        assert_eq!(first.weight_fill, FillLevel::Full);
        assert!(first.multi_zone);

        let second = &summary.trucks[1];
        assert_eq!(second.volume_pct, 0);
        assert_eq!(second.weight_pct, 0);
        assert_eq!(second.volume_fill, FillLevel::Ok);
        assert!(!second.multi_zone);
    }

    #[test]
    fn unplaced_deduplicated_by_name() {
        let summary = plan().summary();
        let names: Vec<_> = summary.unplaced.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, ["Piano", "Sofa"]);
        assert!((summary.unplaced[0].height - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn percent_caps_at_hundred() {
        assert_eq!(percent(150.0, 100.0), 100);
        assert_eq!(percent(1.0, 0.0), 0);
        assert_eq!(percent(0.4, 100.0), 0);
    }
}
