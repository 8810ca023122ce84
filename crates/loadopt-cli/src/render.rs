//! Plain-text views of sessions

use loadopt_model::{
    CargoItem, Carrier, Customer, DashboardSummary, FillLevel, LoadPlan, Truck,
};
use std::collections::HashMap;
use std::fmt::Write;

fn money(amount: f64) -> String {
    format!("${amount:.2}")
}

fn fill(level: FillLevel) -> &'static str {
    match level {
        FillLevel::Ok => "ok",
        FillLevel::Warn => "warn",
        FillLevel::Full => "full",
    }
}

pub(crate) fn dashboard(summary: &DashboardSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Trucks      {}", summary.trucks);
    let _ = writeln!(out, "Carriers    {}", summary.carriers);
    let _ = writeln!(out, "Customers   {}", summary.customers);
    let _ = writeln!(out, "Cargo units {}", summary.cargo_units);
    let _ = writeln!(out, "Invoiced    {}", money(summary.total_invoiced));
    let _ = writeln!(out, "Collected   {}", money(summary.total_collected));
    let _ = writeln!(out, "Outstanding {}", money(summary.outstanding));
    if summary.overdue_customers > 0 {
        let _ = writeln!(out, "Overdue     {}", summary.overdue_customers);
    }
    out
}

pub(crate) fn fleet(trucks: &[Truck], carriers: &[Carrier]) -> String {
    let mut out = String::from("Own fleet\n");
    if trucks.is_empty() {
        out.push_str("  (none)\n");
    }
    for t in trucks {
        let _ = writeln!(
            out,
            "  #{:<4} {:<20} {}x{}x{} ft  {} lbs",
            t.id, t.name, t.length, t.width, t.height, t.max_wt
        );
    }
    for c in carriers {
        let _ = writeln!(out, "Carrier {} ({} trucks)", c.name, c.trucks.len());
        for t in &c.trucks {
            let _ = writeln!(
                out,
                "  {:<25} {}x{}x{} ft  {} lbs",
                t.name, t.length, t.width, t.height, t.max_wt
            );
        }
    }
    out
}

pub(crate) fn items(items: &[CargoItem], customers: &[Customer]) -> String {
    if items.is_empty() {
        return "No cargo items\n".to_string();
    }
    let names: HashMap<_, _> = customers.iter().map(|c| (c.id, c.name.as_str())).collect();
    let mut out = String::new();
    for item in items {
        let owner = item
            .customer_id
            .and_then(|id| names.get(&id).copied())
            .unwrap_or("-");
        let _ = writeln!(
            out,
            "#{:<4} {:<20} {}x{}x{} ft  x{}  {} lbs  {}",
            item.id,
            item.name,
            item.length,
            item.width,
            item.height,
            item.qty,
            item.total_weight(),
            owner
        );
    }
    out
}

pub(crate) fn customers(customers: &[Customer]) -> String {
    if customers.is_empty() {
        return "No customers\n".to_string();
    }
    let mut out = String::new();
    for c in customers {
        let pay = if c.can_pay() { "  [pay]" } else { "" };
        let _ = writeln!(
            out,
            "#{:<4} {:<20} {:<8} {:>10}{pay}",
            c.id,
            c.name,
            c.status().label(),
            money(c.invoice())
        );
    }
    out
}

pub(crate) fn plan(plan: &LoadPlan) -> String {
    let summary = plan.summary();
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} trucks used, {} items placed, total cost {}",
        summary.trucks_used,
        summary.items_placed,
        money(summary.total_cost)
    );
    for t in &summary.trucks {
        let cost = t.estimated_cost.map(money).unwrap_or_default();
        let zones = if t.multi_zone { "  multi-zone" } else { "" };
        let _ = writeln!(
            out,
            "  {:<20} vol {:>3}% ({})  wt {:>3}% ({})  {cost}{zones}",
            t.name,
            t.volume_pct,
            fill(t.volume_fill),
            t.weight_pct,
            fill(t.weight_fill),
        );
    }
    for w in &plan.split_warn {
        let _ = writeln!(out, "Split: {} across {}", w.name, w.trucks.join(", "));
    }
    if !summary.unplaced.is_empty() {
        out.push_str("Unplaced:\n");
        for u in &summary.unplaced {
            let _ = writeln!(out, "  {} ({}x{}x{} ft)", u.name, u.length, u.width, u.height);
        }
    }
    out
}
