//! Dashboard aggregates over one document snapshot

use crate::document::Document;
use crate::entity::PaymentStatus;

/// Fleet, cargo and receivables totals
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    pub trucks: usize,
    pub carriers: usize,
    pub customers: usize,
    /// Sum of item quantities
    pub cargo_units: u64,
    pub total_invoiced: f64,
    /// Invoiced amount of customers marked paid
    pub total_collected: f64,
    pub outstanding: f64,
    pub overdue_customers: usize,
}

impl DashboardSummary {
    /// Compute totals for `doc`
    #[must_use]
    pub fn from_document(doc: &Document) -> Self {
        let total_invoiced: f64 = doc.customers.iter().map(|c| c.invoice()).sum();
        let total_collected: f64 = doc
            .customers
            .iter()
            .filter(|c| c.status() == PaymentStatus::Paid)
            .map(|c| c.invoice())
            .sum();

        Self {
            trucks: doc.trucks.len(),
            carriers: doc.carriers.len(),
            customers: doc.customers.len(),
            cargo_units: doc.items.iter().map(|i| i.units()).sum(),
            total_invoiced,
            total_collected,
            outstanding: total_invoiced - total_collected,
            overdue_customers: doc
                .customers
                .iter()
                .filter(|c| c.status() == PaymentStatus::Overdue)
                .count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn totals() {
        let doc: Document = serde_json::from_value(json!({
            "trucks": [{"id": 1, "name": "T1"}],
            "customers": [
                {"id": 1, "name": "A", "invoiceAmount": 100.0, "paymentStatus": "paid"},
                {"id": 2, "name": "B", "invoiceAmount": 250.0, "paymentStatus": "overdue"},
                {"id": 3, "name": "C"}
            ],
            "items": [
                {"id": 1, "name": "x", "qty": 3},
                {"id": 2, "name": "y", "qty": 0},
                {"id": 3, "name": "z"}
            ]
        }))
        .unwrap();

        let s = DashboardSummary::from_document(&doc);
        assert_eq!(s.trucks, 1);
        assert_eq!(s.carriers, 0);
        assert_eq!(s.customers, 3);
        assert_eq!(s.cargo_units, 5);
        assert!((s.total_invoiced - 350.0).abs() < f64::EPSILON);
        assert!((s.total_collected - 100.0).abs() < f64::EPSILON);
        assert!((s.outstanding - 250.0).abs() < f64::EPSILON);
        assert_eq!(s.overdue_customers, 1);
    }
}
