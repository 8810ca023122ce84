use loadopt_model::{CargoItem, Customer, Document, EntityId, LoadPlan, PaymentStatus, Truck};
use serde_json::json;

pub fn truck(id: EntityId, name: &str) -> Truck {
    serde_json::from_value(json!({
        "id": id, "name": name, "length": 26, "width": 8, "height": 8,
        "maxWt": 10000, "baseRate": 150, "ratePerMi": 2.5
    }))
    .unwrap()
}

pub fn customer(id: EntityId, name: &str, status: PaymentStatus) -> Customer {
    serde_json::from_value(json!({
        "id": id, "name": name, "color": "#2563eb", "stop": id, "zone": "North",
        "distance": 12.5, "invoiceAmount": 1200.0, "paymentStatus": status,
        "paymentTerms": "net30", "paymentMethod": "invoice"
    }))
    .unwrap()
}

pub fn item(id: EntityId, name: &str, customer_id: Option<EntityId>) -> CargoItem {
    serde_json::from_value(json!({
        "id": id, "name": name, "length": 4, "width": 4, "height": 4,
        "weight": 500, "packagingWeight": 20, "qty": 1, "rotate": true,
        "customerId": customer_id
    }))
    .unwrap()
}

/// Two trucks, one carrier, three customers, two items, `nextIds.item = 7`
pub fn sample_document() -> Document {
    let mut doc: Document = serde_json::from_value(json!({
        "carriers": [{
            "id": 1, "name": "Swift Haul",
            "trucks": [{"tid": "c1", "name": "Reefer 53", "length": 53, "width": 8.5,
                        "height": 9, "maxWt": 44000, "baseRate": 400, "ratePerMi": 3.1}]
        }],
        "nextIds": {"truck": 3, "carrier": 2, "customer": 4, "item": 7},
        "settings": {"currency": "USD"}
    }))
    .unwrap();
    doc.trucks = vec![truck(1, "Box 26"), truck(2, "Sprinter")];
    doc.customers = vec![
        customer(1, "Acme Foods", PaymentStatus::Pending),
        customer(2, "Beta Hardware", PaymentStatus::Paid),
        customer(3, "Corner Deli", PaymentStatus::Overdue),
    ];
    doc.items = vec![item(5, "Pallet", Some(1)), item(6, "Crate", None)];
    doc
}

pub fn empty_fleet_document() -> Document {
    let mut doc = sample_document();
    doc.trucks.clear();
    doc
}

pub fn sample_plan() -> LoadPlan {
    serde_json::from_value(json!({
        "packers": [{
            "truck": {"name": "Box 26", "length": 26, "width": 8, "height": 8, "maxWt": 10000},
            "placements": [{"name": "Pallet", "length": 4, "width": 4, "height": 4}],
            "usedWeight": 520
        }],
        "truckZoneSummary": [{
            "zones": [{"zone": "North", "distance": 12.5,
                       "customers": [{"id": 1, "name": "Acme Foods"}]}],
            "estimatedCost": 181.25
        }],
        "splitWarn": [],
        "unplaced": [{"name": "Crate", "length": 4, "width": 4, "height": 4}]
    }))
    .unwrap()
}
