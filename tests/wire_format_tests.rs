//! Wire-format tests for the JSON bodies the admin console consumes.
//!
//! These run without a database: they exercise the serde shapes of the
//! item lifecycle documents (camelCase keys, `type` field in maintenance
//! records, history sub-documents surviving a round trip).

use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use medtrack_backend::models::item::{
    CalibrationRecord, Item, ItemStatus, MaintenanceRecord, MaintenanceType, PurchaseInfo,
    StatusChange, Warranty, WarrantyClaim,
};
use medtrack_backend::models::product::ProductSummary;
use medtrack_backend::services::item_service::ItemWithProduct;

fn sample_item() -> Item {
    let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
    Item {
        id: Uuid::new_v4(),
        serial_number: "SN-1001".to_string(),
        status: ItemStatus::Maintenance,
        product_id: Uuid::new_v4(),
        destination_info: None,
        purchase_info: PurchaseInfo {
            date: now,
            cost: Some(12_500.0),
            supplier: Some("MedSupply GmbH".to_string()),
            order_reference: None,
        },
        warranty: Some(Warranty {
            start_date: Some(now),
            end_date: Some(now + chrono::Duration::days(365)),
            claim_history: vec![WarrantyClaim {
                date: now,
                description: "Display flicker".to_string(),
                status: "resolved".to_string(),
                resolution: Some("Panel replaced".to_string()),
            }],
        }),
        maintenance_history: vec![MaintenanceRecord {
            date: now,
            record_type: MaintenanceType::Preventive,
            description: "Annual service".to_string(),
            performed_by: "Technician A".to_string(),
            next_due_date: Some(now + chrono::Duration::days(180)),
            cost: None,
            attachments: vec![],
        }],
        calibration_history: vec![CalibrationRecord {
            date: now,
            notes: "Within tolerance".to_string(),
            performed_by: "Technician B".to_string(),
            next_due_date: now + chrono::Duration::days(90),
            results: "pass".to_string(),
            certificate: None,
        }],
        status_history: vec![StatusChange {
            date: now,
            status: ItemStatus::Maintenance,
            note: "Sent for annual service".to_string(),
            actor: Uuid::new_v4(),
        }],
        notes: None,
        maintenance_frequency_days: Some(180),
        next_maintenance_date: Some(now + chrono::Duration::days(180)),
        next_calibration_date: Some(now + chrono::Duration::days(90)),
        last_updated: now,
        created_at: now,
    }
}

#[test]
fn item_serializes_camel_case_keys() {
    let value = serde_json::to_value(sample_item()).unwrap();
    let obj = value.as_object().unwrap();

    assert!(obj.contains_key("serialNumber"));
    assert!(obj.contains_key("productId"));
    assert!(obj.contains_key("purchaseInfo"));
    assert!(obj.contains_key("maintenanceHistory"));
    assert!(obj.contains_key("calibrationHistory"));
    assert!(obj.contains_key("statusHistory"));
    assert!(obj.contains_key("lastUpdated"));
    assert!(!obj.contains_key("serial_number"));

    // Absent optionals are omitted entirely, not null
    assert!(!obj.contains_key("destinationInfo"));
    assert!(!obj.contains_key("notes"));
}

#[test]
fn maintenance_record_uses_type_key() {
    let value = serde_json::to_value(sample_item()).unwrap();
    let record = &value["maintenanceHistory"][0];

    assert_eq!(record["type"], json!("preventive"));
    assert_eq!(record["performedBy"], json!("Technician A"));
    assert!(record.get("record_type").is_none());
}

#[test]
fn item_round_trips_through_json() {
    let item = sample_item();
    let json = serde_json::to_string(&item).unwrap();
    let parsed: Item = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed.serial_number, item.serial_number);
    assert_eq!(parsed.status, item.status);
    assert_eq!(parsed.maintenance_history.len(), 1);
    assert_eq!(parsed.calibration_history.len(), 1);
    assert_eq!(parsed.status_history.len(), 1);
    assert_eq!(
        parsed.warranty.as_ref().unwrap().claim_history.len(),
        1
    );
    assert_eq!(parsed.next_calibration_date, item.next_calibration_date);
}

#[test]
fn item_with_product_flattens_item_fields() {
    let item = sample_item();
    let product_id = item.product_id;
    let joined = ItemWithProduct {
        item,
        product: ProductSummary {
            id: product_id,
            name: "Vital Signs Monitor".to_string(),
            model: "VSM-300".to_string(),
            manufacturer: "Acme Medical".to_string(),
        },
    };

    let value = serde_json::to_value(&joined).unwrap();
    // Item fields sit at the top level next to the product summary
    assert_eq!(value["serialNumber"], json!("SN-1001"));
    assert_eq!(value["product"]["name"], json!("Vital Signs Monitor"));
    assert_eq!(value["product"]["model"], json!("VSM-300"));
}

#[test]
fn status_enum_uses_lowercase_wire_values() {
    for (status, expected) in [
        (ItemStatus::Inventory, "inventory"),
        (ItemStatus::Demo, "demo"),
        (ItemStatus::Delivery, "delivery"),
        (ItemStatus::Maintenance, "maintenance"),
    ] {
        assert_eq!(serde_json::to_value(status).unwrap(), json!(expected));
        let parsed: ItemStatus = serde_json::from_value(json!(expected)).unwrap();
        assert_eq!(parsed, status);
    }
}

#[test]
fn create_item_request_accepts_console_payload() {
    use medtrack_backend::services::item_service::CreateItemRequest;

    let payload: Value = json!({
        "serialNumber": "SN-2002",
        "productId": Uuid::new_v4(),
        "purchaseInfo": {
            "date": "2024-03-15T12:00:00Z",
            "cost": 9_999.0,
            "supplier": "MedSupply GmbH"
        },
        "maintenanceFrequencyDays": 90
    });

    let req: CreateItemRequest = serde_json::from_value(payload).unwrap();
    assert_eq!(req.serial_number, "SN-2002");
    assert_eq!(req.maintenance_frequency_days, Some(90));
    assert!(req.status.is_none());
    assert!(req.warranty.is_none());
}
