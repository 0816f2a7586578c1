//! Inventory item model.
//!
//! An item is a single serialized physical unit of a catalog product. Its
//! maintenance, calibration, status and warranty-claim histories are
//! append-only JSONB sub-documents; field names follow the wire format the
//! admin console consumes (camelCase, ISO-8601 dates).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Item status enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "item_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Inventory,
    Demo,
    Delivery,
    Maintenance,
}

impl ItemStatus {
    /// All statuses, in the order dashboard breakdowns list them
    pub const ALL: [ItemStatus; 4] = [
        ItemStatus::Inventory,
        ItemStatus::Demo,
        ItemStatus::Delivery,
        ItemStatus::Maintenance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Inventory => "inventory",
            ItemStatus::Demo => "demo",
            ItemStatus::Delivery => "delivery",
            ItemStatus::Maintenance => "maintenance",
        }
    }
}

/// Maintenance record type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MaintenanceType {
    Preventive,
    Corrective,
    Inspection,
}

/// A single maintenance history entry
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceRecord {
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub record_type: MaintenanceType,
    pub description: String,
    pub performed_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_due_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(default)]
    pub attachments: Vec<String>,
}

/// A single calibration history entry
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationRecord {
    pub date: DateTime<Utc>,
    pub notes: String,
    pub performed_by: String,
    pub next_due_date: DateTime<Utc>,
    pub results: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<String>,
}

/// A single status transition audit entry
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub date: DateTime<Utc>,
    pub status: ItemStatus,
    pub note: String,
    pub actor: Uuid,
}

/// A single warranty claim entry
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WarrantyClaim {
    pub date: DateTime<Utc>,
    pub description: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
}

/// Warranty coverage for an item
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Warranty {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub claim_history: Vec<WarrantyClaim>,
}

/// Purchase details captured at intake
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseInfo {
    pub date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_reference: Option<String>,
}

/// Destination details for items in demo or delivery status
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DestinationInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
    /// Expected return date for demo units
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_return_date: Option<DateTime<Utc>>,
}

/// Item entity
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: Uuid,
    pub serial_number: String,
    pub status: ItemStatus,
    pub product_id: Uuid,
    #[sqlx(json(nullable))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_info: Option<DestinationInfo>,
    #[sqlx(json)]
    pub purchase_info: PurchaseInfo,
    #[sqlx(json(nullable))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warranty: Option<Warranty>,
    #[sqlx(json)]
    pub maintenance_history: Vec<MaintenanceRecord>,
    #[sqlx(json)]
    pub calibration_history: Vec<CalibrationRecord>,
    #[sqlx(json)]
    pub status_history: Vec<StatusChange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance_frequency_days: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_maintenance_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_calibration_date: Option<DateTime<Utc>>,
    pub last_updated: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
