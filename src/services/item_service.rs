//! Inventory item service.
//!
//! Item CRUD, the status transition point, history appends, and the due /
//! expiring listings. Every mutation bumps `last_updated`; history lists are
//! append-only and each append recomputes the relevant next-due date.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;
use std::collections::HashMap;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::item::{
    CalibrationRecord, DestinationInfo, Item, ItemStatus, MaintenanceRecord, MaintenanceType,
    PurchaseInfo, StatusChange, Warranty,
};
use crate::models::product::ProductSummary;
use crate::services::schedule::{
    self, is_maintenance_due, is_warranty_expiring, ALERT_WINDOW_DAYS,
};

/// Request to register a new item at intake
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    pub serial_number: String,
    pub product_id: Uuid,
    pub status: Option<ItemStatus>,
    pub purchase_info: PurchaseInfo,
    pub warranty: Option<Warranty>,
    pub destination_info: Option<DestinationInfo>,
    pub notes: Option<String>,
    pub maintenance_frequency_days: Option<i32>,
}

/// Request to update an item in place
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub status: Option<ItemStatus>,
    pub product_id: Option<Uuid>,
    pub purchase_info: Option<PurchaseInfo>,
    pub warranty: Option<Warranty>,
    pub destination_info: Option<DestinationInfo>,
    pub notes: Option<String>,
    pub maintenance_frequency_days: Option<i32>,
}

/// Request to append a maintenance record
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordMaintenanceRequest {
    pub date: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    pub record_type: Option<MaintenanceType>,
    pub description: Option<String>,
    pub performed_by: Option<String>,
    pub next_due_date: Option<DateTime<Utc>>,
    pub cost: Option<f64>,
    pub attachments: Option<Vec<String>>,
}

/// Request to append a calibration record
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordCalibrationRequest {
    pub date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub performed_by: Option<String>,
    pub next_due_date: Option<DateTime<Utc>>,
    pub results: Option<String>,
    pub certificate: Option<String>,
}

/// Item joined with a compact view of its product
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ItemWithProduct {
    #[serde(flatten)]
    pub item: Item,
    pub product: ProductSummary,
}

/// Scheduled maintenance row for the dashboard calendar
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub serial_number: String,
    pub product_name: String,
    pub due_date: DateTime<Utc>,
    pub maintenance_type: MaintenanceType,
    pub is_overdue: bool,
}

fn required<T>(value: Option<T>, field: &str) -> Result<T> {
    value.ok_or_else(|| AppError::Validation(format!("{} is required", field)))
}

/// Validate a maintenance request into a history record. The event date
/// defaults to `now` when the technician leaves it out.
fn maintenance_record_from(
    req: RecordMaintenanceRequest,
    now: DateTime<Utc>,
) -> Result<MaintenanceRecord> {
    Ok(MaintenanceRecord {
        date: req.date.unwrap_or(now),
        record_type: required(req.record_type, "type")?,
        description: required(req.description, "description")?,
        performed_by: required(req.performed_by, "performedBy")?,
        next_due_date: req.next_due_date,
        cost: req.cost,
        attachments: req.attachments.unwrap_or_default(),
    })
}

/// Validate a calibration request into a history record. Unlike maintenance
/// the next due date is mandatory here; there is no frequency fallback.
fn calibration_record_from(
    req: RecordCalibrationRequest,
    now: DateTime<Utc>,
) -> Result<CalibrationRecord> {
    Ok(CalibrationRecord {
        date: req.date.unwrap_or(now),
        notes: required(req.notes, "notes")?,
        performed_by: required(req.performed_by, "performedBy")?,
        next_due_date: required(req.next_due_date, "nextDueDate")?,
        results: required(req.results, "results")?,
        certificate: req.certificate,
    })
}

/// Placeholder product view for items whose product no longer resolves
fn unknown_product() -> ProductSummary {
    ProductSummary {
        id: Uuid::nil(),
        name: "Unknown Product".to_string(),
        model: String::new(),
        manufacturer: String::new(),
    }
}

/// Item service
pub struct ItemService {
    db: PgPool,
}

impl ItemService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn product_summaries(&self) -> Result<HashMap<Uuid, ProductSummary>> {
        let summaries = sqlx::query_as::<_, ProductSummary>(
            "SELECT id, name, model, manufacturer FROM products",
        )
        .fetch_all(&self.db)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(summaries.into_iter().map(|p| (p.id, p)).collect())
    }

    fn join_products(
        items: Vec<Item>,
        products: &HashMap<Uuid, ProductSummary>,
    ) -> Vec<ItemWithProduct> {
        items
            .into_iter()
            .map(|item| {
                let product = products
                    .get(&item.product_id)
                    .cloned()
                    .unwrap_or_else(unknown_product);
                ItemWithProduct { item, product }
            })
            .collect()
    }

    /// Fetch an item by id, or NotFound.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Item> {
        sqlx::query_as::<_, Item>("SELECT * FROM items WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("Item {} not found", id)))
    }

    /// Fetch an item together with its product summary.
    pub async fn get(&self, id: Uuid) -> Result<ItemWithProduct> {
        let item = self.find_by_id(id).await?;
        let products = self.product_summaries().await?;
        let product = products
            .get(&item.product_id)
            .cloned()
            .unwrap_or_else(unknown_product);
        Ok(ItemWithProduct { item, product })
    }

    /// List all items joined with their product summaries.
    pub async fn list(&self) -> Result<Vec<ItemWithProduct>> {
        let items = sqlx::query_as::<_, Item>("SELECT * FROM items ORDER BY serial_number")
            .fetch_all(&self.db)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        let products = self.product_summaries().await?;
        Ok(Self::join_products(items, &products))
    }

    /// Register a new item at intake.
    pub async fn create(&self, req: CreateItemRequest, now: DateTime<Utc>) -> Result<Item> {
        let serial_number = req.serial_number.trim().to_string();
        if serial_number.is_empty() {
            return Err(AppError::Validation("serialNumber is required".to_string()));
        }

        let frequency = req
            .maintenance_frequency_days
            .map(i64::from)
            .unwrap_or(schedule::DEFAULT_MAINTENANCE_FREQUENCY_DAYS);
        let next_maintenance_date = now + Duration::days(frequency);

        let item = sqlx::query_as::<_, Item>(
            r#"
            INSERT INTO items (
                serial_number, status, product_id, destination_info, purchase_info,
                warranty, notes, maintenance_frequency_days, next_maintenance_date,
                last_updated
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(&serial_number)
        .bind(req.status.unwrap_or(ItemStatus::Inventory))
        .bind(req.product_id)
        .bind(req.destination_info.as_ref().map(Json))
        .bind(Json(&req.purchase_info))
        .bind(req.warranty.as_ref().map(Json))
        .bind(&req.notes)
        .bind(req.maintenance_frequency_days)
        .bind(next_maintenance_date)
        .bind(now)
        .fetch_one(&self.db)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => AppError::Conflict(format!(
                "Item with serial number '{}' already exists",
                serial_number
            )),
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                AppError::NotFound(format!("Product {} not found", req.product_id))
            }
            _ => AppError::Database(e.to_string()),
        })?;

        Ok(item)
    }

    /// Update an item in place.
    pub async fn update(
        &self,
        id: Uuid,
        req: UpdateItemRequest,
        now: DateTime<Utc>,
    ) -> Result<Item> {
        let mut item = self.find_by_id(id).await?;

        if let Some(status) = req.status {
            item.status = status;
        }
        if let Some(product_id) = req.product_id {
            item.product_id = product_id;
        }
        if let Some(purchase_info) = req.purchase_info {
            item.purchase_info = purchase_info;
        }
        if let Some(warranty) = req.warranty {
            item.warranty = Some(warranty);
        }
        if let Some(destination_info) = req.destination_info {
            item.destination_info = Some(destination_info);
        }
        if let Some(notes) = req.notes {
            item.notes = Some(notes);
        }
        if let Some(frequency) = req.maintenance_frequency_days {
            item.maintenance_frequency_days = Some(frequency);
        }
        item.last_updated = now;

        self.persist(&item).await
    }

    /// Delete an item (hard delete).
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Item {} not found", id)));
        }
        Ok(())
    }

    /// Transition an item to a new status.
    ///
    /// The single transition point for the whole API. Transitions are
    /// deliberately unconstrained (any status may follow any other) and
    /// destination details are the caller's responsibility when moving to
    /// demo or delivery; a validity graph could be added here as a guard
    /// without touching call sites.
    pub async fn set_status(
        &self,
        id: Uuid,
        new_status: ItemStatus,
        note: Option<String>,
        actor: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Item> {
        let mut item = self.find_by_id(id).await?;

        item.status = new_status;
        if let Some(note) = note {
            item.status_history.push(StatusChange {
                date: now,
                status: new_status,
                note,
                actor,
            });
        }
        item.last_updated = now;

        self.persist(&item).await
    }

    /// Append a maintenance record and recompute the next due date.
    pub async fn record_maintenance(
        &self,
        id: Uuid,
        req: RecordMaintenanceRequest,
        now: DateTime<Utc>,
    ) -> Result<Item> {
        let mut item = self.find_by_id(id).await?;
        let record = maintenance_record_from(req, now)?;

        item.next_maintenance_date = Some(schedule::next_maintenance_date(
            &item,
            now,
            record.next_due_date,
        ));
        item.maintenance_history.push(record);
        item.last_updated = now;

        self.persist(&item).await
    }

    /// Append a calibration record.
    ///
    /// Unlike maintenance there is no frequency fallback: the caller must
    /// supply the next due date.
    pub async fn record_calibration(
        &self,
        id: Uuid,
        req: RecordCalibrationRequest,
        now: DateTime<Utc>,
    ) -> Result<Item> {
        let mut item = self.find_by_id(id).await?;
        let record = calibration_record_from(req, now)?;

        item.next_calibration_date = Some(record.next_due_date);
        item.calibration_history.push(record);
        item.last_updated = now;

        self.persist(&item).await
    }

    /// Items whose maintenance is due now (no lookahead).
    pub async fn list_maintenance_due(&self, now: DateTime<Utc>) -> Result<Vec<ItemWithProduct>> {
        let items = sqlx::query_as::<_, Item>("SELECT * FROM items ORDER BY serial_number")
            .fetch_all(&self.db)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        let due: Vec<Item> = items
            .into_iter()
            .filter(|i| is_maintenance_due(i, now))
            .collect();
        let products = self.product_summaries().await?;
        Ok(Self::join_products(due, &products))
    }

    /// Items whose warranty expires within the alert window.
    pub async fn list_warranty_expiring(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<ItemWithProduct>> {
        let window = Duration::days(ALERT_WINDOW_DAYS);
        let items = sqlx::query_as::<_, Item>("SELECT * FROM items ORDER BY serial_number")
            .fetch_all(&self.db)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        let expiring: Vec<Item> = items
            .into_iter()
            .filter(|i| is_warranty_expiring(i, now, window))
            .collect();
        let products = self.product_summaries().await?;
        Ok(Self::join_products(expiring, &products))
    }

    /// Upcoming maintenance rows within the alert window.
    pub async fn maintenance_schedule(&self, now: DateTime<Utc>) -> Result<Vec<ScheduleEntry>> {
        let horizon = now + Duration::days(ALERT_WINDOW_DAYS);
        let items = sqlx::query_as::<_, Item>("SELECT * FROM items ORDER BY serial_number")
            .fetch_all(&self.db)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        let products = self.product_summaries().await?;

        let mut entries: Vec<ScheduleEntry> = items
            .iter()
            .filter_map(|item| {
                let last = item.maintenance_history.last();
                let due_date = item
                    .next_maintenance_date
                    .or_else(|| last.and_then(|r| r.next_due_date))?;
                if due_date > horizon {
                    return None;
                }
                let product_name = products
                    .get(&item.product_id)
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| "Unknown Product".to_string());
                Some(ScheduleEntry {
                    serial_number: item.serial_number.clone(),
                    product_name,
                    due_date,
                    maintenance_type: last
                        .map(|r| r.record_type)
                        .unwrap_or(MaintenanceType::Preventive),
                    is_overdue: schedule::is_overdue(due_date, now),
                })
            })
            .collect();
        entries.sort_by_key(|e| e.due_date);
        Ok(entries)
    }

    /// Write the full item row back. Last write wins on concurrent updates.
    async fn persist(&self, item: &Item) -> Result<Item> {
        sqlx::query_as::<_, Item>(
            r#"
            UPDATE items SET
                serial_number = $2,
                status = $3,
                product_id = $4,
                destination_info = $5,
                purchase_info = $6,
                warranty = $7,
                maintenance_history = $8,
                calibration_history = $9,
                status_history = $10,
                notes = $11,
                maintenance_frequency_days = $12,
                next_maintenance_date = $13,
                next_calibration_date = $14,
                last_updated = $15
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(item.id)
        .bind(&item.serial_number)
        .bind(item.status)
        .bind(item.product_id)
        .bind(item.destination_info.as_ref().map(Json))
        .bind(Json(&item.purchase_info))
        .bind(item.warranty.as_ref().map(Json))
        .bind(Json(&item.maintenance_history))
        .bind(Json(&item.calibration_history))
        .bind(Json(&item.status_history))
        .bind(&item.notes)
        .bind(item.maintenance_frequency_days)
        .bind(item.next_maintenance_date)
        .bind(item.next_calibration_date)
        .bind(item.last_updated)
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn full_maintenance_request() -> RecordMaintenanceRequest {
        RecordMaintenanceRequest {
            date: Some(utc(2024, 3, 1)),
            record_type: Some(MaintenanceType::Preventive),
            description: Some("annual service".to_string()),
            performed_by: Some("tech".to_string()),
            next_due_date: Some(utc(2024, 9, 1)),
            cost: Some(250.0),
            attachments: None,
        }
    }

    fn full_calibration_request() -> RecordCalibrationRequest {
        RecordCalibrationRequest {
            date: Some(utc(2024, 3, 1)),
            notes: Some("within tolerance".to_string()),
            performed_by: Some("tech".to_string()),
            next_due_date: Some(utc(2024, 6, 1)),
            results: Some("pass".to_string()),
            certificate: None,
        }
    }

    fn assert_rejects_missing(result: Result<impl Sized>, field: &str) {
        match result {
            Err(AppError::Validation(msg)) => {
                assert_eq!(msg, format!("{} is required", field))
            }
            Err(other) => panic!("expected validation error for {}, got {:?}", field, other),
            Ok(_) => panic!("accepted request missing {}", field),
        }
    }

    #[test]
    fn test_required_field_validation_message() {
        let err = required::<String>(None, "performedBy").unwrap_err();
        match err {
            AppError::Validation(msg) => assert_eq!(msg, "performedBy is required"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_maintenance_record_accepts_complete_request() {
        let record = maintenance_record_from(full_maintenance_request(), utc(2024, 3, 5)).unwrap();
        assert_eq!(record.date, utc(2024, 3, 1));
        assert_eq!(record.record_type, MaintenanceType::Preventive);
        assert_eq!(record.next_due_date, Some(utc(2024, 9, 1)));
        assert!(record.attachments.is_empty());
    }

    #[test]
    fn test_maintenance_record_rejects_missing_type() {
        let mut req = full_maintenance_request();
        req.record_type = None;
        assert_rejects_missing(maintenance_record_from(req, utc(2024, 3, 5)), "type");
    }

    #[test]
    fn test_maintenance_record_rejects_missing_description() {
        let mut req = full_maintenance_request();
        req.description = None;
        assert_rejects_missing(maintenance_record_from(req, utc(2024, 3, 5)), "description");
    }

    #[test]
    fn test_maintenance_record_rejects_missing_performed_by() {
        let mut req = full_maintenance_request();
        req.performed_by = None;
        assert_rejects_missing(maintenance_record_from(req, utc(2024, 3, 5)), "performedBy");
    }

    #[test]
    fn test_maintenance_date_and_next_due_are_optional() {
        let mut req = full_maintenance_request();
        req.date = None;
        req.next_due_date = None;
        let now = utc(2024, 3, 5);
        let record = maintenance_record_from(req, now).unwrap();
        assert_eq!(record.date, now);
        assert_eq!(record.next_due_date, None);
    }

    #[test]
    fn test_calibration_record_accepts_complete_request() {
        let record = calibration_record_from(full_calibration_request(), utc(2024, 3, 5)).unwrap();
        assert_eq!(record.next_due_date, utc(2024, 6, 1));
        assert_eq!(record.results, "pass");
    }

    #[test]
    fn test_calibration_record_rejects_missing_notes() {
        let mut req = full_calibration_request();
        req.notes = None;
        assert_rejects_missing(calibration_record_from(req, utc(2024, 3, 5)), "notes");
    }

    #[test]
    fn test_calibration_record_rejects_missing_performed_by() {
        let mut req = full_calibration_request();
        req.performed_by = None;
        assert_rejects_missing(calibration_record_from(req, utc(2024, 3, 5)), "performedBy");
    }

    #[test]
    fn test_calibration_record_rejects_missing_next_due_date() {
        let mut req = full_calibration_request();
        req.next_due_date = None;
        assert_rejects_missing(calibration_record_from(req, utc(2024, 3, 5)), "nextDueDate");
    }

    #[test]
    fn test_calibration_record_rejects_missing_results() {
        let mut req = full_calibration_request();
        req.results = None;
        assert_rejects_missing(calibration_record_from(req, utc(2024, 3, 5)), "results");
    }

    #[test]
    fn test_unknown_product_placeholder() {
        let placeholder = unknown_product();
        assert_eq!(placeholder.name, "Unknown Product");
        assert!(placeholder.model.is_empty());
        assert_eq!(placeholder.id, Uuid::nil());
    }
}
