//! Inventory report aggregation.
//!
//! The aggregation itself is a pure function over full item and product
//! snapshots with an explicit reference instant, so two calls over the same
//! snapshot produce identical reports. The service wrapper performs the
//! full-collection scan per invocation; nothing is cached, so reports are
//! always fresh. A caching implementation can replace the wrapper without
//! touching the report's field contract.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::{BTreeMap, HashMap};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::item::{Item, ItemStatus};
use crate::models::product::{Product, ProductSummary};
use crate::services::schedule::{
    is_calibration_due, is_maintenance_due, is_warranty_expiring, ALERT_WINDOW_DAYS,
};

/// Count of items in one status for a single product
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusCount {
    pub status: ItemStatus,
    pub count: u64,
}

/// Per-product inventory breakdown
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductCount {
    pub product: ProductSummary,
    pub total_count: u64,
    pub statuses: Vec<StatusCount>,
}

/// Due/expiring alert counters
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportAlerts {
    pub maintenance_due: u64,
    pub warranty_expiring: u64,
}

/// Calibration throughput counters
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationStats {
    pub due_count: u64,
    pub completed_this_month: u64,
    pub completion_rate: f64,
}

/// One slice of the category pie chart
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategorySlice {
    pub name: String,
    pub value: u64,
}

/// Aggregate inventory report for the dashboard
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryReport {
    pub total_counts: BTreeMap<String, u64>,
    pub product_counts: Vec<ProductCount>,
    pub alerts: ReportAlerts,
    pub maintenance_trend: f64,
    pub calibration_stats: CalibrationStats,
    pub category_distribution: Vec<CategorySlice>,
    pub generated_at: DateTime<Utc>,
}

/// A recent history event, for the dashboard activity feed
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub serial_number: String,
    pub description: String,
}

/// Kind of history event behind an activity entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Status,
    Maintenance,
    Calibration,
}

/// First instant of the month containing `now`.
fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let date = now.date_naive().with_day(1).unwrap_or_else(|| now.date_naive());
    date.and_time(NaiveTime::MIN).and_utc()
}

/// First instant of the month before the given month start.
fn previous_month_start(start: DateTime<Utc>) -> DateTime<Utc> {
    let date = start.date_naive();
    let (year, month) = if date.month() == 1 {
        (date.year() - 1, 12)
    } else {
        (date.year(), date.month() - 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
        .unwrap_or(start)
}

/// Build the aggregate inventory report from full collection snapshots.
pub fn build_inventory_report(
    items: &[Item],
    products: &[Product],
    now: DateTime<Utc>,
) -> InventoryReport {
    let window = Duration::days(ALERT_WINDOW_DAYS);
    let product_by_id: HashMap<Uuid, &Product> =
        products.iter().map(|p| (p.id, p)).collect();

    // Status totals over all items
    let mut total_counts: BTreeMap<String, u64> = BTreeMap::new();
    for item in items {
        *total_counts.entry(item.status.as_str().to_string()).or_insert(0) += 1;
    }

    // Per-product breakdown; products with no items are omitted
    let mut per_product: HashMap<Uuid, HashMap<ItemStatus, u64>> = HashMap::new();
    for item in items {
        *per_product
            .entry(item.product_id)
            .or_default()
            .entry(item.status)
            .or_insert(0) += 1;
    }
    let mut product_counts: Vec<ProductCount> = per_product
        .into_iter()
        .filter_map(|(product_id, by_status)| {
            let product = product_by_id.get(&product_id)?;
            let statuses: Vec<StatusCount> = ItemStatus::ALL
                .iter()
                .filter_map(|status| {
                    by_status.get(status).map(|&count| StatusCount {
                        status: *status,
                        count,
                    })
                })
                .collect();
            Some(ProductCount {
                product: ProductSummary {
                    id: product.id,
                    name: product.name.clone(),
                    model: product.model.clone(),
                    manufacturer: product.manufacturer.clone(),
                },
                total_count: by_status.values().sum(),
                statuses,
            })
        })
        .collect();
    product_counts.sort_by(|a, b| {
        a.product
            .name
            .cmp(&b.product.name)
            .then(a.product.id.cmp(&b.product.id))
    });

    // Alert counters
    let maintenance_due = items.iter().filter(|i| is_maintenance_due(i, now)).count() as u64;
    let warranty_expiring = items
        .iter()
        .filter(|i| is_warranty_expiring(i, now, window))
        .count() as u64;

    // Maintenance trend: prior calendar month vs the month before that
    let current_start = month_start(now);
    let prev_start = previous_month_start(current_start);
    let prev_prev_start = previous_month_start(prev_start);
    let count_in = |from: DateTime<Utc>, to: DateTime<Utc>| -> u64 {
        items
            .iter()
            .flat_map(|i| i.maintenance_history.iter())
            .filter(|r| r.date >= from && r.date < to)
            .count() as u64
    };
    let last_month = count_in(prev_start, now);
    let two_months_ago = count_in(prev_prev_start, prev_start);
    let maintenance_trend = if two_months_ago == 0 {
        0.0
    } else {
        (last_month as f64 - two_months_ago as f64) / two_months_ago as f64 * 100.0
    };

    // Calibration throughput
    let due_count = items
        .iter()
        .filter(|i| is_calibration_due(i, now, window))
        .count() as u64;
    let completed_this_month = items
        .iter()
        .flat_map(|i| i.calibration_history.iter())
        .filter(|r| r.date >= current_start)
        .count() as u64;
    let completion_rate = if completed_this_month + due_count == 0 {
        0.0
    } else {
        completed_this_month as f64 / (completed_this_month + due_count) as f64 * 100.0
    };

    // Category distribution for the pie chart
    let mut by_category: BTreeMap<&'static str, u64> = BTreeMap::new();
    for item in items {
        if let Some(product) = product_by_id.get(&item.product_id) {
            *by_category.entry(product.category.as_str()).or_insert(0) += 1;
        }
    }
    let category_distribution = by_category
        .into_iter()
        .map(|(name, value)| CategorySlice {
            name: name.to_string(),
            value,
        })
        .collect();

    InventoryReport {
        total_counts,
        product_counts,
        alerts: ReportAlerts {
            maintenance_due,
            warranty_expiring,
        },
        maintenance_trend,
        calibration_stats: CalibrationStats {
            due_count,
            completed_this_month,
            completion_rate,
        },
        category_distribution,
        generated_at: now,
    }
}

/// Collect the newest history events across all items, newest first.
pub fn recent_activities(items: &[Item], limit: usize) -> Vec<Activity> {
    let mut activities: Vec<Activity> = Vec::new();
    for item in items {
        for record in &item.status_history {
            activities.push(Activity {
                date: record.date,
                activity_type: ActivityType::Status,
                serial_number: item.serial_number.clone(),
                description: record.note.clone(),
            });
        }
        for record in &item.maintenance_history {
            activities.push(Activity {
                date: record.date,
                activity_type: ActivityType::Maintenance,
                serial_number: item.serial_number.clone(),
                description: record.description.clone(),
            });
        }
        for record in &item.calibration_history {
            activities.push(Activity {
                date: record.date,
                activity_type: ActivityType::Calibration,
                serial_number: item.serial_number.clone(),
                description: record.notes.clone(),
            });
        }
    }
    activities.sort_by(|a, b| b.date.cmp(&a.date));
    activities.truncate(limit);
    activities
}

/// Report service performing the full-collection scans.
pub struct ReportService {
    db: PgPool,
}

impl ReportService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn load_items(&self) -> Result<Vec<Item>> {
        sqlx::query_as::<_, Item>("SELECT * FROM items")
            .fetch_all(&self.db)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Build the dashboard inventory report.
    pub async fn inventory_report(&self, now: DateTime<Utc>) -> Result<InventoryReport> {
        let items = self.load_items().await?;
        let products = sqlx::query_as::<_, Product>("SELECT * FROM products")
            .fetch_all(&self.db)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(build_inventory_report(&items, &products, now))
    }

    /// Most recent history events across the whole collection.
    pub async fn recent_activities(&self, limit: usize) -> Result<Vec<Activity>> {
        let items = self.load_items().await?;
        Ok(recent_activities(&items, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::item::{
        CalibrationRecord, MaintenanceRecord, MaintenanceType, PurchaseInfo, Warranty,
    };
    use crate::models::product::{EquipmentCategory, MaintenanceScheduleTemplate};
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn product(name: &str, category: EquipmentCategory) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            model: "X-100".to_string(),
            manufacturer: "Acme Medical".to_string(),
            category,
            specifications: None,
            certifications: vec![],
            maintenance_schedule: MaintenanceScheduleTemplate::default(),
            warranty: None,
            price: None,
            created_at: utc(2023, 1, 1),
            updated_at: utc(2023, 1, 1),
        }
    }

    fn item(serial: &str, product_id: Uuid, status: ItemStatus) -> Item {
        Item {
            id: Uuid::new_v4(),
            serial_number: serial.to_string(),
            status,
            product_id,
            destination_info: None,
            purchase_info: PurchaseInfo {
                date: utc(2023, 1, 15),
                cost: None,
                supplier: None,
                order_reference: None,
            },
            warranty: None,
            maintenance_history: vec![],
            calibration_history: vec![],
            status_history: vec![],
            notes: None,
            maintenance_frequency_days: None,
            next_maintenance_date: None,
            next_calibration_date: None,
            last_updated: utc(2023, 1, 15),
            created_at: utc(2023, 1, 15),
        }
    }

    fn maintenance_on(date: DateTime<Utc>) -> MaintenanceRecord {
        MaintenanceRecord {
            date,
            record_type: MaintenanceType::Preventive,
            description: "routine service".to_string(),
            performed_by: "tech".to_string(),
            next_due_date: None,
            cost: None,
            attachments: vec![],
        }
    }

    #[test]
    fn test_total_counts_by_status() {
        let p = product("Monitor", EquipmentCategory::PatientMonitoring);
        let mut items = Vec::new();
        for i in 0..6 {
            items.push(item(&format!("INV-{i}"), p.id, ItemStatus::Inventory));
        }
        for i in 0..4 {
            items.push(item(&format!("DEMO-{i}"), p.id, ItemStatus::Demo));
        }

        let report = build_inventory_report(&items, &[p], utc(2024, 2, 1));
        assert_eq!(report.total_counts.get("inventory"), Some(&6));
        assert_eq!(report.total_counts.get("demo"), Some(&4));
        assert_eq!(report.total_counts.get("delivery"), None);
    }

    #[test]
    fn test_product_counts_omit_products_without_items() {
        let with_items = product("Analyzer", EquipmentCategory::LaboratoryEquipment);
        let without_items = product("Scanner", EquipmentCategory::ImagingEquipment);
        let items = vec![
            item("A-1", with_items.id, ItemStatus::Inventory),
            item("A-2", with_items.id, ItemStatus::Demo),
        ];

        let report =
            build_inventory_report(&items, &[with_items.clone(), without_items], utc(2024, 2, 1));
        assert_eq!(report.product_counts.len(), 1);
        let pc = &report.product_counts[0];
        assert_eq!(pc.product.id, with_items.id);
        assert_eq!(pc.total_count, 2);
        assert_eq!(pc.statuses.len(), 2);
    }

    #[test]
    fn test_maintenance_due_alert_counts_strictly_due() {
        let p = product("Pump", EquipmentCategory::MedicalSupplies);
        let now = utc(2024, 2, 1);
        let mut due = item("DUE-1", p.id, ItemStatus::Inventory);
        due.next_maintenance_date = Some(utc(2024, 1, 1));
        let mut upcoming = item("UP-1", p.id, ItemStatus::Inventory);
        upcoming.next_maintenance_date = Some(utc(2024, 2, 15));

        let report = build_inventory_report(&[due, upcoming], &[p], now);
        assert_eq!(report.alerts.maintenance_due, 1);
    }

    #[test]
    fn test_warranty_expiring_alert_excludes_expired() {
        let p = product("Ventilator", EquipmentCategory::SurgicalEquipment);
        let now = utc(2024, 2, 1);
        let mut expiring = item("W-1", p.id, ItemStatus::Inventory);
        expiring.warranty = Some(Warranty {
            start_date: None,
            end_date: Some(utc(2024, 2, 20)),
            claim_history: vec![],
        });
        let mut expired = item("W-2", p.id, ItemStatus::Inventory);
        expired.warranty = Some(Warranty {
            start_date: None,
            end_date: Some(utc(2024, 1, 20)),
            claim_history: vec![],
        });

        let report = build_inventory_report(&[expiring, expired], &[p], now);
        assert_eq!(report.alerts.warranty_expiring, 1);
    }

    #[test]
    fn test_maintenance_trend_guards_division_by_zero() {
        let p = product("Defibrillator", EquipmentCategory::DiagnosticSystem);
        let mut i = item("T-1", p.id, ItemStatus::Inventory);
        // 5 events last month, none the month before
        for day in 1..=5 {
            i.maintenance_history.push(maintenance_on(utc(2024, 1, day)));
        }

        let report = build_inventory_report(&[i], &[p], utc(2024, 2, 10));
        assert_eq!(report.maintenance_trend, 0.0);
    }

    #[test]
    fn test_maintenance_trend_doubling_is_100_percent() {
        let p = product("Defibrillator", EquipmentCategory::DiagnosticSystem);
        let mut i = item("T-2", p.id, ItemStatus::Inventory);
        for day in 1..=10 {
            i.maintenance_history.push(maintenance_on(utc(2024, 1, day)));
        }
        for day in 1..=5 {
            i.maintenance_history.push(maintenance_on(utc(2023, 12, day)));
        }

        let report = build_inventory_report(&[i], &[p], utc(2024, 2, 10));
        assert_eq!(report.maintenance_trend, 100.0);
    }

    #[test]
    fn test_calibration_stats_completion_rate() {
        let p = product("Analyzer", EquipmentCategory::LaboratoryEquipment);
        let now = utc(2024, 2, 10);
        let mut completed = item("C-1", p.id, ItemStatus::Inventory);
        completed.calibration_history.push(CalibrationRecord {
            date: utc(2024, 2, 5),
            notes: "annual calibration".to_string(),
            performed_by: "tech".to_string(),
            next_due_date: utc(2025, 2, 5),
            results: "pass".to_string(),
            certificate: None,
        });
        let mut due = item("C-2", p.id, ItemStatus::Inventory);
        due.next_calibration_date = Some(utc(2024, 2, 20));

        let report = build_inventory_report(&[completed, due], &[p], now);
        assert_eq!(report.calibration_stats.due_count, 1);
        assert_eq!(report.calibration_stats.completed_this_month, 1);
        assert_eq!(report.calibration_stats.completion_rate, 50.0);
    }

    #[test]
    fn test_category_distribution() {
        let lab = product("Analyzer", EquipmentCategory::LaboratoryEquipment);
        let imaging = product("Scanner", EquipmentCategory::ImagingEquipment);
        let items = vec![
            item("L-1", lab.id, ItemStatus::Inventory),
            item("L-2", lab.id, ItemStatus::Demo),
            item("I-1", imaging.id, ItemStatus::Inventory),
        ];

        let report = build_inventory_report(&items, &[lab, imaging], utc(2024, 2, 1));
        let lab_slice = report
            .category_distribution
            .iter()
            .find(|s| s.name == "Laboratory Equipment")
            .unwrap();
        assert_eq!(lab_slice.value, 2);
        let imaging_slice = report
            .category_distribution
            .iter()
            .find(|s| s.name == "Imaging Equipment")
            .unwrap();
        assert_eq!(imaging_slice.value, 1);
    }

    #[test]
    fn test_report_is_deterministic() {
        let p1 = product("Analyzer", EquipmentCategory::LaboratoryEquipment);
        let p2 = product("Scanner", EquipmentCategory::ImagingEquipment);
        let mut i1 = item("D-1", p1.id, ItemStatus::Inventory);
        i1.maintenance_history.push(maintenance_on(utc(2024, 1, 3)));
        let i2 = item("D-2", p2.id, ItemStatus::Delivery);
        let items = vec![i1, i2];
        let products = vec![p1, p2];
        let now = utc(2024, 2, 1);

        let a = build_inventory_report(&items, &products, now);
        let b = build_inventory_report(&items, &products, now);
        assert_eq!(
            serde_json::to_value(&a).unwrap(),
            serde_json::to_value(&b).unwrap()
        );
    }

    #[test]
    fn test_recent_activities_sorted_and_limited() {
        let p = product("Monitor", EquipmentCategory::PatientMonitoring);
        let mut i = item("ACT-1", p.id, ItemStatus::Inventory);
        for day in 1..=15 {
            i.maintenance_history.push(maintenance_on(utc(2024, 1, day)));
        }

        let activities = recent_activities(&[i], 10);
        assert_eq!(activities.len(), 10);
        assert_eq!(activities[0].date, utc(2024, 1, 15));
        assert!(activities.windows(2).all(|w| w[0].date >= w[1].date));
    }

    #[test]
    fn test_month_start_rollover() {
        let jan = month_start(utc(2024, 1, 20));
        assert_eq!(jan, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let dec = previous_month_start(jan);
        assert_eq!(dec, Utc.with_ymd_and_hms(2023, 12, 1, 0, 0, 0).unwrap());
    }
}
