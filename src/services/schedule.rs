//! Maintenance, calibration and warranty due-date computations.
//!
//! All predicates take the reference instant as an explicit parameter so the
//! callers (listings and the report aggregator) stay deterministic and
//! testable. Note the deliberate asymmetry: maintenance alerting fires only
//! once an item is actually due, while calibration alerting looks ahead by
//! the alert window.

use chrono::{DateTime, Duration, Utc};

use crate::models::item::Item;

/// Days between maintenance visits when an item has no schedule of its own
pub const DEFAULT_MAINTENANCE_FREQUENCY_DAYS: i64 = 180;

/// Lookahead window for calibration and warranty alerts
pub const ALERT_WINDOW_DAYS: i64 = 30;

/// Next maintenance due date after a visit at `now`.
///
/// An explicit `next_due_date` supplied by the technician wins; otherwise the
/// item's own frequency applies, falling back to the 180-day default.
pub fn next_maintenance_date(
    item: &Item,
    now: DateTime<Utc>,
    explicit: Option<DateTime<Utc>>,
) -> DateTime<Utc> {
    match explicit {
        Some(date) => date,
        None => {
            let frequency = item
                .maintenance_frequency_days
                .map(i64::from)
                .unwrap_or(DEFAULT_MAINTENANCE_FREQUENCY_DAYS);
            now + Duration::days(frequency)
        }
    }
}

/// True when the item's maintenance is due (no lookahead).
pub fn is_maintenance_due(item: &Item, now: DateTime<Utc>) -> bool {
    matches!(item.next_maintenance_date, Some(due) if due <= now)
}

/// True when the item's warranty ends within the alert window.
///
/// Closed interval on both ends: already-expired and far-future warranties
/// are excluded, as is any item without an end date.
pub fn is_warranty_expiring(item: &Item, now: DateTime<Utc>, window: Duration) -> bool {
    let end_date = match item.warranty.as_ref().and_then(|w| w.end_date) {
        Some(date) => date,
        None => return false,
    };
    now <= end_date && end_date <= now + window
}

/// True when the item's calibration falls due within the alert window.
pub fn is_calibration_due(item: &Item, now: DateTime<Utc>, window: Duration) -> bool {
    matches!(item.next_calibration_date, Some(due) if due <= now + window)
}

/// True when a scheduled due date has already passed.
pub fn is_overdue(due_date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    due_date < now
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::item::{ItemStatus, PurchaseInfo, Warranty};
    use chrono::TimeZone;
    use uuid::Uuid;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn bare_item() -> Item {
        Item {
            id: Uuid::new_v4(),
            serial_number: "SN-0001".to_string(),
            status: ItemStatus::Inventory,
            product_id: Uuid::new_v4(),
            destination_info: None,
            purchase_info: PurchaseInfo {
                date: utc(2023, 6, 1),
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
            last_updated: utc(2023, 6, 1),
            created_at: utc(2023, 6, 1),
        }
    }

    #[test]
    fn test_next_maintenance_uses_default_frequency() {
        let item = bare_item();
        let now = utc(2024, 1, 1);
        assert_eq!(
            next_maintenance_date(&item, now, None),
            now + Duration::days(180)
        );
    }

    #[test]
    fn test_next_maintenance_uses_item_frequency() {
        let mut item = bare_item();
        item.maintenance_frequency_days = Some(90);
        let now = utc(2024, 1, 1);
        assert_eq!(
            next_maintenance_date(&item, now, None),
            now + Duration::days(90)
        );
    }

    #[test]
    fn test_explicit_next_due_date_wins() {
        let item = bare_item();
        let now = utc(2024, 1, 1);
        let explicit = utc(2024, 3, 15);
        assert_eq!(next_maintenance_date(&item, now, Some(explicit)), explicit);
    }

    #[test]
    fn test_maintenance_due_when_past() {
        let mut item = bare_item();
        item.next_maintenance_date = Some(utc(2024, 1, 1));
        assert!(is_maintenance_due(&item, utc(2024, 2, 1)));
    }

    #[test]
    fn test_maintenance_not_due_when_future() {
        // No lookahead for maintenance: due tomorrow is not due today
        let mut item = bare_item();
        item.next_maintenance_date = Some(utc(2024, 2, 2));
        assert!(!is_maintenance_due(&item, utc(2024, 2, 1)));
    }

    #[test]
    fn test_maintenance_not_due_without_date() {
        assert!(!is_maintenance_due(&bare_item(), utc(2024, 2, 1)));
    }

    fn with_warranty_ending(end: DateTime<Utc>) -> Item {
        let mut item = bare_item();
        item.warranty = Some(Warranty {
            start_date: None,
            end_date: Some(end),
            claim_history: vec![],
        });
        item
    }

    #[test]
    fn test_warranty_expiring_inside_window() {
        let item = with_warranty_ending(utc(2024, 1, 20));
        assert!(is_warranty_expiring(
            &item,
            utc(2024, 1, 1),
            Duration::days(30)
        ));
    }

    #[test]
    fn test_warranty_already_expired_is_not_expiring() {
        let item = with_warranty_ending(utc(2023, 12, 31));
        assert!(!is_warranty_expiring(
            &item,
            utc(2024, 1, 1),
            Duration::days(30)
        ));
    }

    #[test]
    fn test_warranty_far_future_is_not_expiring() {
        let item = with_warranty_ending(utc(2024, 3, 1));
        assert!(!is_warranty_expiring(
            &item,
            utc(2024, 1, 1),
            Duration::days(30)
        ));
    }

    #[test]
    fn test_warranty_window_is_closed_on_both_ends() {
        let now = utc(2024, 1, 1);
        assert!(is_warranty_expiring(
            &with_warranty_ending(now),
            now,
            Duration::days(30)
        ));
        assert!(is_warranty_expiring(
            &with_warranty_ending(now + Duration::days(30)),
            now,
            Duration::days(30)
        ));
    }

    #[test]
    fn test_warranty_without_end_date_is_not_expiring() {
        assert!(!is_warranty_expiring(
            &bare_item(),
            utc(2024, 1, 1),
            Duration::days(30)
        ));
    }

    #[test]
    fn test_calibration_due_looks_ahead() {
        // Calibration alerting looks 30 days ahead, unlike maintenance
        let mut item = bare_item();
        item.next_calibration_date = Some(utc(2024, 1, 25));
        assert!(is_calibration_due(
            &item,
            utc(2024, 1, 1),
            Duration::days(30)
        ));
        item.next_calibration_date = Some(utc(2024, 2, 15));
        assert!(!is_calibration_due(
            &item,
            utc(2024, 1, 1),
            Duration::days(30)
        ));
    }

    #[test]
    fn test_overdue_flag() {
        let now = utc(2024, 2, 1);
        assert!(is_overdue(utc(2024, 1, 1), now));
        assert!(!is_overdue(now, now));
        assert!(!is_overdue(utc(2024, 3, 1), now));
    }
}
