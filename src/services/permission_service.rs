//! Role-based permission evaluation.
//!
//! Pure lookup over a static role -> (resource, action) table. Admin
//! implicitly holds every pair; anything not in the table is denied.
//! This resource/action model is canonical; the legacy numeric role
//! hierarchy from earlier snapshots of the system is intentionally not
//! implemented.

use crate::error::{AppError, Result};
use crate::models::role::{Permission, PermissionAction, Resource};
use crate::models::user::UserRole;

use PermissionAction::{Create, Delete, List, Read, Update};
use Resource::{InventoryItems, Products, PurchaseOrders, Shipments};

const fn grant(resource: Resource, action: PermissionAction) -> Permission {
    Permission { resource, action }
}

/// Grants held by inventory staff
const INVENTORY_STAFF_GRANTS: &[Permission] = &[
    grant(Products, Read),
    grant(Products, List),
    grant(InventoryItems, Create),
    grant(InventoryItems, Read),
    grant(InventoryItems, Update),
    grant(InventoryItems, List),
    grant(PurchaseOrders, Read),
    grant(PurchaseOrders, List),
];

/// Grants held by logistics managers
const LOGISTICS_MANAGER_GRANTS: &[Permission] = &[
    grant(Products, Read),
    grant(Products, List),
    grant(InventoryItems, Read),
    grant(InventoryItems, Update),
    grant(InventoryItems, List),
    grant(PurchaseOrders, Create),
    grant(PurchaseOrders, Read),
    grant(PurchaseOrders, Update),
    grant(PurchaseOrders, List),
    grant(Shipments, Create),
    grant(Shipments, Read),
    grant(Shipments, Update),
    grant(Shipments, Delete),
    grant(Shipments, List),
];

/// Grants held by customers
const CUSTOMER_GRANTS: &[Permission] = &[grant(Products, Read), grant(Products, List)];

fn grants_for(role: UserRole) -> &'static [Permission] {
    match role {
        // Admin is handled by the wildcard in has_permission
        UserRole::Admin => &[],
        UserRole::InventoryStaff => INVENTORY_STAFF_GRANTS,
        UserRole::LogisticsManager => LOGISTICS_MANAGER_GRANTS,
        UserRole::Customer => CUSTOMER_GRANTS,
    }
}

/// Check whether a role may perform an action on a resource.
pub fn has_permission(role: UserRole, resource: Resource, action: PermissionAction) -> bool {
    if role == UserRole::Admin {
        return true;
    }
    grants_for(role)
        .iter()
        .any(|g| g.resource == resource && g.action == action)
}

/// Evaluate a permission check, turning a denial into an authorization error.
pub fn require(role: UserRole, resource: Resource, action: PermissionAction) -> Result<()> {
    if has_permission(role, resource, action) {
        Ok(())
    } else {
        Err(AppError::Authorization(format!(
            "role {:?} may not {:?} {:?}",
            role, action, resource
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_RESOURCES: [Resource; 6] = [
        Resource::Products,
        Resource::PurchaseOrders,
        Resource::InventoryItems,
        Resource::Shipments,
        Resource::Users,
        Resource::Roles,
    ];

    const ALL_ACTIONS: [PermissionAction; 5] = [
        PermissionAction::Create,
        PermissionAction::Read,
        PermissionAction::Update,
        PermissionAction::Delete,
        PermissionAction::List,
    ];

    #[test]
    fn test_admin_has_every_permission() {
        for resource in ALL_RESOURCES {
            for action in ALL_ACTIONS {
                assert!(
                    has_permission(UserRole::Admin, resource, action),
                    "admin denied {:?} on {:?}",
                    action,
                    resource
                );
            }
        }
    }

    #[test]
    fn test_customer_is_read_only_on_products() {
        assert!(has_permission(
            UserRole::Customer,
            Resource::Products,
            PermissionAction::Read
        ));
        assert!(!has_permission(
            UserRole::Customer,
            Resource::Products,
            PermissionAction::Create
        ));
        assert!(!has_permission(
            UserRole::Customer,
            Resource::InventoryItems,
            PermissionAction::Read
        ));
    }

    #[test]
    fn test_non_admin_never_manages_users() {
        for role in [
            UserRole::Customer,
            UserRole::InventoryStaff,
            UserRole::LogisticsManager,
        ] {
            for action in ALL_ACTIONS {
                assert!(!has_permission(role, Resource::Users, action));
                assert!(!has_permission(role, Resource::Roles, action));
            }
        }
    }

    #[test]
    fn test_inventory_staff_cannot_delete_items() {
        assert!(has_permission(
            UserRole::InventoryStaff,
            Resource::InventoryItems,
            PermissionAction::Update
        ));
        assert!(!has_permission(
            UserRole::InventoryStaff,
            Resource::InventoryItems,
            PermissionAction::Delete
        ));
    }

    #[test]
    fn test_grant_tables_have_no_duplicate_pairs() {
        for grants in [INVENTORY_STAFF_GRANTS, LOGISTICS_MANAGER_GRANTS, CUSTOMER_GRANTS] {
            for (i, grant) in grants.iter().enumerate() {
                assert!(
                    !grants[i + 1..].contains(grant),
                    "duplicate grant {:?}",
                    grant
                );
            }
        }
    }

    #[test]
    fn test_require_maps_denial_to_authorization_error() {
        let err = require(
            UserRole::Customer,
            Resource::InventoryItems,
            PermissionAction::Delete,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));
    }
}
