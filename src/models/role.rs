//! Role and permission models.
//!
//! Roles map onto a static table of (resource, action) pairs; see
//! `services::permission_service` for the evaluation function.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Protected resource enum
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Products,
    PurchaseOrders,
    InventoryItems,
    Shipments,
    Users,
    Roles,
}

/// Permission action enum
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum PermissionAction {
    Create,
    Read,
    Update,
    Delete,
    List,
}

/// A single (resource, action) grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Permission {
    pub resource: Resource,
    pub action: PermissionAction,
}
