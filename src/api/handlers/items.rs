//! Inventory item handlers.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::api::dto::MessageResponse;
use crate::api::middleware::auth::AuthExtension;
use crate::api::SharedState;
use crate::error::Result;
use crate::models::item::{
    CalibrationRecord, DestinationInfo, Item, ItemStatus, MaintenanceRecord, MaintenanceType,
    PurchaseInfo, StatusChange, Warranty, WarrantyClaim,
};
use crate::models::role::{PermissionAction, Resource};
use crate::services::item_service::{
    CreateItemRequest, ItemService, ItemWithProduct, RecordCalibrationRequest,
    RecordMaintenanceRequest, UpdateItemRequest,
};
use crate::services::permission_service;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/maintenance-due", get(list_maintenance_due))
        .route("/warranty-expiring", get(list_warranty_expiring))
        .route("/:id", get(get_item).put(update_item).delete(delete_item))
        .route("/:id/status", patch(set_status))
        .route("/:id/maintenance", post(record_maintenance))
        .route("/:id/calibration", post(record_calibration))
}

/// Request to transition an item to a new status
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetStatusRequest {
    pub status: ItemStatus,
    pub note: Option<String>,
}

/// List all inventory items
#[utoipa::path(
    get,
    path = "",
    context_path = "/api/v1/items",
    tag = "items",
    responses((status = 200, description = "All items", body = [ItemWithProduct])),
    security(("bearer_auth" = []))
)]
pub async fn list_items(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
) -> Result<Json<Vec<ItemWithProduct>>> {
    permission_service::require(auth.role, Resource::InventoryItems, PermissionAction::List)?;
    let items = ItemService::new(state.db.clone()).list().await?;
    Ok(Json(items))
}

/// Register a new item at intake
#[utoipa::path(
    post,
    path = "",
    context_path = "/api/v1/items",
    tag = "items",
    request_body = CreateItemRequest,
    responses(
        (status = 201, description = "Item created", body = Item),
        (status = 409, description = "Serial number already exists"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_item(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
    Json(req): Json<CreateItemRequest>,
) -> Result<(StatusCode, Json<Item>)> {
    permission_service::require(auth.role, Resource::InventoryItems, PermissionAction::Create)?;
    let item = ItemService::new(state.db.clone()).create(req, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Items whose maintenance is due now
#[utoipa::path(
    get,
    path = "/maintenance-due",
    context_path = "/api/v1/items",
    tag = "items",
    responses((status = 200, description = "Items due for maintenance", body = [ItemWithProduct])),
    security(("bearer_auth" = []))
)]
pub async fn list_maintenance_due(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
) -> Result<Json<Vec<ItemWithProduct>>> {
    permission_service::require(auth.role, Resource::InventoryItems, PermissionAction::List)?;
    let items = ItemService::new(state.db.clone())
        .list_maintenance_due(Utc::now())
        .await?;
    Ok(Json(items))
}

/// Items whose warranty expires within the next 30 days
#[utoipa::path(
    get,
    path = "/warranty-expiring",
    context_path = "/api/v1/items",
    tag = "items",
    responses((status = 200, description = "Items with expiring warranty", body = [ItemWithProduct])),
    security(("bearer_auth" = []))
)]
pub async fn list_warranty_expiring(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
) -> Result<Json<Vec<ItemWithProduct>>> {
    permission_service::require(auth.role, Resource::InventoryItems, PermissionAction::List)?;
    let items = ItemService::new(state.db.clone())
        .list_warranty_expiring(Utc::now())
        .await?;
    Ok(Json(items))
}

/// Get an item by id
#[utoipa::path(
    get,
    path = "/{id}",
    context_path = "/api/v1/items",
    tag = "items",
    params(("id" = Uuid, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Item found", body = ItemWithProduct),
        (status = 404, description = "Item not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_item(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
    Path(id): Path<Uuid>,
) -> Result<Json<ItemWithProduct>> {
    permission_service::require(auth.role, Resource::InventoryItems, PermissionAction::Read)?;
    let item = ItemService::new(state.db.clone()).get(id).await?;
    Ok(Json(item))
}

/// Update an item in place
#[utoipa::path(
    put,
    path = "/{id}",
    context_path = "/api/v1/items",
    tag = "items",
    params(("id" = Uuid, Path, description = "Item ID")),
    request_body = UpdateItemRequest,
    responses(
        (status = 200, description = "Item updated", body = Item),
        (status = 404, description = "Item not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_item(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateItemRequest>,
) -> Result<Json<Item>> {
    permission_service::require(auth.role, Resource::InventoryItems, PermissionAction::Update)?;
    let item = ItemService::new(state.db.clone())
        .update(id, req, Utc::now())
        .await?;
    Ok(Json(item))
}

/// Delete an item
#[utoipa::path(
    delete,
    path = "/{id}",
    context_path = "/api/v1/items",
    tag = "items",
    params(("id" = Uuid, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Item deleted", body = MessageResponse),
        (status = 404, description = "Item not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_item(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>> {
    permission_service::require(auth.role, Resource::InventoryItems, PermissionAction::Delete)?;
    ItemService::new(state.db.clone()).delete(id).await?;
    Ok(Json(MessageResponse::new("Item deleted successfully")))
}

/// Transition an item to a new status
#[utoipa::path(
    patch,
    path = "/{id}/status",
    context_path = "/api/v1/items",
    tag = "items",
    params(("id" = Uuid, Path, description = "Item ID")),
    request_body = SetStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = Item),
        (status = 404, description = "Item not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn set_status(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetStatusRequest>,
) -> Result<Json<Item>> {
    permission_service::require(auth.role, Resource::InventoryItems, PermissionAction::Update)?;
    let item = ItemService::new(state.db.clone())
        .set_status(id, req.status, req.note, auth.user_id, Utc::now())
        .await?;
    Ok(Json(item))
}

/// Append a maintenance record
#[utoipa::path(
    post,
    path = "/{id}/maintenance",
    context_path = "/api/v1/items",
    tag = "items",
    params(("id" = Uuid, Path, description = "Item ID")),
    request_body = RecordMaintenanceRequest,
    responses(
        (status = 200, description = "Maintenance recorded", body = Item),
        (status = 400, description = "Missing required fields"),
        (status = 404, description = "Item not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn record_maintenance(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
    Path(id): Path<Uuid>,
    Json(req): Json<RecordMaintenanceRequest>,
) -> Result<Json<Item>> {
    permission_service::require(auth.role, Resource::InventoryItems, PermissionAction::Update)?;
    let item = ItemService::new(state.db.clone())
        .record_maintenance(id, req, Utc::now())
        .await?;
    Ok(Json(item))
}

/// Append a calibration record
#[utoipa::path(
    post,
    path = "/{id}/calibration",
    context_path = "/api/v1/items",
    tag = "items",
    params(("id" = Uuid, Path, description = "Item ID")),
    request_body = RecordCalibrationRequest,
    responses(
        (status = 200, description = "Calibration recorded", body = Item),
        (status = 400, description = "Missing required fields"),
        (status = 404, description = "Item not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn record_calibration(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
    Path(id): Path<Uuid>,
    Json(req): Json<RecordCalibrationRequest>,
) -> Result<Json<Item>> {
    permission_service::require(auth.role, Resource::InventoryItems, PermissionAction::Update)?;
    let item = ItemService::new(state.db.clone())
        .record_calibration(id, req, Utc::now())
        .await?;
    Ok(Json(item))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        list_items,
        create_item,
        list_maintenance_due,
        list_warranty_expiring,
        get_item,
        update_item,
        delete_item,
        set_status,
        record_maintenance,
        record_calibration
    ),
    components(schemas(
        Item,
        ItemStatus,
        ItemWithProduct,
        MaintenanceRecord,
        MaintenanceType,
        CalibrationRecord,
        StatusChange,
        Warranty,
        WarrantyClaim,
        PurchaseInfo,
        DestinationInfo,
        CreateItemRequest,
        UpdateItemRequest,
        SetStatusRequest,
        RecordMaintenanceRequest,
        RecordCalibrationRequest
    ))
)]
pub struct ItemsApiDoc;
