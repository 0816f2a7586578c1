//! Reporting and dashboard handlers.

use axum::{
    extract::{Extension, Query, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::{IntoParams, OpenApi};

use crate::api::middleware::auth::AuthExtension;
use crate::api::SharedState;
use crate::error::Result;
use crate::models::role::{PermissionAction, Resource};
use crate::services::item_service::{ItemService, ScheduleEntry};
use crate::services::permission_service;
use crate::services::report_service::{
    Activity, ActivityType, CalibrationStats, CategorySlice, InventoryReport, ProductCount,
    ReportAlerts, ReportService, StatusCount,
};

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/inventory", get(inventory_report))
        .route("/activities", get(recent_activities))
        .route("/maintenance-schedule", get(maintenance_schedule))
}

const DEFAULT_ACTIVITY_LIMIT: usize = 10;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ActivityQuery {
    /// Maximum number of activities to return
    pub limit: Option<usize>,
}

/// Aggregate inventory report
#[utoipa::path(
    get,
    path = "/inventory",
    context_path = "/api/v1/reports",
    tag = "reports",
    responses((status = 200, description = "Inventory report", body = InventoryReport)),
    security(("bearer_auth" = []))
)]
pub async fn inventory_report(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
) -> Result<Json<InventoryReport>> {
    permission_service::require(auth.role, Resource::InventoryItems, PermissionAction::Read)?;
    let report = ReportService::new(state.db.clone())
        .inventory_report(Utc::now())
        .await?;
    Ok(Json(report))
}

/// Most recent inventory activities
#[utoipa::path(
    get,
    path = "/activities",
    context_path = "/api/v1/reports",
    tag = "reports",
    params(ActivityQuery),
    responses((status = 200, description = "Recent activities", body = [Activity])),
    security(("bearer_auth" = []))
)]
pub async fn recent_activities(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<Vec<Activity>>> {
    permission_service::require(auth.role, Resource::InventoryItems, PermissionAction::Read)?;
    let limit = query.limit.unwrap_or(DEFAULT_ACTIVITY_LIMIT);
    let activities = ReportService::new(state.db.clone())
        .recent_activities(limit)
        .await?;
    Ok(Json(activities))
}

/// Upcoming maintenance within the alert window
#[utoipa::path(
    get,
    path = "/maintenance-schedule",
    context_path = "/api/v1/reports",
    tag = "reports",
    responses((status = 200, description = "Maintenance schedule", body = [ScheduleEntry])),
    security(("bearer_auth" = []))
)]
pub async fn maintenance_schedule(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
) -> Result<Json<Vec<ScheduleEntry>>> {
    permission_service::require(auth.role, Resource::InventoryItems, PermissionAction::Read)?;
    let entries = ItemService::new(state.db.clone())
        .maintenance_schedule(Utc::now())
        .await?;
    Ok(Json(entries))
}

#[derive(OpenApi)]
#[openapi(
    paths(inventory_report, recent_activities, maintenance_schedule),
    components(schemas(
        InventoryReport,
        StatusCount,
        ProductCount,
        ReportAlerts,
        CalibrationStats,
        CategorySlice,
        Activity,
        ActivityType,
        ScheduleEntry
    ))
)]
pub struct ReportsApiDoc;
