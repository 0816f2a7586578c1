//! Route definitions for the API.

use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers;
use super::middleware::auth::{admin_middleware, auth_middleware};
use super::SharedState;
use crate::services::auth_service::AuthService;

/// Create the main API router
pub fn create_router(state: SharedState) -> Router {
    // Build OpenAPI spec once at startup
    let openapi = super::openapi::build_openapi();

    Router::new()
        // Health endpoints (no auth required)
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        // OpenAPI spec (served by SwaggerUi at /api/v1/openapi.json) and Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api/v1/openapi.json", openapi))
        // API v1 routes
        .nest("/api/v1", api_v1_routes(state.clone()))
        .with_state(state)
}

/// API v1 routes
fn api_v1_routes(state: SharedState) -> Router<SharedState> {
    // Create an AuthService for middleware use
    let auth_service = Arc::new(AuthService::new(
        state.db.clone(),
        Arc::new(state.config.clone()),
    ));

    Router::new()
        // Auth routes - split into public, protected and admin scopes
        .nest("/auth", handlers::auth::public_router())
        .nest(
            "/auth",
            handlers::auth::protected_router().layer(middleware::from_fn_with_state(
                auth_service.clone(),
                auth_middleware,
            )),
        )
        .nest(
            "/auth",
            handlers::auth::admin_router().layer(middleware::from_fn_with_state(
                auth_service.clone(),
                admin_middleware,
            )),
        )
        // User management requires admin privileges
        .nest(
            "/users",
            handlers::users::router().layer(middleware::from_fn_with_state(
                auth_service.clone(),
                admin_middleware,
            )),
        )
        // Catalog products; per-role access checked in the handlers
        .nest(
            "/products",
            handlers::products::router().layer(middleware::from_fn_with_state(
                auth_service.clone(),
                auth_middleware,
            )),
        )
        // Inventory items and lifecycle operations
        .nest(
            "/items",
            handlers::items::router().layer(middleware::from_fn_with_state(
                auth_service.clone(),
                auth_middleware,
            )),
        )
        // Reporting endpoints
        .nest(
            "/reports",
            handlers::reports::router().layer(middleware::from_fn_with_state(
                auth_service,
                auth_middleware,
            )),
        )
}
