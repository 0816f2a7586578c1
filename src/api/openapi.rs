//! OpenAPI specification generated from handler annotations via utoipa.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Top-level OpenAPI document for the MedTrack API.
///
/// Each handler module contributes its own paths and schemas via per-module
/// `#[derive(OpenApi)]` structs that are merged into this root document at
/// startup.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "MedTrack API",
        description = "Medical equipment inventory tracking: catalog, items, lifecycle and reporting.",
        version = "1.0.0",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "/", description = "Current server"),
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Authentication and session management"),
        (name = "users", description = "User management (admin)"),
        (name = "products", description = "Equipment catalog"),
        (name = "items", description = "Physical inventory items and lifecycle"),
        (name = "reports", description = "Aggregate reports and dashboards"),
        (name = "health", description = "Health and readiness checks"),
    ),
    components(schemas(ErrorResponse))
)]
pub struct ApiDoc;

/// Standard error response body returned by all endpoints on failure.
#[derive(serde::Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g. "NOT_FOUND", "VALIDATION_ERROR")
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

/// Adds Bearer JWT security scheme to the OpenAPI spec.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Build the merged OpenAPI document from all handler modules.
pub fn build_openapi() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();

    doc.merge(super::handlers::auth::AuthApiDoc::openapi());
    doc.merge(super::handlers::users::UsersApiDoc::openapi());
    doc.merge(super::handlers::products::ProductsApiDoc::openapi());
    doc.merge(super::handlers::items::ItemsApiDoc::openapi());
    doc.merge(super::handlers::reports::ReportsApiDoc::openapi());
    doc.merge(super::handlers::health::HealthApiDoc::openapi());

    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_is_valid() {
        let spec = build_openapi();

        assert_eq!(spec.info.title, "MedTrack API");

        // Catches missing module merges
        let path_count = spec.paths.paths.len();
        assert!(
            path_count >= 15,
            "Expected at least 15 paths, got {path_count}. A module merge may be missing."
        );

        let has_bearer = spec
            .components
            .as_ref()
            .is_some_and(|c| c.security_schemes.contains_key("bearer_auth"));
        assert!(has_bearer, "Bearer auth security scheme is missing.");

        let json = serde_json::to_string(&spec).expect("Spec should serialize to JSON");
        assert!(json.len() > 10_000, "Spec JSON seems too small");
    }

    #[test]
    fn test_item_lifecycle_paths_documented() {
        let spec = build_openapi();
        let paths: Vec<&str> = spec.paths.paths.keys().map(|k| k.as_str()).collect();

        for expected in [
            "/api/v1/items/{id}/status",
            "/api/v1/items/{id}/maintenance",
            "/api/v1/items/{id}/calibration",
            "/api/v1/items/maintenance-due",
            "/api/v1/items/warranty-expiring",
            "/api/v1/reports/inventory",
            "/api/v1/reports/maintenance-schedule",
        ] {
            assert!(
                paths.contains(&expected),
                "Missing documented path: {expected}"
            );
        }
    }
}
