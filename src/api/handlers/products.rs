//! Catalog product handlers.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use utoipa::OpenApi;
use uuid::Uuid;

use crate::api::dto::MessageResponse;
use crate::api::middleware::auth::AuthExtension;
use crate::api::SharedState;
use crate::error::Result;
use crate::models::product::{
    Certification, CertificationType, EquipmentCategory, MaintenanceScheduleTemplate, Product,
    ProductSummary, WarrantyTemplate,
};
use crate::models::role::{PermissionAction, Resource};
use crate::services::permission_service;
use crate::services::product_service::{CreateProductRequest, ProductService, UpdateProductRequest};

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

/// List catalog products
#[utoipa::path(
    get,
    path = "",
    context_path = "/api/v1/products",
    tag = "products",
    responses((status = 200, description = "All products", body = [Product])),
    security(("bearer_auth" = []))
)]
pub async fn list_products(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
) -> Result<Json<Vec<Product>>> {
    permission_service::require(auth.role, Resource::Products, PermissionAction::List)?;
    let products = ProductService::new(state.db.clone()).list().await?;
    Ok(Json(products))
}

/// Create a catalog product
#[utoipa::path(
    post,
    path = "",
    context_path = "/api/v1/products",
    tag = "products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Missing required fields"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_product(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>)> {
    permission_service::require(auth.role, Resource::Products, PermissionAction::Create)?;
    let product = ProductService::new(state.db.clone()).create(req).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Get a product by id
#[utoipa::path(
    get,
    path = "/{id}",
    context_path = "/api/v1/products",
    tag = "products",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_product(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>> {
    permission_service::require(auth.role, Resource::Products, PermissionAction::Read)?;
    let product = ProductService::new(state.db.clone()).find_by_id(id).await?;
    Ok(Json(product))
}

/// Update a product
#[utoipa::path(
    put,
    path = "/{id}",
    context_path = "/api/v1/products",
    tag = "products",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_product(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<Product>> {
    permission_service::require(auth.role, Resource::Products, PermissionAction::Update)?;
    let product = ProductService::new(state.db.clone()).update(id, req).await?;
    Ok(Json(product))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/{id}",
    context_path = "/api/v1/products",
    tag = "products",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product deleted", body = MessageResponse),
        (status = 404, description = "Product not found"),
        (status = 409, description = "Product still referenced by items"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_product(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>> {
    permission_service::require(auth.role, Resource::Products, PermissionAction::Delete)?;
    ProductService::new(state.db.clone()).delete(id).await?;
    Ok(Json(MessageResponse::new("Product deleted successfully")))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        create_product,
        get_product,
        update_product,
        delete_product
    ),
    components(schemas(
        Product,
        ProductSummary,
        EquipmentCategory,
        Certification,
        CertificationType,
        MaintenanceScheduleTemplate,
        WarrantyTemplate,
        CreateProductRequest,
        UpdateProductRequest
    ))
)]
pub struct ProductsApiDoc;
