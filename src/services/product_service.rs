//! Catalog product service.

use serde::Deserialize;
use sqlx::types::Json;
use sqlx::PgPool;
use std::collections::BTreeMap;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::product::{
    Certification, EquipmentCategory, MaintenanceScheduleTemplate, Product, WarrantyTemplate,
};

/// Request to create a catalog product
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub model: String,
    pub manufacturer: String,
    pub category: EquipmentCategory,
    pub specifications: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub certifications: Vec<Certification>,
    #[serde(default)]
    pub maintenance_schedule: MaintenanceScheduleTemplate,
    pub warranty: Option<WarrantyTemplate>,
    pub price: Option<f64>,
}

/// Request to update a catalog product in place
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub model: Option<String>,
    pub manufacturer: Option<String>,
    pub category: Option<EquipmentCategory>,
    pub specifications: Option<BTreeMap<String, String>>,
    pub certifications: Option<Vec<Certification>>,
    pub maintenance_schedule: Option<MaintenanceScheduleTemplate>,
    pub warranty: Option<WarrantyTemplate>,
    pub price: Option<f64>,
}

/// Product service
pub struct ProductService {
    db: PgPool,
}

impl ProductService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Product> {
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("Product {} not found", id)))
    }

    pub async fn list(&self) -> Result<Vec<Product>> {
        sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY name")
            .fetch_all(&self.db)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn create(&self, req: CreateProductRequest) -> Result<Product> {
        let name = req.name.trim().to_string();
        let model = req.model.trim().to_string();
        let manufacturer = req.manufacturer.trim().to_string();
        if name.is_empty() || model.is_empty() || manufacturer.is_empty() {
            return Err(AppError::Validation(
                "name, model and manufacturer are required".to_string(),
            ));
        }

        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (
                name, description, model, manufacturer, category, specifications,
                certifications, maintenance_schedule, warranty, price
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(&name)
        .bind(&req.description)
        .bind(&model)
        .bind(&manufacturer)
        .bind(req.category)
        .bind(req.specifications.as_ref().map(Json))
        .bind(Json(&req.certifications))
        .bind(Json(&req.maintenance_schedule))
        .bind(req.warranty.as_ref().map(Json))
        .bind(req.price)
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn update(&self, id: Uuid, req: UpdateProductRequest) -> Result<Product> {
        let mut product = self.find_by_id(id).await?;

        if let Some(name) = req.name {
            product.name = name;
        }
        if let Some(description) = req.description {
            product.description = Some(description);
        }
        if let Some(model) = req.model {
            product.model = model;
        }
        if let Some(manufacturer) = req.manufacturer {
            product.manufacturer = manufacturer;
        }
        if let Some(category) = req.category {
            product.category = category;
        }
        if let Some(specifications) = req.specifications {
            product.specifications = Some(specifications);
        }
        if let Some(certifications) = req.certifications {
            product.certifications = certifications;
        }
        if let Some(maintenance_schedule) = req.maintenance_schedule {
            product.maintenance_schedule = maintenance_schedule;
        }
        if let Some(warranty) = req.warranty {
            product.warranty = Some(warranty);
        }
        if let Some(price) = req.price {
            product.price = Some(price);
        }

        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                name = $2,
                description = $3,
                model = $4,
                manufacturer = $5,
                category = $6,
                specifications = $7,
                certifications = $8,
                maintenance_schedule = $9,
                warranty = $10,
                price = $11,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.model)
        .bind(&product.manufacturer)
        .bind(product.category)
        .bind(product.specifications.as_ref().map(Json))
        .bind(Json(&product.certifications))
        .bind(Json(&product.maintenance_schedule))
        .bind(product.warranty.as_ref().map(Json))
        .bind(product.price)
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_foreign_key_violation() => AppError::Conflict(
                    "Product is referenced by inventory items and cannot be deleted".to_string(),
                ),
                _ => AppError::Database(e.to_string()),
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Product {} not found", id)));
        }
        Ok(())
    }
}
