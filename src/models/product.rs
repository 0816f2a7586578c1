//! Catalog product model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;
use utoipa::ToSchema;
use uuid::Uuid;

/// Equipment category enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "equipment_category")]
pub enum EquipmentCategory {
    #[sqlx(rename = "Diagnostic System")]
    #[serde(rename = "Diagnostic System")]
    DiagnosticSystem,
    #[sqlx(rename = "Patient Monitoring")]
    #[serde(rename = "Patient Monitoring")]
    PatientMonitoring,
    #[sqlx(rename = "Laboratory Equipment")]
    #[serde(rename = "Laboratory Equipment")]
    LaboratoryEquipment,
    #[sqlx(rename = "Imaging Equipment")]
    #[serde(rename = "Imaging Equipment")]
    ImagingEquipment,
    #[sqlx(rename = "Surgical Equipment")]
    #[serde(rename = "Surgical Equipment")]
    SurgicalEquipment,
    #[sqlx(rename = "Medical Supplies")]
    #[serde(rename = "Medical Supplies")]
    MedicalSupplies,
}

impl EquipmentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentCategory::DiagnosticSystem => "Diagnostic System",
            EquipmentCategory::PatientMonitoring => "Patient Monitoring",
            EquipmentCategory::LaboratoryEquipment => "Laboratory Equipment",
            EquipmentCategory::ImagingEquipment => "Imaging Equipment",
            EquipmentCategory::SurgicalEquipment => "Surgical Equipment",
            EquipmentCategory::MedicalSupplies => "Medical Supplies",
        }
    }
}

/// Certification type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum CertificationType {
    #[serde(rename = "CE")]
    Ce,
    #[serde(rename = "FDA")]
    Fda,
    #[serde(rename = "ISO")]
    Iso,
    Other,
}

/// A regulatory certification held by a product
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Certification {
    #[serde(rename = "type")]
    pub cert_type: CertificationType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<DateTime<Utc>>,
}

fn default_frequency_days() -> i32 {
    90
}

fn default_calibration_frequency_days() -> i32 {
    180
}

/// Maintenance schedule template applied to new items of a product
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceScheduleTemplate {
    #[serde(default = "default_frequency_days")]
    pub frequency_days: i32,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub calibration_needed: bool,
    #[serde(default = "default_calibration_frequency_days")]
    pub calibration_frequency_days: i32,
}

impl Default for MaintenanceScheduleTemplate {
    fn default() -> Self {
        Self {
            frequency_days: default_frequency_days(),
            requirements: Vec::new(),
            calibration_needed: false,
            calibration_frequency_days: default_calibration_frequency_days(),
        }
    }
}

/// Warranty template for a product line
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WarrantyTemplate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_months: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
}

/// Product entity
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub model: String,
    pub manufacturer: String,
    pub category: EquipmentCategory,
    #[sqlx(json(nullable))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specifications: Option<BTreeMap<String, String>>,
    #[sqlx(json)]
    pub certifications: Vec<Certification>,
    #[sqlx(json)]
    pub maintenance_schedule: MaintenanceScheduleTemplate,
    #[sqlx(json(nullable))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warranty: Option<WarrantyTemplate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Compact product view joined onto item responses
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: Uuid,
    pub name: String,
    pub model: String,
    pub manufacturer: String,
}
