//! Business logic services.

pub mod auth_service;
pub mod item_service;
pub mod permission_service;
pub mod product_service;
pub mod report_service;
pub mod schedule;
pub mod user_service;
