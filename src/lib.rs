//! MedTrack - Backend Library
//!
//! Medical equipment inventory tracking backend: equipment catalog,
//! physical item lifecycle (status, maintenance, calibration, warranty)
//! and aggregate reporting.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
