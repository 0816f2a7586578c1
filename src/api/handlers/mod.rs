//! HTTP request handlers.

pub mod auth;
pub mod health;
pub mod items;
pub mod products;
pub mod reports;
pub mod users;
