//! Database models.

pub mod item;
pub mod product;
pub mod role;
pub mod user;
