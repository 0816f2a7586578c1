//! Shared Data Transfer Objects (DTOs) for API handlers.

use serde::Serialize;
use utoipa::ToSchema;

/// Generic message response for endpoints with no payload
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
