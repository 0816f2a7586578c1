//! Authentication middleware.
//!
//! Extracts the bearer token, validates it against the session list and
//! attaches the authenticated principal to the request. Authorization
//! decisions beyond "is admin" live in `services::permission_service` and
//! are made per handler against the attached role.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::models::user::{User, UserRole};
use crate::services::auth_service::AuthService;

/// Extension that holds authenticated user information
#[derive(Debug, Clone)]
pub struct AuthExtension {
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
    /// The presented bearer token, kept so logout can revoke it
    pub token: String,
}

impl AuthExtension {
    fn new(user: &User, token: &str) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            role: user.role,
            token: token.to_string(),
        }
    }
}

/// Extract the bearer token from the Authorization header
fn extract_bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

/// Authentication middleware - requires a valid session token
pub async fn auth_middleware(
    State(auth_service): State<Arc<AuthService>>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match extract_bearer_token(&request) {
        Some(token) => token.to_string(),
        None => {
            return (StatusCode::UNAUTHORIZED, "Missing authorization header").into_response()
        }
    };

    match auth_service.authenticate(&token).await {
        Ok(user) => {
            request
                .extensions_mut()
                .insert(AuthExtension::new(&user, &token));
            next.run(request).await
        }
        Err(_) => (StatusCode::UNAUTHORIZED, "Invalid or expired token").into_response(),
    }
}

/// Admin middleware - requires a valid session token for an admin account
pub async fn admin_middleware(
    State(auth_service): State<Arc<AuthService>>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match extract_bearer_token(&request) {
        Some(token) => token.to_string(),
        None => {
            return (StatusCode::UNAUTHORIZED, "Missing authorization header").into_response()
        }
    };

    match auth_service.authenticate(&token).await {
        Ok(user) if user.role == UserRole::Admin => {
            request
                .extensions_mut()
                .insert(AuthExtension::new(&user, &token));
            next.run(request).await
        }
        Ok(_) => (StatusCode::FORBIDDEN, "Admin privileges required").into_response(),
        Err(_) => (StatusCode::UNAUTHORIZED, "Invalid or expired token").into_response(),
    }
}
