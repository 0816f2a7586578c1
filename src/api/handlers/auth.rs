//! Authentication handlers.

use axum::{
    extract::{Extension, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

use crate::api::dto::MessageResponse;
use crate::api::middleware::auth::AuthExtension;
use crate::api::SharedState;
use crate::error::Result;
use crate::models::user::User;
use crate::services::auth_service::AuthService;
use crate::services::user_service::{CreateUserRequest, UpdateProfileRequest, UserService};

/// Public auth routes (no token required)
pub fn public_router() -> Router<SharedState> {
    Router::new().route("/login", post(login))
}

/// Auth routes requiring a valid session token
pub fn protected_router() -> Router<SharedState> {
    Router::new()
        .route("/logout", post(logout))
        .route("/logout-all", post(logout_all))
        .route("/me", get(me).patch(update_me))
}

/// Auth routes requiring admin privileges
pub fn admin_router() -> Router<SharedState> {
    Router::new().route("/register", post(register))
}

fn auth_service(state: &SharedState) -> AuthService {
    AuthService::new(state.db.clone(), Arc::new(state.config.clone()))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub user: User,
    pub token: String,
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/login",
    context_path = "/api/v1/auth",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
    )
)]
pub async fn login(
    State(state): State<SharedState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let (user, token) = auth_service(&state).login(&req.email, &req.password).await?;
    Ok(Json(LoginResponse { user, token }))
}

/// Register a new user (admin only). Issues a session token for the
/// freshly created account.
#[utoipa::path(
    post,
    path = "/register",
    context_path = "/api/v1/auth",
    tag = "auth",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = LoginResponse),
        (status = 409, description = "Username or email already in use"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn register(
    State(state): State<SharedState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(axum::http::StatusCode, Json<LoginResponse>)> {
    let user = UserService::new(state.db.clone()).create(req).await?;
    let token = auth_service(&state).issue_token(&user).await?;
    Ok((
        axum::http::StatusCode::CREATED,
        Json(LoginResponse { user, token }),
    ))
}

/// Log out the current session
#[utoipa::path(
    post,
    path = "/logout",
    context_path = "/api/v1/auth",
    tag = "auth",
    responses((status = 200, description = "Logged out", body = MessageResponse)),
    security(("bearer_auth" = []))
)]
pub async fn logout(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
) -> Result<Json<MessageResponse>> {
    auth_service(&state).logout(&auth.token).await?;
    Ok(Json(MessageResponse::new("Logged out successfully")))
}

/// Log out every session for the current user
#[utoipa::path(
    post,
    path = "/logout-all",
    context_path = "/api/v1/auth",
    tag = "auth",
    responses((status = 200, description = "All sessions cleared", body = MessageResponse)),
    security(("bearer_auth" = []))
)]
pub async fn logout_all(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
) -> Result<Json<MessageResponse>> {
    auth_service(&state).logout_all(auth.user_id).await?;
    Ok(Json(MessageResponse::new("Logged out from all sessions")))
}

/// Current user profile
#[utoipa::path(
    get,
    path = "/me",
    context_path = "/api/v1/auth",
    tag = "auth",
    responses((status = 200, description = "Current user", body = User)),
    security(("bearer_auth" = []))
)]
pub async fn me(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
) -> Result<Json<User>> {
    let user = UserService::new(state.db.clone())
        .find_by_id(auth.user_id)
        .await?;
    Ok(Json(user))
}

/// Update the current user's profile (limited fields)
#[utoipa::path(
    patch,
    path = "/me",
    context_path = "/api/v1/auth",
    tag = "auth",
    request_body = UpdateProfileRequest,
    responses((status = 200, description = "Profile updated", body = User)),
    security(("bearer_auth" = []))
)]
pub async fn update_me(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<User>> {
    let user = UserService::new(state.db.clone())
        .update_profile(auth.user_id, req)
        .await?;
    Ok(Json(user))
}

#[derive(OpenApi)]
#[openapi(
    paths(login, register, logout, logout_all, me, update_me),
    components(schemas(
        LoginRequest,
        LoginResponse,
        CreateUserRequest,
        UpdateProfileRequest,
        MessageResponse,
    ))
)]
pub struct AuthApiDoc;
