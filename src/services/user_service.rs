//! User account service.
//!
//! Accounts are created by administrators only; users may update a limited
//! set of their own fields, administrators may update everything. Password
//! hashes never leave this module unhashed.

use bcrypt::{hash, DEFAULT_COST};
use serde::Deserialize;
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::user::{User, UserRole};

/// Request to create a user (admin only)
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Option<UserRole>,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub organization: Option<String>,
}

/// Admin update - any field may change
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<UserRole>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub organization: Option<String>,
    pub is_active: Option<bool>,
}

/// Self-service profile update - limited fields only
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone_number: Option<String>,
    pub organization: Option<String>,
}

/// Hash a password after length validation.
pub fn hash_password(password: &str) -> Result<String> {
    if password.len() < 8 {
        return Err(AppError::Validation(
            "password must be at least 8 characters".to_string(),
        ));
    }
    hash(password, DEFAULT_COST).map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

fn validate_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    let valid = email.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
    });
    if !valid {
        return Err(AppError::Validation("invalid email address".to_string()));
    }
    Ok(email)
}

fn map_unique_violation(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict("username or email already in use".to_string())
        }
        _ => AppError::Database(e.to_string()),
    }
}

/// User service
pub struct UserService {
    db: PgPool,
}

impl UserService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY username")
            .fetch_all(&self.db)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn create(&self, req: CreateUserRequest) -> Result<User> {
        let username = req.username.trim().to_string();
        if username.len() < 3 {
            return Err(AppError::Validation(
                "username must be at least 3 characters".to_string(),
            ));
        }
        let email = validate_email(&req.email)?;
        let password_hash = hash_password(&req.password)?;

        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (
                username, email, password_hash, role, first_name, last_name,
                phone_number, organization
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&username)
        .bind(&email)
        .bind(&password_hash)
        .bind(req.role.unwrap_or(UserRole::Customer))
        .bind(req.first_name.trim())
        .bind(req.last_name.trim())
        .bind(&req.phone_number)
        .bind(&req.organization)
        .fetch_one(&self.db)
        .await
        .map_err(map_unique_violation)
    }

    pub async fn update(&self, id: Uuid, req: UpdateUserRequest) -> Result<User> {
        let mut user = self.find_by_id(id).await?;

        if let Some(email) = req.email {
            user.email = validate_email(&email)?;
        }
        if let Some(password) = req.password {
            user.password_hash = hash_password(&password)?;
        }
        if let Some(role) = req.role {
            user.role = role;
        }
        if let Some(first_name) = req.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = req.last_name {
            user.last_name = last_name;
        }
        if let Some(phone_number) = req.phone_number {
            user.phone_number = Some(phone_number);
        }
        if let Some(organization) = req.organization {
            user.organization = Some(organization);
        }
        if let Some(is_active) = req.is_active {
            user.is_active = is_active;
        }

        self.persist(&user).await
    }

    pub async fn update_profile(&self, id: Uuid, req: UpdateProfileRequest) -> Result<User> {
        self.update(
            id,
            UpdateUserRequest {
                email: req.email,
                password: req.password,
                role: None,
                first_name: req.first_name,
                last_name: req.last_name,
                phone_number: req.phone_number,
                organization: req.organization,
                is_active: None,
            },
        )
        .await
    }

    /// Delete a user. Session rows go with it via cascade.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User {} not found", id)));
        }
        Ok(())
    }

    async fn persist(&self, user: &User) -> Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                email = $2,
                password_hash = $3,
                role = $4,
                first_name = $5,
                last_name = $6,
                phone_number = $7,
                organization = $8,
                is_active = $9,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.phone_number)
        .bind(&user.organization)
        .bind(user.is_active)
        .fetch_one(&self.db)
        .await
        .map_err(map_unique_violation)
    }
}
