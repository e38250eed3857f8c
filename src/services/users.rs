use std::sync::Arc;

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::user::{self, Entity as UserEntity, UserRole};
use crate::errors::{ServiceError, ServiceResult};
use crate::services::audit::AuditRecorder;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    pub role: UserRole,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: Option<String>,
    pub role: Option<UserRole>,
    pub active: Option<bool>,
}

/// Account management. Every mutation is gated by the role hierarchy:
/// `admin` manages `staff` accounts only, `super_admin` manages `admin`
/// and below; nobody manages peers or superiors.
#[derive(Clone)]
pub struct UsersService {
    db: Arc<DbPool>,
    audit: AuditRecorder,
}

impl UsersService {
    pub fn new(db: Arc<DbPool>, audit: AuditRecorder) -> Self {
        Self { db, audit }
    }

    #[instrument(skip(self, request), fields(email = %request.email, role = %request.role))]
    pub async fn create_user(
        &self,
        request: CreateUserRequest,
        acting_role: UserRole,
        acting_user: Option<Uuid>,
    ) -> ServiceResult<user::Model> {
        request.validate()?;
        if !acting_role.can_manage(request.role) {
            return Err(ServiceError::Forbidden(format!(
                "{acting_role} accounts cannot create {} accounts",
                request.role
            )));
        }

        let now = Utc::now();
        let created = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            email: Set(request.email.to_lowercase()),
            password_hash: Set(hash_password(&request.password)?),
            role: Set(request.role),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await
        .map_err(|e| match e.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(_)) => {
                ServiceError::Conflict("an account with this email already exists".to_string())
            }
            _ => ServiceError::DatabaseError(e),
        })?;

        info!(user_id = %created.id, "user account created");
        self.audit.created("users", created.id, &created, acting_user).await;
        Ok(created)
    }

    #[instrument(skip(self, request), fields(user_id = %user_id))]
    pub async fn update_user(
        &self,
        user_id: Uuid,
        request: UpdateUserRequest,
        acting_role: UserRole,
        acting_user: Option<Uuid>,
    ) -> ServiceResult<user::Model> {
        request.validate()?;

        let current = self.get_user(user_id).await?;
        let old = current.clone();

        if !acting_role.can_manage(current.role) {
            return Err(ServiceError::Forbidden(format!(
                "{acting_role} accounts cannot manage {} accounts",
                current.role
            )));
        }
        if let Some(new_role) = request.role {
            if !acting_role.can_manage(new_role) {
                return Err(ServiceError::Forbidden(format!(
                    "{acting_role} accounts cannot grant the {new_role} role"
                )));
            }
        }

        let mut active: user::ActiveModel = current.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(password) = request.password {
            active.password_hash = Set(hash_password(&password)?);
        }
        if let Some(role) = request.role {
            active.role = Set(role);
        }
        if let Some(enabled) = request.active {
            active.active = Set(enabled);
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&*self.db).await?;
        self.audit.updated("users", user_id, &old, &updated, acting_user).await;
        Ok(updated)
    }

    pub async fn get_user(&self, user_id: Uuid) -> ServiceResult<user::Model> {
        UserEntity::find_by_id(user_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("user", user_id))
    }

    #[instrument(skip(self))]
    pub async fn list_users(
        &self,
        page: u64,
        per_page: u64,
    ) -> ServiceResult<(Vec<user::Model>, u64)> {
        let paginator = UserEntity::find()
            .order_by_asc(user::Column::Name)
            .paginate(&*self.db, per_page);
        let total = paginator.num_items().await?;
        let users = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((users, total))
    }

    /// Verify credentials for login. Failures are deliberately uniform so
    /// callers cannot distinguish a wrong password from an unknown or
    /// disabled account.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn authenticate(&self, email: &str, password: &str) -> ServiceResult<user::Model> {
        let account = UserEntity::find()
            .filter(user::Column::Email.eq(email.to_lowercase()))
            .one(&*self.db)
            .await?;

        let Some(account) = account else {
            warn!("login attempt for unknown account");
            return Err(ServiceError::Unauthorized("invalid credentials".to_string()));
        };
        if !account.active {
            warn!(user_id = %account.id, "login attempt for disabled account");
            return Err(ServiceError::Unauthorized("invalid credentials".to_string()));
        }
        if !verify_password(&account.password_hash, password) {
            warn!(user_id = %account.id, "login attempt with wrong password");
            return Err(ServiceError::Unauthorized("invalid credentials".to_string()));
        }

        Ok(account)
    }
}

pub fn hash_password(password: &str) -> ServiceResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::InternalError(format!("password hashing failed: {e}")))
}

pub fn verify_password(stored_hash: &str, password: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_round_trip() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert!(verify_password(&hash, "correct horse battery staple"));
        assert!(!verify_password(&hash, "wrong password"));
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!verify_password("not-a-phc-string", "anything"));
    }
}
