use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::config::environment::EnvironmentConfig;
use crate::dto::api_response::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::user::{CreateUserRequest, Role, UpdateUserRequest, User, UserFilters, UserResponse};
use crate::repositories::Repositories;
use crate::services::access_policy::{authorize, Action, Feature};
use crate::services::password_service::hash_password;
use crate::utils::errors::{conflict_error, forbidden_error, not_found_error, AppError, AppResult};
use crate::utils::validation::{normalize_email, normalize_optional};

pub struct UserController {
    repos: Repositories,
    config: Arc<EnvironmentConfig>,
}

impl UserController {
    pub fn new(repos: Repositories, config: Arc<EnvironmentConfig>) -> Self {
        Self { repos, config }
    }

    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        request: CreateUserRequest,
    ) -> AppResult<ApiResponse<UserResponse>> {
        authorize(user.role, Feature::Users, Action::Write)?;
        request.validate()?;

        let email = normalize_email(&request.email);
        if self.repos.users.email_exists(&email, None).await? {
            return Err(conflict_error("User", "email", &email));
        }

        let role = request.role.unwrap_or(Role::User);
        let password_hash = hash_password(&request.password, self.config.bcrypt_cost)?;
        let created = self.repos.users.create(&User::new(request, password_hash, role)).await?;

        log::info!("👤 Usuario creado por admin: {} ({})", created.email, created.role);
        Ok(ApiResponse::success_with_message(created.into(), "User created successfully"))
    }

    pub async fn list(
        &self,
        user: &AuthenticatedUser,
        filters: UserFilters,
    ) -> AppResult<Vec<UserResponse>> {
        authorize(user.role, Feature::Users, Action::Read)?;
        let users = self.repos.users.list(&filters).await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    pub async fn get(&self, user: &AuthenticatedUser, id: Uuid) -> AppResult<UserResponse> {
        authorize(user.role, Feature::Users, Action::Read)?;
        Ok(self.find(id).await?.into())
    }

    /// Una contraseña nueva se vuelve a hashear; "" en teléfono o foto los borra
    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        request: UpdateUserRequest,
    ) -> AppResult<ApiResponse<UserResponse>> {
        authorize(user.role, Feature::Users, Action::Write)?;
        request.validate()?;

        let mut target = self.find(id).await?;

        if let Some(email) = request.email {
            let email = normalize_email(&email);
            if self.repos.users.email_exists(&email, Some(id)).await? {
                return Err(conflict_error("User", "email", &email));
            }
            target.email = email;
        }
        if let Some(full_name) = request.full_name {
            target.full_name = full_name.trim().to_string();
        }
        if let Some(password) = request.password {
            target.password_hash = hash_password(&password, self.config.bcrypt_cost)?;
        }
        if request.phone.is_some() {
            target.phone = normalize_optional(request.phone);
        }
        if request.profile_picture.is_some() {
            target.profile_picture = normalize_optional(request.profile_picture);
        }
        if let Some(role) = request.role {
            if id == user.user_id && role != Role::Admin {
                return Err(forbidden_error("change own role", "an admin cannot demote itself"));
            }
            target.role = role;
        }
        target.updated_at = Utc::now();

        let updated = self
            .repos
            .users
            .update(&target)
            .await?
            .ok_or_else(|| not_found_error("User", &id.to_string()))?;
        Ok(ApiResponse::success_with_message(updated.into(), "User updated successfully"))
    }

    /// Borra también su perfil de taller; no si tiene gastos registrados
    pub async fn delete(&self, user: &AuthenticatedUser, id: Uuid) -> AppResult<ApiResponse<()>> {
        authorize(user.role, Feature::Users, Action::Delete)?;
        if id == user.user_id {
            return Err(forbidden_error("delete user", "you cannot delete your own account"));
        }
        self.find(id).await?;

        let expenses = self.repos.expenses.count_by_creator(id).await?;
        if expenses > 0 {
            return Err(AppError::Conflict(format!(
                "User has recorded {} expense(s)",
                expenses
            )));
        }

        self.repos.garages.delete_by_user(id).await?;
        if !self.repos.users.delete(id).await? {
            return Err(not_found_error("User", &id.to_string()));
        }

        log::info!("🗑️ Usuario eliminado: {}", id);
        Ok(ApiResponse::message("User deleted successfully"))
    }

    async fn find(&self, id: Uuid) -> AppResult<User> {
        self.repos
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("User", &id.to_string()))
    }
}
