use std::sync::Arc;

use validator::Validate;

use crate::config::environment::EnvironmentConfig;
use crate::dto::api_response::ApiResponse;
use crate::dto::auth_dto::{AccessResponse, LoginRequest, LoginResponse};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::user::{CreateUserRequest, Role, User, UserResponse};
use crate::repositories::Repositories;
use crate::services::access_policy::allowed_features;
use crate::services::password_service::{hash_password, verify_against_dummy, verify_password};
use crate::utils::errors::{conflict_error, forbidden_error, AppError, AppResult};
use crate::utils::jwt::{generate_token, JwtConfig};
use crate::utils::validation::normalize_email;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub struct AuthController {
    repos: Repositories,
    config: Arc<EnvironmentConfig>,
}

impl AuthController {
    pub fn new(repos: Repositories, config: Arc<EnvironmentConfig>) -> Self {
        Self { repos, config }
    }

    /// Registro: la primera cuenta es admin; después solo un admin elige rol
    pub async fn register(
        &self,
        caller: Option<&AuthenticatedUser>,
        request: CreateUserRequest,
    ) -> AppResult<ApiResponse<UserResponse>> {
        request.validate()?;

        let email = normalize_email(&request.email);
        if self.repos.users.email_exists(&email, None).await? {
            return Err(conflict_error("User", "email", &email));
        }

        let requested_role = request.role;
        let password_hash = hash_password(&request.password, self.config.bcrypt_cost)?;
        let mut user = User::new(request, password_hash, Role::Admin);

        if self.repos.users.count().await? == 0 {
            if let Some(admin) = self.repos.users.create_if_empty(&user).await? {
                log::info!("👑 Primera cuenta registrada, se asigna rol admin");
                return Ok(registered(admin));
            }
        }

        user.role = match (caller.map(|c| c.role), requested_role) {
            (Some(Role::Admin), requested) => requested.unwrap_or(Role::User),
            (_, None) | (_, Some(Role::User)) => Role::User,
            (_, Some(requested)) => {
                return Err(forbidden_error(
                    &format!("register with role '{}'", requested),
                    "only an admin can assign roles",
                ))
            }
        };
        let user = self.repos.users.create(&user).await?;

        log::info!("✅ Usuario registrado: {} ({})", user.email, user.role);
        Ok(registered(user))
    }

    /// Mismo error para email desconocido y contraseña incorrecta
    pub async fn login(&self, request: LoginRequest) -> AppResult<LoginResponse> {
        request.validate()?;

        let Some(user) = self
            .repos
            .users
            .find_by_email(&normalize_email(&request.email))
            .await?
        else {
            verify_against_dummy(&request.password, self.config.bcrypt_cost);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        if !verify_password(&request.password, &user.password_hash)? {
            log::warn!("🔐 Contraseña incorrecta para {}", user.email);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let jwt_config = JwtConfig::from(self.config.as_ref());
        let token = generate_token(user.id, user.role, &jwt_config)?;

        log::info!("🔑 Login correcto: {}", user.email);
        Ok(LoginResponse::bearer(token, jwt_config.expiration, user.into()))
    }

    pub async fn me(&self, user: &AuthenticatedUser) -> AppResult<UserResponse> {
        self.repos
            .users
            .find_by_id(user.user_id)
            .await?
            .map(UserResponse::from)
            .ok_or_else(|| AppError::Unauthorized("User no longer exists".to_string()))
    }

    pub fn access(&self, user: &AuthenticatedUser) -> AccessResponse {
        AccessResponse {
            role: user.role,
            features: allowed_features(user.role),
        }
    }
}

fn registered(user: User) -> ApiResponse<UserResponse> {
    ApiResponse::success_with_message(UserResponse::from(user), "User registered successfully")
}
