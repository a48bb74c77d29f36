use axum::{
    extract::State,
    middleware::from_fn_with_state,
    routing::{get, post},
    Extension, Json, Router,
};

use crate::controllers::auth_controller::AuthController;
use crate::dto::api_response::ApiResponse;
use crate::dto::auth_dto::{AccessResponse, LoginRequest, LoginResponse};
use crate::middleware::auth::{auth_middleware, optional_auth_middleware, AuthenticatedUser};
use crate::middleware::rate_limit::rate_limit_middleware;
use crate::models::user::{CreateUserRequest, UserResponse};
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Configura las rutas de autenticación (con rate limiting)
pub fn create_auth_router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/register", post(register))
        .route_layer(from_fn_with_state(state.clone(), optional_auth_middleware))
        .route("/login", post(login));

    let protected = Router::new()
        .route("/me", get(me))
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    public
        .merge(protected)
        .layer(from_fn_with_state(state, rate_limit_middleware))
}

/// `GET /api/access`; se monta detrás del middleware de autenticación
pub fn create_access_router() -> Router<AppState> {
    Router::new().route("/", get(access))
}

async fn register(
    State(state): State<AppState>,
    caller: Option<Extension<AuthenticatedUser>>,
    Json(request): Json<CreateUserRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let controller = AuthController::new(state.repos.clone(), state.config.clone());
    let caller = caller.map(|Extension(user)| user);
    Ok(Json(controller.register(caller.as_ref(), request).await?))
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let controller = AuthController::new(state.repos.clone(), state.config.clone());
    Ok(Json(controller.login(request).await?))
}

async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<UserResponse>, AppError> {
    let controller = AuthController::new(state.repos.clone(), state.config.clone());
    Ok(Json(controller.me(&user).await?))
}

async fn access(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Json<AccessResponse> {
    let controller = AuthController::new(state.repos.clone(), state.config.clone());
    Json(controller.access(&user))
}
