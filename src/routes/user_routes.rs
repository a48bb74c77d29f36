use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::user_controller::UserController;
use crate::dto::api_response::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::user::{CreateUserRequest, UpdateUserRequest, UserFilters, UserResponse};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_user_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_user).get(list_users))
        .route(
            "/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

async fn create_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateUserRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let controller = UserController::new(state.repos.clone(), state.config.clone());
    Ok(Json(controller.create(&user, request).await?))
}

async fn list_users(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(filters): Query<UserFilters>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let controller = UserController::new(state.repos.clone(), state.config.clone());
    Ok(Json(controller.list(&user, filters).await?))
}

async fn get_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, AppError> {
    let controller = UserController::new(state.repos.clone(), state.config.clone());
    Ok(Json(controller.get(&user, id).await?))
}

async fn update_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let controller = UserController::new(state.repos.clone(), state.config.clone());
    Ok(Json(controller.update(&user, id, request).await?))
}

async fn delete_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = UserController::new(state.repos.clone(), state.config.clone());
    Ok(Json(controller.delete(&user, id).await?))
}
