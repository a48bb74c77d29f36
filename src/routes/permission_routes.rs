use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::permission_controller::PermissionController;
use crate::dto::api_response::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::permission::{
    CreatePermissionRequest, LinkPermissionRequest, Permission, RolePermissionsResponse,
    UpdatePermissionRequest,
};
use crate::models::user::Role;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_permission_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_permission).get(list_permissions))
        .route(
            "/:id",
            get(get_permission).put(update_permission).delete(delete_permission),
        )
        .route("/roles/:role", get(role_permissions).post(link_permission))
        .route("/roles/:role/:permission_id", delete(unlink_permission))
}

async fn create_permission(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreatePermissionRequest>,
) -> Result<Json<ApiResponse<Permission>>, AppError> {
    let controller = PermissionController::new(state.repos.clone());
    Ok(Json(controller.create(&user, request).await?))
}

async fn list_permissions(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<Permission>>, AppError> {
    let controller = PermissionController::new(state.repos.clone());
    Ok(Json(controller.list(&user).await?))
}

async fn get_permission(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Permission>, AppError> {
    let controller = PermissionController::new(state.repos.clone());
    Ok(Json(controller.get(&user, id).await?))
}

async fn update_permission(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdatePermissionRequest>,
) -> Result<Json<ApiResponse<Permission>>, AppError> {
    let controller = PermissionController::new(state.repos.clone());
    Ok(Json(controller.update(&user, id, request).await?))
}

async fn delete_permission(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = PermissionController::new(state.repos.clone());
    Ok(Json(controller.delete(&user, id).await?))
}

async fn role_permissions(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(role): Path<Role>,
) -> Result<Json<RolePermissionsResponse>, AppError> {
    let controller = PermissionController::new(state.repos.clone());
    Ok(Json(controller.role_permissions(&user, role).await?))
}

async fn link_permission(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(role): Path<Role>,
    Json(request): Json<LinkPermissionRequest>,
) -> Result<Json<ApiResponse<RolePermissionsResponse>>, AppError> {
    let controller = PermissionController::new(state.repos.clone());
    Ok(Json(controller.link(&user, role, request).await?))
}

async fn unlink_permission(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((role, permission_id)): Path<(Role, Uuid)>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = PermissionController::new(state.repos.clone());
    Ok(Json(controller.unlink(&user, role, permission_id).await?))
}
