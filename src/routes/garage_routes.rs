use axum::{extract::State, routing::get, Extension, Json, Router};

use crate::controllers::garage_controller::GarageController;
use crate::dto::api_response::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::garage::{CreateGarageRequest, GarageProfile, UpdateGarageRequest};
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Un único recurso: el perfil del usuario autenticado
pub fn create_garage_router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(get_garage)
            .post(create_garage)
            .put(update_garage)
            .delete(delete_garage),
    )
}

async fn get_garage(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<GarageProfile>, AppError> {
    let controller = GarageController::new(state.repos.clone());
    Ok(Json(controller.get(&user).await?))
}

async fn create_garage(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateGarageRequest>,
) -> Result<Json<ApiResponse<GarageProfile>>, AppError> {
    let controller = GarageController::new(state.repos.clone());
    Ok(Json(controller.create(&user, request).await?))
}

async fn update_garage(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<UpdateGarageRequest>,
) -> Result<Json<ApiResponse<GarageProfile>>, AppError> {
    let controller = GarageController::new(state.repos.clone());
    Ok(Json(controller.update(&user, request).await?))
}

async fn delete_garage(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = GarageController::new(state.repos.clone());
    Ok(Json(controller.delete(&user).await?))
}
