use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::mechanic_controller::MechanicController;
use crate::dto::api_response::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::mechanic::{CreateMechanicRequest, Mechanic, UpdateMechanicRequest};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_mechanic_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_mechanic).get(list_mechanics))
        .route(
            "/:id",
            get(get_mechanic).put(update_mechanic).delete(delete_mechanic),
        )
}

async fn create_mechanic(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateMechanicRequest>,
) -> Result<Json<ApiResponse<Mechanic>>, AppError> {
    let controller = MechanicController::new(state.repos.clone());
    Ok(Json(controller.create(&user, request).await?))
}

async fn list_mechanics(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<Mechanic>>, AppError> {
    let controller = MechanicController::new(state.repos.clone());
    Ok(Json(controller.list(&user).await?))
}

async fn get_mechanic(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Mechanic>, AppError> {
    let controller = MechanicController::new(state.repos.clone());
    Ok(Json(controller.get(&user, id).await?))
}

async fn update_mechanic(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateMechanicRequest>,
) -> Result<Json<ApiResponse<Mechanic>>, AppError> {
    let controller = MechanicController::new(state.repos.clone());
    Ok(Json(controller.update(&user, id, request).await?))
}

async fn delete_mechanic(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = MechanicController::new(state.repos.clone());
    Ok(Json(controller.delete(&user, id).await?))
}
