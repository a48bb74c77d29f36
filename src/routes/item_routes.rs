use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::item_controller::ItemController;
use crate::dto::api_response::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::item::{CreateItemRequest, Item, UpdateItemRequest};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_item_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_item).get(list_items))
        .route(
            "/:id",
            get(get_item).put(update_item).delete(delete_item),
        )
}

async fn create_item(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateItemRequest>,
) -> Result<Json<ApiResponse<Item>>, AppError> {
    let controller = ItemController::new(state.repos.clone());
    Ok(Json(controller.create(&user, request).await?))
}

async fn list_items(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<Item>>, AppError> {
    let controller = ItemController::new(state.repos.clone());
    Ok(Json(controller.list(&user).await?))
}

async fn get_item(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Item>, AppError> {
    let controller = ItemController::new(state.repos.clone());
    Ok(Json(controller.get(&user, id).await?))
}

async fn update_item(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateItemRequest>,
) -> Result<Json<ApiResponse<Item>>, AppError> {
    let controller = ItemController::new(state.repos.clone());
    Ok(Json(controller.update(&user, id, request).await?))
}

async fn delete_item(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = ItemController::new(state.repos.clone());
    Ok(Json(controller.delete(&user, id).await?))
}
