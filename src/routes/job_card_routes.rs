use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::job_card_controller::JobCardController;
use crate::dto::api_response::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::job_card::{
    CreateJobCardRequest, JobCardFilters, JobCardView, UpdateJobCardRequest,
};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_job_card_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_job_card).get(list_job_cards))
        .route(
            "/:id",
            get(get_job_card).put(update_job_card).delete(delete_job_card),
        )
}

async fn create_job_card(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateJobCardRequest>,
) -> Result<Json<ApiResponse<JobCardView>>, AppError> {
    let controller = JobCardController::new(state.repos.clone());
    Ok(Json(controller.create(&user, request).await?))
}

async fn list_job_cards(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(filters): Query<JobCardFilters>,
) -> Result<Json<Vec<JobCardView>>, AppError> {
    let controller = JobCardController::new(state.repos.clone());
    Ok(Json(controller.list(&user, filters).await?))
}

async fn get_job_card(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobCardView>, AppError> {
    let controller = JobCardController::new(state.repos.clone());
    Ok(Json(controller.get(&user, id).await?))
}

async fn update_job_card(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateJobCardRequest>,
) -> Result<Json<ApiResponse<JobCardView>>, AppError> {
    let controller = JobCardController::new(state.repos.clone());
    Ok(Json(controller.update(&user, id, request).await?))
}

async fn delete_job_card(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = JobCardController::new(state.repos.clone());
    Ok(Json(controller.delete(&user, id).await?))
}
