use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::non_gst_bill_controller::NonGstBillController;
use crate::dto::api_response::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::gst_bill::BillFilters;
use crate::models::non_gst_bill::{CreateNonGstBillRequest, NonGstBill, UpdateNonGstBillRequest};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_non_gst_bill_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_non_gst_bill).get(list_non_gst_bills))
        .route(
            "/:id",
            get(get_non_gst_bill).put(update_non_gst_bill).delete(delete_non_gst_bill),
        )
}

async fn create_non_gst_bill(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateNonGstBillRequest>,
) -> Result<Json<ApiResponse<NonGstBill>>, AppError> {
    let controller = NonGstBillController::new(state.repos.clone());
    Ok(Json(controller.create(&user, request).await?))
}

async fn list_non_gst_bills(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(filters): Query<BillFilters>,
) -> Result<Json<Vec<NonGstBill>>, AppError> {
    let controller = NonGstBillController::new(state.repos.clone());
    Ok(Json(controller.list(&user, filters).await?))
}

async fn get_non_gst_bill(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<NonGstBill>, AppError> {
    let controller = NonGstBillController::new(state.repos.clone());
    Ok(Json(controller.get(&user, id).await?))
}

async fn update_non_gst_bill(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateNonGstBillRequest>,
) -> Result<Json<ApiResponse<NonGstBill>>, AppError> {
    let controller = NonGstBillController::new(state.repos.clone());
    Ok(Json(controller.update(&user, id, request).await?))
}

async fn delete_non_gst_bill(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = NonGstBillController::new(state.repos.clone());
    Ok(Json(controller.delete(&user, id).await?))
}
