use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::gst_bill_controller::GstBillController;
use crate::dto::api_response::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::gst_bill::{
    BillFilters, CreateGstBillRequest, GstBill, UpdateGstBillRequest,
};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_gst_bill_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_gst_bill).get(list_gst_bills))
        .route(
            "/:id",
            get(get_gst_bill).put(update_gst_bill).delete(delete_gst_bill),
        )
}

async fn create_gst_bill(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateGstBillRequest>,
) -> Result<Json<ApiResponse<GstBill>>, AppError> {
    let controller = GstBillController::new(state.repos.clone());
    Ok(Json(controller.create(&user, request).await?))
}

async fn list_gst_bills(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(filters): Query<BillFilters>,
) -> Result<Json<Vec<GstBill>>, AppError> {
    let controller = GstBillController::new(state.repos.clone());
    Ok(Json(controller.list(&user, filters).await?))
}

async fn get_gst_bill(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<GstBill>, AppError> {
    let controller = GstBillController::new(state.repos.clone());
    Ok(Json(controller.get(&user, id).await?))
}

async fn update_gst_bill(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateGstBillRequest>,
) -> Result<Json<ApiResponse<GstBill>>, AppError> {
    let controller = GstBillController::new(state.repos.clone());
    Ok(Json(controller.update(&user, id, request).await?))
}

async fn delete_gst_bill(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = GstBillController::new(state.repos.clone());
    Ok(Json(controller.delete(&user, id).await?))
}
