use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::customer_controller::CustomerController;
use crate::dto::api_response::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::customer::{
    CreateCustomerRequest, Customer, CustomerFilters, UpdateCustomerRequest, VehicleInput,
};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_customer_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_customer).get(list_customers))
        .route(
            "/:id",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
        .route("/:id/vehicles", post(add_vehicle))
        .route("/:id/vehicles/:vehicle_id", delete(remove_vehicle))
}

async fn create_customer(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateCustomerRequest>,
) -> Result<Json<ApiResponse<Customer>>, AppError> {
    let controller = CustomerController::new(state.repos.clone());
    Ok(Json(controller.create(&user, request).await?))
}

async fn list_customers(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(filters): Query<CustomerFilters>,
) -> Result<Json<Vec<Customer>>, AppError> {
    let controller = CustomerController::new(state.repos.clone());
    Ok(Json(controller.list(&user, filters).await?))
}

async fn get_customer(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Customer>, AppError> {
    let controller = CustomerController::new(state.repos.clone());
    Ok(Json(controller.get(&user, id).await?))
}

async fn update_customer(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateCustomerRequest>,
) -> Result<Json<ApiResponse<Customer>>, AppError> {
    let controller = CustomerController::new(state.repos.clone());
    Ok(Json(controller.update(&user, id, request).await?))
}

async fn delete_customer(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = CustomerController::new(state.repos.clone());
    Ok(Json(controller.delete(&user, id).await?))
}

async fn add_vehicle(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<VehicleInput>,
) -> Result<Json<ApiResponse<Customer>>, AppError> {
    let controller = CustomerController::new(state.repos.clone());
    Ok(Json(controller.add_vehicle(&user, id, input).await?))
}

async fn remove_vehicle(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((id, vehicle_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<Customer>>, AppError> {
    let controller = CustomerController::new(state.repos.clone());
    Ok(Json(controller.remove_vehicle(&user, id, vehicle_id).await?))
}
