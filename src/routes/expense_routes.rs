use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::expense_controller::ExpenseController;
use crate::dto::api_response::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::expense::{CreateExpenseRequest, Expense, ExpenseFilters, UpdateExpenseRequest};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_expense_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_expense).get(list_expenses))
        .route(
            "/:id",
            get(get_expense).put(update_expense).delete(delete_expense),
        )
}

async fn create_expense(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateExpenseRequest>,
) -> Result<Json<ApiResponse<Expense>>, AppError> {
    let controller = ExpenseController::new(state.repos.clone());
    Ok(Json(controller.create(&user, request).await?))
}

async fn list_expenses(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(filters): Query<ExpenseFilters>,
) -> Result<Json<Vec<Expense>>, AppError> {
    let controller = ExpenseController::new(state.repos.clone());
    Ok(Json(controller.list(&user, filters).await?))
}

async fn get_expense(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Expense>, AppError> {
    let controller = ExpenseController::new(state.repos.clone());
    Ok(Json(controller.get(&user, id).await?))
}

async fn update_expense(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateExpenseRequest>,
) -> Result<Json<ApiResponse<Expense>>, AppError> {
    let controller = ExpenseController::new(state.repos.clone());
    Ok(Json(controller.update(&user, id, request).await?))
}

async fn delete_expense(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = ExpenseController::new(state.repos.clone());
    Ok(Json(controller.delete(&user, id).await?))
}
