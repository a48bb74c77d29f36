use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::expense_category_controller::ExpenseCategoryController;
use crate::dto::api_response::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::expense_category::{CreateExpenseCategoryRequest, ExpenseCategory, UpdateExpenseCategoryRequest};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_expense_category_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_expense_category).get(list_expense_categories))
        .route(
            "/:id",
            get(get_expense_category).put(update_expense_category).delete(delete_expense_category),
        )
}

async fn create_expense_category(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateExpenseCategoryRequest>,
) -> Result<Json<ApiResponse<ExpenseCategory>>, AppError> {
    let controller = ExpenseCategoryController::new(state.repos.clone());
    Ok(Json(controller.create(&user, request).await?))
}

async fn list_expense_categories(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<ExpenseCategory>>, AppError> {
    let controller = ExpenseCategoryController::new(state.repos.clone());
    Ok(Json(controller.list(&user).await?))
}

async fn get_expense_category(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ExpenseCategory>, AppError> {
    let controller = ExpenseCategoryController::new(state.repos.clone());
    Ok(Json(controller.get(&user, id).await?))
}

async fn update_expense_category(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateExpenseCategoryRequest>,
) -> Result<Json<ApiResponse<ExpenseCategory>>, AppError> {
    let controller = ExpenseCategoryController::new(state.repos.clone());
    Ok(Json(controller.update(&user, id, request).await?))
}

async fn delete_expense_category(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = ExpenseCategoryController::new(state.repos.clone());
    Ok(Json(controller.delete(&user, id).await?))
}
