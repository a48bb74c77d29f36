use uuid::Uuid;
use validator::Validate;

use crate::dto::api_response::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::expense_category::{
    CreateExpenseCategoryRequest, ExpenseCategory, UpdateExpenseCategoryRequest,
};
use crate::repositories::Repositories;
use crate::services::access_policy::{authorize, Action, Feature};
use crate::utils::errors::{conflict_error, not_found_error, AppResult};

pub struct ExpenseCategoryController {
    repos: Repositories,
}

impl ExpenseCategoryController {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        request: CreateExpenseCategoryRequest,
    ) -> AppResult<ApiResponse<ExpenseCategory>> {
        authorize(user.role, Feature::Expenses, Action::Write)?;
        request.validate()?;

        if self.repos.expense_categories.name_exists(&request.name, None).await? {
            return Err(conflict_error("Expense category", "name", request.name.trim()));
        }

        let category = self
            .repos
            .expense_categories
            .create(&ExpenseCategory::new(request))
            .await?;
        Ok(ApiResponse::success_with_message(category, "Expense category created successfully"))
    }

    pub async fn list(&self, user: &AuthenticatedUser) -> AppResult<Vec<ExpenseCategory>> {
        authorize(user.role, Feature::Expenses, Action::Read)?;
        self.repos.expense_categories.list().await
    }

    pub async fn get(&self, user: &AuthenticatedUser, id: Uuid) -> AppResult<ExpenseCategory> {
        authorize(user.role, Feature::Expenses, Action::Read)?;
        self.find(id).await
    }

    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        request: UpdateExpenseCategoryRequest,
    ) -> AppResult<ApiResponse<ExpenseCategory>> {
        authorize(user.role, Feature::Expenses, Action::Write)?;
        request.validate()?;

        if let Some(name) = &request.name {
            if self.repos.expense_categories.name_exists(name, Some(id)).await? {
                return Err(conflict_error("Expense category", "name", name.trim()));
            }
        }

        let mut category = self.find(id).await?;
        category.apply_update(request);
        let category = self
            .repos
            .expense_categories
            .update(&category)
            .await?
            .ok_or_else(|| not_found_error("Expense category", &id.to_string()))?;

        Ok(ApiResponse::success_with_message(category, "Expense category updated successfully"))
    }

    pub async fn delete(&self, user: &AuthenticatedUser, id: Uuid) -> AppResult<ApiResponse<()>> {
        authorize(user.role, Feature::Expenses, Action::Delete)?;
        if !self.repos.expense_categories.delete(id).await? {
            return Err(not_found_error("Expense category", &id.to_string()));
        }
        Ok(ApiResponse::message("Expense category deleted successfully"))
    }

    async fn find(&self, id: Uuid) -> AppResult<ExpenseCategory> {
        self.repos
            .expense_categories
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Expense category", &id.to_string()))
    }
}
