use uuid::Uuid;
use validator::Validate;

use crate::dto::api_response::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::expense::{CreateExpenseRequest, Expense, ExpenseFilters, UpdateExpenseRequest};
use crate::repositories::Repositories;
use crate::services::access_policy::{authorize, Action, Feature};
use crate::utils::errors::{not_found_error, AppResult};

pub struct ExpenseController {
    repos: Repositories,
}

impl ExpenseController {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// `createdBy` es siempre el usuario autenticado
    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        request: CreateExpenseRequest,
    ) -> AppResult<ApiResponse<Expense>> {
        authorize(user.role, Feature::Expenses, Action::Write)?;
        request.validate()?;

        let expense = self.repos.expenses.create(&Expense::new(user.user_id, request)).await?;
        log::info!("💸 Gasto registrado: {} {}", expense.expense_type, expense.amount);
        Ok(ApiResponse::success_with_message(expense, "Expense created successfully"))
    }

    pub async fn list(
        &self,
        user: &AuthenticatedUser,
        filters: ExpenseFilters,
    ) -> AppResult<Vec<Expense>> {
        authorize(user.role, Feature::Expenses, Action::Read)?;
        self.repos.expenses.list(&filters).await
    }

    pub async fn get(&self, user: &AuthenticatedUser, id: Uuid) -> AppResult<Expense> {
        authorize(user.role, Feature::Expenses, Action::Read)?;
        self.find(id).await
    }

    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        request: UpdateExpenseRequest,
    ) -> AppResult<ApiResponse<Expense>> {
        authorize(user.role, Feature::Expenses, Action::Write)?;
        request.validate()?;

        let mut expense = self.find(id).await?;
        expense.apply_update(request);
        let expense = self
            .repos
            .expenses
            .update(&expense)
            .await?
            .ok_or_else(|| not_found_error("Expense", &id.to_string()))?;

        Ok(ApiResponse::success_with_message(expense, "Expense updated successfully"))
    }

    pub async fn delete(&self, user: &AuthenticatedUser, id: Uuid) -> AppResult<ApiResponse<()>> {
        authorize(user.role, Feature::Expenses, Action::Delete)?;
        if !self.repos.expenses.delete(id).await? {
            return Err(not_found_error("Expense", &id.to_string()));
        }
        Ok(ApiResponse::message("Expense deleted successfully"))
    }

    async fn find(&self, id: Uuid) -> AppResult<Expense> {
        self.repos
            .expenses
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Expense", &id.to_string()))
    }
}
