use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::expense::{Expense, ExpenseFilters};
use crate::repositories::db_error;
use crate::repositories::memory::MemoryTable;
use crate::utils::errors::AppResult;

#[async_trait]
pub trait ExpenseRepository: Send + Sync {
    async fn create(&self, expense: &Expense) -> AppResult<Expense>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Expense>>;
    async fn list(&self, filters: &ExpenseFilters) -> AppResult<Vec<Expense>>;
    async fn update(&self, expense: &Expense) -> AppResult<Option<Expense>>;
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
    async fn count_by_creator(&self, user_id: Uuid) -> AppResult<i64>;
    async fn total(&self) -> AppResult<Decimal>;
}

pub struct PgExpenseRepository {
    pool: PgPool,
}

impl PgExpenseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExpenseRepository for PgExpenseRepository {
    async fn create(&self, expense: &Expense) -> AppResult<Expense> {
        sqlx::query_as::<_, Expense>(
            r#"
            INSERT INTO expenses (
                id, date, expense_type, amount, description, paid_to, payment_mode, created_by,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(expense.id)
        .bind(expense.date)
        .bind(&expense.expense_type)
        .bind(expense.amount)
        .bind(&expense.description)
        .bind(&expense.paid_to)
        .bind(expense.payment_mode)
        .bind(expense.created_by)
        .bind(expense.created_at)
        .bind(expense.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Error creating expense", e))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Expense>> {
        sqlx::query_as::<_, Expense>("SELECT * FROM expenses WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Error finding expense", e))
    }

    async fn list(&self, filters: &ExpenseFilters) -> AppResult<Vec<Expense>> {
        sqlx::query_as::<_, Expense>(
            r#"
            SELECT * FROM expenses
            WHERE ($1::date IS NULL OR date >= $1)
              AND ($2::date IS NULL OR date <= $2)
              AND ($3::text IS NULL OR LOWER(expense_type) = LOWER(BTRIM($3)))
              AND ($4::payment_mode IS NULL OR payment_mode = $4)
            ORDER BY date DESC, created_at DESC
            "#,
        )
        .bind(filters.from)
        .bind(filters.to)
        .bind(&filters.expense_type)
        .bind(filters.payment_mode)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Error listing expenses", e))
    }

    async fn update(&self, expense: &Expense) -> AppResult<Option<Expense>> {
        sqlx::query_as::<_, Expense>(
            r#"
            UPDATE expenses
            SET date = $2, expense_type = $3, amount = $4, description = $5, paid_to = $6,
                payment_mode = $7, updated_at = $8
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(expense.id)
        .bind(expense.date)
        .bind(&expense.expense_type)
        .bind(expense.amount)
        .bind(&expense.description)
        .bind(&expense.paid_to)
        .bind(expense.payment_mode)
        .bind(expense.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Error updating expense", e))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Error deleting expense", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_by_creator(&self, user_id: Uuid) -> AppResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM expenses WHERE created_by = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("Error counting expenses", e))?;

        Ok(count)
    }

    async fn total(&self) -> AppResult<Decimal> {
        let (total,): (Decimal,) = sqlx::query_as("SELECT COALESCE(SUM(amount), 0) FROM expenses")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("Error summing expenses", e))?;

        Ok(total)
    }
}

#[derive(Default)]
pub struct MemoryExpenseRepository {
    table: MemoryTable<Expense>,
}

#[async_trait]
impl ExpenseRepository for MemoryExpenseRepository {
    async fn create(&self, expense: &Expense) -> AppResult<Expense> {
        Ok(self.table.insert(expense.clone()).await)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Expense>> {
        Ok(self.table.get(id).await)
    }

    async fn list(&self, filters: &ExpenseFilters) -> AppResult<Vec<Expense>> {
        let mut expenses = self.table.filter(|e| filters.matches(e)).await;
        expenses.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(expenses)
    }

    async fn update(&self, expense: &Expense) -> AppResult<Option<Expense>> {
        Ok(self.table.replace(expense.clone()).await)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.table.remove(id).await)
    }

    async fn count_by_creator(&self, user_id: Uuid) -> AppResult<i64> {
        Ok(self.table.count(|e| e.created_by == user_id).await)
    }

    async fn total(&self) -> AppResult<Decimal> {
        Ok(self
            .table
            .filter(|_| true)
            .await
            .iter()
            .map(|e| e.amount)
            .sum())
    }
}
