use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::expense_category::ExpenseCategory;
use crate::repositories::db_error;
use crate::repositories::memory::MemoryTable;
use crate::utils::errors::{conflict_error, AppResult};

#[async_trait]
pub trait ExpenseCategoryRepository: Send + Sync {
    async fn create(&self, category: &ExpenseCategory) -> AppResult<ExpenseCategory>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ExpenseCategory>>;
    async fn list(&self) -> AppResult<Vec<ExpenseCategory>>;
    async fn update(&self, category: &ExpenseCategory) -> AppResult<Option<ExpenseCategory>>;
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
    async fn name_exists(&self, name: &str, exclude: Option<Uuid>) -> AppResult<bool>;
}

pub struct PgExpenseCategoryRepository {
    pool: PgPool,
}

impl PgExpenseCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExpenseCategoryRepository for PgExpenseCategoryRepository {
    async fn create(&self, category: &ExpenseCategory) -> AppResult<ExpenseCategory> {
        sqlx::query_as::<_, ExpenseCategory>(
            r#"
            INSERT INTO expense_categories (id, name, value, color, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(category.id)
        .bind(&category.name)
        .bind(&category.value)
        .bind(&category.color)
        .bind(category.created_at)
        .bind(category.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Error creating expense category", e))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ExpenseCategory>> {
        sqlx::query_as::<_, ExpenseCategory>("SELECT * FROM expense_categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Error finding expense category", e))
    }

    async fn list(&self) -> AppResult<Vec<ExpenseCategory>> {
        sqlx::query_as::<_, ExpenseCategory>("SELECT * FROM expense_categories ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Error listing expense categories", e))
    }

    async fn update(&self, category: &ExpenseCategory) -> AppResult<Option<ExpenseCategory>> {
        sqlx::query_as::<_, ExpenseCategory>(
            r#"
            UPDATE expense_categories SET name = $2, value = $3, color = $4, updated_at = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(category.id)
        .bind(&category.name)
        .bind(&category.value)
        .bind(&category.color)
        .bind(category.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Error updating expense category", e))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM expense_categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Error deleting expense category", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn name_exists(&self, name: &str, exclude: Option<Uuid>) -> AppResult<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM expense_categories
                WHERE LOWER(name) = LOWER(BTRIM($1)) AND ($2::uuid IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(name)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Error checking expense category name", e))?;

        Ok(exists)
    }
}

#[derive(Default)]
pub struct MemoryExpenseCategoryRepository {
    table: MemoryTable<ExpenseCategory>,
}

fn same_name(a: &ExpenseCategory, b: &ExpenseCategory) -> bool {
    a.name.eq_ignore_ascii_case(&b.name)
}

#[async_trait]
impl ExpenseCategoryRepository for MemoryExpenseCategoryRepository {
    async fn create(&self, category: &ExpenseCategory) -> AppResult<ExpenseCategory> {
        self.table
            .insert_unique(category.clone(), same_name)
            .await
            .ok_or_else(|| conflict_error("Expense category", "name", &category.name))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ExpenseCategory>> {
        Ok(self.table.get(id).await)
    }

    async fn list(&self) -> AppResult<Vec<ExpenseCategory>> {
        let mut categories = self.table.filter(|_| true).await;
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn update(&self, category: &ExpenseCategory) -> AppResult<Option<ExpenseCategory>> {
        self.table
            .replace_unique(category.clone(), same_name)
            .await
            .map_err(|_| conflict_error("Expense category", "name", &category.name))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.table.remove(id).await)
    }

    async fn name_exists(&self, name: &str, exclude: Option<Uuid>) -> AppResult<bool> {
        let name = name.trim();
        let count = self
            .table
            .count(|c| c.name.eq_ignore_ascii_case(name) && Some(c.id) != exclude)
            .await;
        Ok(count > 0)
    }
}
