use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::item::Item;
use crate::repositories::db_error;
use crate::repositories::memory::MemoryTable;
use crate::utils::errors::AppResult;

#[async_trait]
pub trait ItemRepository: Send + Sync {
    async fn create(&self, item: &Item) -> AppResult<Item>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Item>>;
    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Item>>;
    async fn list(&self) -> AppResult<Vec<Item>>;
    async fn update(&self, item: &Item) -> AppResult<Option<Item>>;
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

pub struct PgItemRepository {
    pool: PgPool,
}

impl PgItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ItemRepository for PgItemRepository {
    async fn create(&self, item: &Item) -> AppResult<Item> {
        sqlx::query_as::<_, Item>(
            r#"
            INSERT INTO items (
                id, description, hsn_code, quantity, rate, gst_percent, amount, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(item.id)
        .bind(&item.description)
        .bind(&item.hsn_code)
        .bind(item.quantity)
        .bind(item.rate)
        .bind(item.gst_percent.to_db())
        .bind(item.amount)
        .bind(item.created_at)
        .bind(item.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Error creating item", e))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Item>> {
        sqlx::query_as::<_, Item>("SELECT * FROM items WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Error finding item", e))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Item>> {
        sqlx::query_as::<_, Item>("SELECT * FROM items WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Error finding items", e))
    }

    async fn list(&self) -> AppResult<Vec<Item>> {
        sqlx::query_as::<_, Item>("SELECT * FROM items ORDER BY description")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Error listing items", e))
    }

    async fn update(&self, item: &Item) -> AppResult<Option<Item>> {
        sqlx::query_as::<_, Item>(
            r#"
            UPDATE items
            SET description = $2, hsn_code = $3, quantity = $4, rate = $5, gst_percent = $6,
                amount = $7, updated_at = $8
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(item.id)
        .bind(&item.description)
        .bind(&item.hsn_code)
        .bind(item.quantity)
        .bind(item.rate)
        .bind(item.gst_percent.to_db())
        .bind(item.amount)
        .bind(item.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Error updating item", e))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Error deleting item", e))?;

        Ok(result.rows_affected() > 0)
    }
}

#[derive(Default)]
pub struct MemoryItemRepository {
    table: MemoryTable<Item>,
}

#[async_trait]
impl ItemRepository for MemoryItemRepository {
    async fn create(&self, item: &Item) -> AppResult<Item> {
        Ok(self.table.insert(item.clone()).await)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Item>> {
        Ok(self.table.get(id).await)
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Item>> {
        Ok(self.table.filter(|i| ids.contains(&i.id)).await)
    }

    async fn list(&self) -> AppResult<Vec<Item>> {
        let mut items = self.table.filter(|_| true).await;
        items.sort_by(|a, b| a.description.cmp(&b.description));
        Ok(items)
    }

    async fn update(&self, item: &Item) -> AppResult<Option<Item>> {
        Ok(self.table.replace(item.clone()).await)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.table.remove(id).await)
    }
}
