use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::mechanic::Mechanic;
use crate::repositories::db_error;
use crate::repositories::memory::MemoryTable;
use crate::utils::errors::AppResult;

#[async_trait]
pub trait MechanicRepository: Send + Sync {
    async fn create(&self, mechanic: &Mechanic) -> AppResult<Mechanic>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Mechanic>>;
    async fn list(&self) -> AppResult<Vec<Mechanic>>;
    async fn update(&self, mechanic: &Mechanic) -> AppResult<Option<Mechanic>>;
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

pub struct PgMechanicRepository {
    pool: PgPool,
}

impl PgMechanicRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MechanicRepository for PgMechanicRepository {
    async fn create(&self, mechanic: &Mechanic) -> AppResult<Mechanic> {
        sqlx::query_as::<_, Mechanic>(
            r#"
            INSERT INTO mechanics (id, name, specialty, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(mechanic.id)
        .bind(&mechanic.name)
        .bind(&mechanic.specialty)
        .bind(mechanic.created_at)
        .bind(mechanic.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Error creating mechanic", e))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Mechanic>> {
        sqlx::query_as::<_, Mechanic>("SELECT * FROM mechanics WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Error finding mechanic", e))
    }

    async fn list(&self) -> AppResult<Vec<Mechanic>> {
        sqlx::query_as::<_, Mechanic>("SELECT * FROM mechanics ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Error listing mechanics", e))
    }

    async fn update(&self, mechanic: &Mechanic) -> AppResult<Option<Mechanic>> {
        sqlx::query_as::<_, Mechanic>(
            r#"
            UPDATE mechanics SET name = $2, specialty = $3, updated_at = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(mechanic.id)
        .bind(&mechanic.name)
        .bind(&mechanic.specialty)
        .bind(mechanic.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Error updating mechanic", e))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM mechanics WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Error deleting mechanic", e))?;

        Ok(result.rows_affected() > 0)
    }
}

#[derive(Default)]
pub struct MemoryMechanicRepository {
    table: MemoryTable<Mechanic>,
}

#[async_trait]
impl MechanicRepository for MemoryMechanicRepository {
    async fn create(&self, mechanic: &Mechanic) -> AppResult<Mechanic> {
        Ok(self.table.insert(mechanic.clone()).await)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Mechanic>> {
        Ok(self.table.get(id).await)
    }

    async fn list(&self) -> AppResult<Vec<Mechanic>> {
        let mut mechanics = self.table.filter(|_| true).await;
        mechanics.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(mechanics)
    }

    async fn update(&self, mechanic: &Mechanic) -> AppResult<Option<Mechanic>> {
        Ok(self.table.replace(mechanic.clone()).await)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.table.remove(id).await)
    }
}
