use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::garage::GarageProfile;
use crate::repositories::db_error;
use crate::repositories::memory::MemoryTable;
use crate::utils::errors::{conflict_error, AppResult};

#[async_trait]
pub trait GarageRepository: Send + Sync {
    /// Falla con Conflict si el usuario ya tiene perfil
    async fn create(&self, profile: &GarageProfile) -> AppResult<GarageProfile>;
    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<GarageProfile>>;
    /// Primer perfil creado; es el del taller cuando hay uno solo
    async fn find_first(&self) -> AppResult<Option<GarageProfile>>;
    async fn update(&self, profile: &GarageProfile) -> AppResult<Option<GarageProfile>>;
    async fn delete_by_user(&self, user_id: Uuid) -> AppResult<bool>;
}

pub struct PgGarageRepository {
    pool: PgPool,
}

impl PgGarageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GarageRepository for PgGarageRepository {
    async fn create(&self, profile: &GarageProfile) -> AppResult<GarageProfile> {
        sqlx::query_as::<_, GarageProfile>(
            r#"
            INSERT INTO garage_profiles (
                id, user_id, logo, garage_name, phone, email, address, city, state, zip,
                footer_message, enable_gst, gst_number, gst_rate, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING *
            "#,
        )
        .bind(profile.id)
        .bind(profile.user_id)
        .bind(&profile.logo)
        .bind(&profile.garage_name)
        .bind(&profile.phone)
        .bind(&profile.email)
        .bind(&profile.address)
        .bind(&profile.city)
        .bind(&profile.state)
        .bind(&profile.zip)
        .bind(&profile.footer_message)
        .bind(profile.enable_gst)
        .bind(&profile.gst_number)
        .bind(profile.gst_rate.to_db())
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Error creating garage profile", e))
    }

    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<GarageProfile>> {
        sqlx::query_as::<_, GarageProfile>("SELECT * FROM garage_profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Error finding garage profile", e))
    }

    async fn find_first(&self) -> AppResult<Option<GarageProfile>> {
        sqlx::query_as::<_, GarageProfile>(
            "SELECT * FROM garage_profiles ORDER BY created_at ASC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Error finding garage profile", e))
    }

    async fn update(&self, profile: &GarageProfile) -> AppResult<Option<GarageProfile>> {
        sqlx::query_as::<_, GarageProfile>(
            r#"
            UPDATE garage_profiles
            SET logo = $2, garage_name = $3, phone = $4, email = $5, address = $6, city = $7,
                state = $8, zip = $9, footer_message = $10, enable_gst = $11, gst_number = $12,
                gst_rate = $13, updated_at = $14
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(profile.id)
        .bind(&profile.logo)
        .bind(&profile.garage_name)
        .bind(&profile.phone)
        .bind(&profile.email)
        .bind(&profile.address)
        .bind(&profile.city)
        .bind(&profile.state)
        .bind(&profile.zip)
        .bind(&profile.footer_message)
        .bind(profile.enable_gst)
        .bind(&profile.gst_number)
        .bind(profile.gst_rate.to_db())
        .bind(profile.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Error updating garage profile", e))
    }

    async fn delete_by_user(&self, user_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM garage_profiles WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Error deleting garage profile", e))?;

        Ok(result.rows_affected() > 0)
    }
}

#[derive(Default)]
pub struct MemoryGarageRepository {
    table: MemoryTable<GarageProfile>,
}

#[async_trait]
impl GarageRepository for MemoryGarageRepository {
    async fn create(&self, profile: &GarageProfile) -> AppResult<GarageProfile> {
        self.table
            .insert_unique(profile.clone(), |a, b| a.user_id == b.user_id)
            .await
            .ok_or_else(|| conflict_error("Garage profile", "user", &profile.user_id.to_string()))
    }

    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<GarageProfile>> {
        Ok(self.table.find(|g| g.user_id == user_id).await)
    }

    async fn find_first(&self) -> AppResult<Option<GarageProfile>> {
        Ok(self.table.filter(|_| true).await.pop())
    }

    async fn update(&self, profile: &GarageProfile) -> AppResult<Option<GarageProfile>> {
        Ok(self.table.replace(profile.clone()).await)
    }

    async fn delete_by_user(&self, user_id: Uuid) -> AppResult<bool> {
        match self.table.find(|g| g.user_id == user_id).await {
            Some(profile) => Ok(self.table.remove(profile.id).await),
            None => Ok(false),
        }
    }
}
