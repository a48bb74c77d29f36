use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user::{User, UserFilters};
use crate::repositories::db_error;
use crate::repositories::memory::MemoryTable;
use crate::utils::errors::{conflict_error, AppResult};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> AppResult<User>;
    /// Inserta solo si la tabla está vacía; None si ya había algún usuario
    async fn create_if_empty(&self, user: &User) -> AppResult<Option<User>>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
    /// ¿Otro usuario (distinto de `exclude`) usa ya este email?
    async fn email_exists(&self, email: &str, exclude: Option<Uuid>) -> AppResult<bool>;
    async fn list(&self, filters: &UserFilters) -> AppResult<Vec<User>>;
    async fn update(&self, user: &User) -> AppResult<Option<User>>;
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
    async fn count(&self) -> AppResult<i64>;
}

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: &User) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (
                id, full_name, email, password_hash, phone, role, profile_picture, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.phone)
        .bind(user.role)
        .bind(&user.profile_picture)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Error creating user", e))
    }

    async fn create_if_empty(&self, user: &User) -> AppResult<Option<User>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Error starting transaction", e))?;

        // bloquea altas concurrentes hasta el commit
        sqlx::query("LOCK TABLE users IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Error locking users", e))?;

        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (
                id, full_name, email, password_hash, phone, role, profile_picture, created_at, updated_at
            )
            SELECT $1, $2, $3, $4, $5, $6, $7, $8, $9
            WHERE NOT EXISTS (SELECT 1 FROM users)
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.phone)
        .bind(user.role)
        .bind(&user.profile_picture)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_error("Error creating first user", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Error committing first user", e))?;
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Error finding user", e))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Error finding user by email", e))
    }

    async fn email_exists(&self, email: &str, exclude: Option<Uuid>) -> AppResult<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM users
                WHERE LOWER(email) = LOWER($1) AND ($2::uuid IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(email.trim())
        .bind(exclude)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Error checking email", e))?;

        Ok(exists)
    }

    async fn list(&self, filters: &UserFilters) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE $1::user_role IS NULL OR role = $1 ORDER BY created_at DESC",
        )
        .bind(filters.role)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Error listing users", e))
    }

    async fn update(&self, user: &User) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET full_name = $2, email = $3, password_hash = $4, phone = $5, role = $6,
                profile_picture = $7, updated_at = $8
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.phone)
        .bind(user.role)
        .bind(&user.profile_picture)
        .bind(user.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Error updating user", e))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Error deleting user", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> AppResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("Error counting users", e))?;

        Ok(count)
    }
}

#[derive(Default)]
pub struct MemoryUserRepository {
    table: MemoryTable<User>,
}

fn same_email(a: &User, b: &User) -> bool {
    a.email.eq_ignore_ascii_case(&b.email)
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: &User) -> AppResult<User> {
        self.table
            .insert_unique(user.clone(), same_email)
            .await
            .ok_or_else(|| conflict_error("User", "email", &user.email))
    }

    async fn create_if_empty(&self, user: &User) -> AppResult<Option<User>> {
        Ok(self.table.insert_unique(user.clone(), |_, _| true).await)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.table.get(id).await)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let email = email.trim();
        Ok(self.table.find(|u| u.email.eq_ignore_ascii_case(email)).await)
    }

    async fn email_exists(&self, email: &str, exclude: Option<Uuid>) -> AppResult<bool> {
        let email = email.trim();
        let count = self
            .table
            .count(|u| u.email.eq_ignore_ascii_case(email) && Some(u.id) != exclude)
            .await;
        Ok(count > 0)
    }

    async fn list(&self, filters: &UserFilters) -> AppResult<Vec<User>> {
        Ok(self
            .table
            .filter(|u| filters.role.map_or(true, |r| u.role == r))
            .await)
    }

    async fn update(&self, user: &User) -> AppResult<Option<User>> {
        self.table
            .replace_unique(user.clone(), same_email)
            .await
            .map_err(|_| conflict_error("User", "email", &user.email))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.table.remove(id).await)
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.table.count(|_| true).await)
    }
}
