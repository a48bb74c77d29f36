use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::permission::{Permission, RolePermission};
use crate::models::user::Role;
use crate::repositories::db_error;
use crate::repositories::memory::MemoryTable;
use crate::utils::errors::{conflict_error, AppResult};

#[async_trait]
pub trait PermissionRepository: Send + Sync {
    async fn create(&self, permission: &Permission) -> AppResult<Permission>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Permission>>;
    async fn list(&self) -> AppResult<Vec<Permission>>;
    async fn update(&self, permission: &Permission) -> AppResult<Option<Permission>>;
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
    async fn name_exists(&self, name: &str, exclude: Option<Uuid>) -> AppResult<bool>;
    /// true si el enlace no existía
    async fn link(&self, role: Role, permission_id: Uuid) -> AppResult<bool>;
    async fn unlink(&self, role: Role, permission_id: Uuid) -> AppResult<bool>;
    async fn permissions_for_role(&self, role: Role) -> AppResult<Vec<Permission>>;
    async fn count_links(&self, permission_id: Uuid) -> AppResult<i64>;
}

pub struct PgPermissionRepository {
    pool: PgPool,
}

impl PgPermissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PermissionRepository for PgPermissionRepository {
    async fn create(&self, permission: &Permission) -> AppResult<Permission> {
        sqlx::query_as::<_, Permission>(
            r#"
            INSERT INTO permissions (id, name, active, description, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(permission.id)
        .bind(&permission.name)
        .bind(permission.active)
        .bind(&permission.description)
        .bind(permission.created_at)
        .bind(permission.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Error creating permission", e))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Permission>> {
        sqlx::query_as::<_, Permission>("SELECT * FROM permissions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Error finding permission", e))
    }

    async fn list(&self) -> AppResult<Vec<Permission>> {
        sqlx::query_as::<_, Permission>("SELECT * FROM permissions ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Error listing permissions", e))
    }

    async fn update(&self, permission: &Permission) -> AppResult<Option<Permission>> {
        sqlx::query_as::<_, Permission>(
            r#"
            UPDATE permissions SET name = $2, active = $3, description = $4, updated_at = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(permission.id)
        .bind(&permission.name)
        .bind(permission.active)
        .bind(&permission.description)
        .bind(permission.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Error updating permission", e))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM permissions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Error deleting permission", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn name_exists(&self, name: &str, exclude: Option<Uuid>) -> AppResult<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM permissions WHERE name = BTRIM($1) AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(name)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Error checking permission name", e))?;

        Ok(exists)
    }

    async fn link(&self, role: Role, permission_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO role_permissions (role, permission_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(role)
        .bind(permission_id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Error linking permission", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn unlink(&self, role: Role, permission_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM role_permissions WHERE role = $1 AND permission_id = $2")
            .bind(role)
            .bind(permission_id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Error unlinking permission", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn permissions_for_role(&self, role: Role) -> AppResult<Vec<Permission>> {
        sqlx::query_as::<_, Permission>(
            r#"
            SELECT p.* FROM permissions p
            JOIN role_permissions rp ON rp.permission_id = p.id
            WHERE rp.role = $1
            ORDER BY p.name
            "#,
        )
        .bind(role)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Error listing role permissions", e))
    }

    async fn count_links(&self, permission_id: Uuid) -> AppResult<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM role_permissions WHERE permission_id = $1")
                .bind(permission_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| db_error("Error counting role links", e))?;

        Ok(count)
    }
}

#[derive(Default)]
pub struct MemoryPermissionRepository {
    table: MemoryTable<Permission>,
    links: RwLock<Vec<RolePermission>>,
}

fn same_name(a: &Permission, b: &Permission) -> bool {
    a.name == b.name
}

#[async_trait]
impl PermissionRepository for MemoryPermissionRepository {
    async fn create(&self, permission: &Permission) -> AppResult<Permission> {
        self.table
            .insert_unique(permission.clone(), same_name)
            .await
            .ok_or_else(|| conflict_error("Permission", "name", &permission.name))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Permission>> {
        Ok(self.table.get(id).await)
    }

    async fn list(&self) -> AppResult<Vec<Permission>> {
        let mut permissions = self.table.filter(|_| true).await;
        permissions.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(permissions)
    }

    async fn update(&self, permission: &Permission) -> AppResult<Option<Permission>> {
        self.table
            .replace_unique(permission.clone(), same_name)
            .await
            .map_err(|_| conflict_error("Permission", "name", &permission.name))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.table.remove(id).await)
    }

    async fn name_exists(&self, name: &str, exclude: Option<Uuid>) -> AppResult<bool> {
        let name = name.trim();
        Ok(self
            .table
            .count(|p| p.name == name && Some(p.id) != exclude)
            .await
            > 0)
    }

    async fn link(&self, role: Role, permission_id: Uuid) -> AppResult<bool> {
        let link = RolePermission { role, permission_id };
        let mut links = self.links.write().await;
        if links.contains(&link) {
            return Ok(false);
        }
        links.push(link);
        Ok(true)
    }

    async fn unlink(&self, role: Role, permission_id: Uuid) -> AppResult<bool> {
        let mut links = self.links.write().await;
        let before = links.len();
        links.retain(|l| !(l.role == role && l.permission_id == permission_id));
        Ok(links.len() != before)
    }

    async fn permissions_for_role(&self, role: Role) -> AppResult<Vec<Permission>> {
        let ids: Vec<Uuid> = self
            .links
            .read()
            .await
            .iter()
            .filter(|l| l.role == role)
            .map(|l| l.permission_id)
            .collect();

        let mut permissions = self.table.filter(|p| ids.contains(&p.id)).await;
        permissions.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(permissions)
    }

    async fn count_links(&self, permission_id: Uuid) -> AppResult<i64> {
        Ok(self
            .links
            .read()
            .await
            .iter()
            .filter(|l| l.permission_id == permission_id)
            .count() as i64)
    }
}
