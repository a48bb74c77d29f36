use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::customer::{Customer, CustomerFilters, Vehicle};
use crate::repositories::memory::MemoryTable;
use crate::repositories::{db_error, like_pattern};
use crate::utils::errors::AppResult;

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn create(&self, customer: &Customer) -> AppResult<Customer>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Customer>>;
    async fn list(&self, filters: &CustomerFilters) -> AppResult<Vec<Customer>>;
    /// Guarda el cliente completo; None si ya no existe
    async fn update(&self, customer: &Customer) -> AppResult<Option<Customer>>;
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
    async fn count(&self) -> AppResult<i64>;
}

// Fila de customers: los vehículos viajan como JSONB
#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: Uuid,
    name: String,
    mobile: String,
    alternate_number: Option<String>,
    email: Option<String>,
    address: Option<String>,
    vehicles: Json<Vec<Vehicle>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            mobile: row.mobile,
            alternate_number: row.alternate_number,
            email: row.email,
            address: row.address,
            vehicles: row.vehicles.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub struct PgCustomerRepository {
    pool: PgPool,
}

impl PgCustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerRepository for PgCustomerRepository {
    async fn create(&self, customer: &Customer) -> AppResult<Customer> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r#"
            INSERT INTO customers (
                id, name, mobile, alternate_number, email, address, vehicles, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(customer.id)
        .bind(&customer.name)
        .bind(&customer.mobile)
        .bind(&customer.alternate_number)
        .bind(&customer.email)
        .bind(&customer.address)
        .bind(Json(&customer.vehicles))
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Error creating customer", e))?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Customer>> {
        let row = sqlx::query_as::<_, CustomerRow>("SELECT * FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Error finding customer", e))?;

        Ok(row.map(Customer::from))
    }

    async fn list(&self, filters: &CustomerFilters) -> AppResult<Vec<Customer>> {
        let search = filters
            .search
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(like_pattern);

        let rows = sqlx::query_as::<_, CustomerRow>(
            r#"
            SELECT * FROM customers
            WHERE $1::text IS NULL
               OR name ILIKE $1
               OR mobile ILIKE $1
               OR EXISTS (
                    SELECT 1 FROM jsonb_array_elements(vehicles) AS v
                    WHERE v->>'vehicleNumber' ILIKE $1
               )
            ORDER BY created_at DESC
            "#,
        )
        .bind(search)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Error listing customers", e))?;

        Ok(rows.into_iter().map(Customer::from).collect())
    }

    async fn update(&self, customer: &Customer) -> AppResult<Option<Customer>> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r#"
            UPDATE customers
            SET name = $2, mobile = $3, alternate_number = $4, email = $5, address = $6,
                vehicles = $7, updated_at = $8
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(customer.id)
        .bind(&customer.name)
        .bind(&customer.mobile)
        .bind(&customer.alternate_number)
        .bind(&customer.email)
        .bind(&customer.address)
        .bind(Json(&customer.vehicles))
        .bind(customer.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Error updating customer", e))?;

        Ok(row.map(Customer::from))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Error deleting customer", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> AppResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("Error counting customers", e))?;

        Ok(count)
    }
}

#[derive(Default)]
pub struct MemoryCustomerRepository {
    table: MemoryTable<Customer>,
}

#[async_trait]
impl CustomerRepository for MemoryCustomerRepository {
    async fn create(&self, customer: &Customer) -> AppResult<Customer> {
        Ok(self.table.insert(customer.clone()).await)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Customer>> {
        Ok(self.table.get(id).await)
    }

    async fn list(&self, filters: &CustomerFilters) -> AppResult<Vec<Customer>> {
        let search = filters.search.clone().unwrap_or_default();
        Ok(self.table.filter(|c| c.matches_search(&search)).await)
    }

    async fn update(&self, customer: &Customer) -> AppResult<Option<Customer>> {
        Ok(self.table.replace(customer.clone()).await)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.table.remove(id).await)
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.table.count(|_| true).await)
    }
}
