use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::gst_bill::BillFilters;
use crate::models::non_gst_bill::{GarageSnapshot, NonGstBill};
use crate::repositories::db_error;
use crate::repositories::memory::MemoryTable;
use crate::utils::errors::{conflict_error, AppResult};

#[async_trait]
pub trait NonGstBillRepository: Send + Sync {
    /// Falla con Conflict si el número de factura ya existe
    async fn create(&self, bill: &NonGstBill) -> AppResult<NonGstBill>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<NonGstBill>>;
    async fn list(&self, filters: &BillFilters) -> AppResult<Vec<NonGstBill>>;
    /// Solo persiste las notas
    async fn update(&self, bill: &NonGstBill) -> AppResult<Option<NonGstBill>>;
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
    async fn invoice_no_exists(&self, invoice_no: &str) -> AppResult<bool>;
    async fn invoice_numbers(&self, prefix: &str) -> AppResult<Vec<String>>;
    async fn count_by_customer(&self, customer_id: Uuid) -> AppResult<i64>;
    async fn count_by_item(&self, item_id: Uuid) -> AppResult<i64>;
    async fn total_revenue(&self) -> AppResult<Decimal>;
}

#[derive(Debug, sqlx::FromRow)]
struct NonGstBillRow {
    id: Uuid,
    customer_id: Uuid,
    vehicle_id: Uuid,
    invoice_no: String,
    invoice_date: NaiveDate,
    item_ids: Vec<Uuid>,
    mechanic_charge: Decimal,
    total_amount: Decimal,
    additional_notes: Option<String>,
    garage: Json<GarageSnapshot>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<NonGstBillRow> for NonGstBill {
    fn from(row: NonGstBillRow) -> Self {
        Self {
            id: row.id,
            customer_id: row.customer_id,
            vehicle_id: row.vehicle_id,
            invoice_no: row.invoice_no,
            invoice_date: row.invoice_date,
            item_ids: row.item_ids,
            mechanic_charge: row.mechanic_charge,
            total_amount: row.total_amount,
            additional_notes: row.additional_notes,
            garage: row.garage.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub struct PgNonGstBillRepository {
    pool: PgPool,
}

impl PgNonGstBillRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NonGstBillRepository for PgNonGstBillRepository {
    async fn create(&self, bill: &NonGstBill) -> AppResult<NonGstBill> {
        let row = sqlx::query_as::<_, NonGstBillRow>(
            r#"
            INSERT INTO non_gst_bills (
                id, customer_id, vehicle_id, invoice_no, invoice_date, item_ids, mechanic_charge,
                total_amount, additional_notes, garage, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(bill.id)
        .bind(bill.customer_id)
        .bind(bill.vehicle_id)
        .bind(&bill.invoice_no)
        .bind(bill.invoice_date)
        .bind(&bill.item_ids)
        .bind(bill.mechanic_charge)
        .bind(bill.total_amount)
        .bind(&bill.additional_notes)
        .bind(Json(&bill.garage))
        .bind(bill.created_at)
        .bind(bill.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Error creating non-GST bill", e))?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<NonGstBill>> {
        let row = sqlx::query_as::<_, NonGstBillRow>("SELECT * FROM non_gst_bills WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Error finding non-GST bill", e))?;

        Ok(row.map(NonGstBill::from))
    }

    async fn list(&self, filters: &BillFilters) -> AppResult<Vec<NonGstBill>> {
        let rows = sqlx::query_as::<_, NonGstBillRow>(
            r#"
            SELECT * FROM non_gst_bills
            WHERE ($1::uuid IS NULL OR customer_id = $1)
              AND ($2::date IS NULL OR invoice_date >= $2)
              AND ($3::date IS NULL OR invoice_date <= $3)
            ORDER BY invoice_date DESC, created_at DESC
            "#,
        )
        .bind(filters.customer_id)
        .bind(filters.from)
        .bind(filters.to)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Error listing non-GST bills", e))?;

        Ok(rows.into_iter().map(NonGstBill::from).collect())
    }

    async fn update(&self, bill: &NonGstBill) -> AppResult<Option<NonGstBill>> {
        let row = sqlx::query_as::<_, NonGstBillRow>(
            "UPDATE non_gst_bills SET additional_notes = $2, updated_at = $3 WHERE id = $1 RETURNING *",
        )
        .bind(bill.id)
        .bind(&bill.additional_notes)
        .bind(bill.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Error updating non-GST bill", e))?;

        Ok(row.map(NonGstBill::from))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM non_gst_bills WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Error deleting non-GST bill", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn invoice_no_exists(&self, invoice_no: &str) -> AppResult<bool> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM non_gst_bills WHERE invoice_no = $1)")
                .bind(invoice_no)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| db_error("Error checking invoice number", e))?;

        Ok(exists)
    }

    async fn invoice_numbers(&self, prefix: &str) -> AppResult<Vec<String>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT invoice_no FROM non_gst_bills WHERE invoice_no LIKE $1 || '-%'")
                .bind(prefix)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| db_error("Error listing invoice numbers", e))?;

        Ok(rows.into_iter().map(|(no,)| no).collect())
    }

    async fn count_by_customer(&self, customer_id: Uuid) -> AppResult<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM non_gst_bills WHERE customer_id = $1")
                .bind(customer_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| db_error("Error counting non-GST bills", e))?;

        Ok(count)
    }

    async fn count_by_item(&self, item_id: Uuid) -> AppResult<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM non_gst_bills WHERE $1 = ANY(item_ids)")
                .bind(item_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| db_error("Error counting non-GST bills", e))?;

        Ok(count)
    }

    async fn total_revenue(&self) -> AppResult<Decimal> {
        let (total,): (Decimal,) =
            sqlx::query_as("SELECT COALESCE(SUM(total_amount), 0) FROM non_gst_bills")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| db_error("Error summing non-GST bills", e))?;

        Ok(total)
    }
}

#[derive(Default)]
pub struct MemoryNonGstBillRepository {
    table: MemoryTable<NonGstBill>,
}

#[async_trait]
impl NonGstBillRepository for MemoryNonGstBillRepository {
    async fn create(&self, bill: &NonGstBill) -> AppResult<NonGstBill> {
        self.table
            .insert_unique(bill.clone(), |a, b| a.invoice_no == b.invoice_no)
            .await
            .ok_or_else(|| conflict_error("Non-GST bill", "invoice number", &bill.invoice_no))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<NonGstBill>> {
        Ok(self.table.get(id).await)
    }

    async fn list(&self, filters: &BillFilters) -> AppResult<Vec<NonGstBill>> {
        let mut bills = self
            .table
            .filter(|b| filters.matches(b.customer_id, b.invoice_date))
            .await;
        bills.sort_by(|a, b| b.invoice_date.cmp(&a.invoice_date));
        Ok(bills)
    }

    async fn update(&self, bill: &NonGstBill) -> AppResult<Option<NonGstBill>> {
        let mut stored = None;
        self.table
            .update_if(bill.id, |current| {
                current.additional_notes = bill.additional_notes.clone();
                current.updated_at = bill.updated_at;
                stored = Some(current.clone());
                true
            })
            .await;
        Ok(stored)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.table.remove(id).await)
    }

    async fn invoice_no_exists(&self, invoice_no: &str) -> AppResult<bool> {
        Ok(self.table.count(|b| b.invoice_no == invoice_no).await > 0)
    }

    async fn invoice_numbers(&self, prefix: &str) -> AppResult<Vec<String>> {
        let marker = format!("{}-", prefix);
        Ok(self
            .table
            .filter(|b| b.invoice_no.starts_with(&marker))
            .await
            .into_iter()
            .map(|b| b.invoice_no)
            .collect())
    }

    async fn count_by_customer(&self, customer_id: Uuid) -> AppResult<i64> {
        Ok(self.table.count(|b| b.customer_id == customer_id).await)
    }

    async fn count_by_item(&self, item_id: Uuid) -> AppResult<i64> {
        Ok(self.table.count(|b| b.item_ids.contains(&item_id)).await)
    }

    async fn total_revenue(&self) -> AppResult<Decimal> {
        Ok(self
            .table
            .filter(|_| true)
            .await
            .iter()
            .map(|b| b.total_amount)
            .sum())
    }
}
