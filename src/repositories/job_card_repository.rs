use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::job_card::{JobCard, JobCardFilters, JobStatus};
use crate::repositories::db_error;
use crate::repositories::memory::MemoryTable;
use crate::utils::errors::AppResult;

#[async_trait]
pub trait JobCardRepository: Send + Sync {
    async fn create(&self, card: &JobCard) -> AppResult<JobCard>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<JobCard>>;
    async fn list(&self, filters: &JobCardFilters) -> AppResult<Vec<JobCard>>;
    /// Guarda los campos editables; `reminder_sent` nunca se toca aquí
    async fn update(&self, card: &JobCard) -> AppResult<Option<JobCard>>;
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
    async fn count_by_customer(&self, customer_id: Uuid) -> AppResult<i64>;
    async fn count_by_mechanic(&self, mechanic_id: Uuid) -> AppResult<i64>;
    async fn count_by_status(&self) -> AppResult<Vec<(JobStatus, i64)>>;
    /// Órdenes sin recordatorio con entrada en o antes de `cutoff`, más antiguas primero
    async fn find_reminder_candidates(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<JobCard>>;
    /// Marca el recordatorio solo si aún no estaba marcado; true si esta llamada lo marcó
    async fn mark_reminder_sent(&self, id: Uuid) -> AppResult<bool>;
}

pub struct PgJobCardRepository {
    pool: PgPool,
}

impl PgJobCardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobCardRepository for PgJobCardRepository {
    async fn create(&self, card: &JobCard) -> AppResult<JobCard> {
        sqlx::query_as::<_, JobCard>(
            r#"
            INSERT INTO job_cards (
                id, customer_id, vehicle_number, job_in_date, estimated_delivery, service_type,
                status, assigned_mechanic_id, km_in, job_description, reminder_sent,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, FALSE, $11, $12)
            RETURNING *
            "#,
        )
        .bind(card.id)
        .bind(card.customer_id)
        .bind(&card.vehicle_number)
        .bind(card.job_in_date)
        .bind(card.estimated_delivery)
        .bind(card.service_type)
        .bind(card.status)
        .bind(card.assigned_mechanic_id)
        .bind(card.km_in)
        .bind(&card.job_description)
        .bind(card.created_at)
        .bind(card.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Error creating job card", e))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<JobCard>> {
        sqlx::query_as::<_, JobCard>("SELECT * FROM job_cards WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Error finding job card", e))
    }

    async fn list(&self, filters: &JobCardFilters) -> AppResult<Vec<JobCard>> {
        sqlx::query_as::<_, JobCard>(
            r#"
            SELECT * FROM job_cards
            WHERE ($1::job_status IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR customer_id = $2)
              AND ($3::boolean IS NULL OR reminder_sent = $3)
            ORDER BY job_in_date DESC
            "#,
        )
        .bind(filters.status)
        .bind(filters.customer_id)
        .bind(filters.reminder_sent)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Error listing job cards", e))
    }

    async fn update(&self, card: &JobCard) -> AppResult<Option<JobCard>> {
        sqlx::query_as::<_, JobCard>(
            r#"
            UPDATE job_cards
            SET customer_id = $2, vehicle_number = $3, job_in_date = $4, estimated_delivery = $5,
                service_type = $6, status = $7, assigned_mechanic_id = $8, km_in = $9,
                job_description = $10, updated_at = $11
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(card.id)
        .bind(card.customer_id)
        .bind(&card.vehicle_number)
        .bind(card.job_in_date)
        .bind(card.estimated_delivery)
        .bind(card.service_type)
        .bind(card.status)
        .bind(card.assigned_mechanic_id)
        .bind(card.km_in)
        .bind(&card.job_description)
        .bind(card.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Error updating job card", e))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM job_cards WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Error deleting job card", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_by_customer(&self, customer_id: Uuid) -> AppResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM job_cards WHERE customer_id = $1")
            .bind(customer_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("Error counting job cards", e))?;

        Ok(count)
    }

    async fn count_by_mechanic(&self, mechanic_id: Uuid) -> AppResult<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM job_cards WHERE assigned_mechanic_id = $1")
                .bind(mechanic_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| db_error("Error counting job cards", e))?;

        Ok(count)
    }

    async fn count_by_status(&self) -> AppResult<Vec<(JobStatus, i64)>> {
        sqlx::query_as::<_, (JobStatus, i64)>(
            "SELECT status, COUNT(*) FROM job_cards GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Error counting job cards by status", e))
    }

    async fn find_reminder_candidates(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<JobCard>> {
        sqlx::query_as::<_, JobCard>(
            r#"
            SELECT * FROM job_cards
            WHERE reminder_sent = FALSE AND job_in_date <= $1
            ORDER BY job_in_date ASC
            "#,
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Error finding reminder candidates", e))
    }

    async fn mark_reminder_sent(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE job_cards SET reminder_sent = TRUE, updated_at = NOW() WHERE id = $1 AND reminder_sent = FALSE",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Error marking reminder", e))?;

        Ok(result.rows_affected() == 1)
    }
}

#[derive(Default)]
pub struct MemoryJobCardRepository {
    table: MemoryTable<JobCard>,
}

#[async_trait]
impl JobCardRepository for MemoryJobCardRepository {
    async fn create(&self, card: &JobCard) -> AppResult<JobCard> {
        let mut card = card.clone();
        card.reminder_sent = false;
        Ok(self.table.insert(card).await)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<JobCard>> {
        Ok(self.table.get(id).await)
    }

    async fn list(&self, filters: &JobCardFilters) -> AppResult<Vec<JobCard>> {
        let mut cards = self.table.filter(|c| filters.matches(c)).await;
        cards.sort_by(|a, b| b.job_in_date.cmp(&a.job_in_date));
        Ok(cards)
    }

    async fn update(&self, card: &JobCard) -> AppResult<Option<JobCard>> {
        let mut stored = None;
        let found = self
            .table
            .update_if(card.id, |current| {
                let reminder_sent = current.reminder_sent;
                *current = card.clone();
                current.reminder_sent = reminder_sent;
                stored = Some(current.clone());
                true
            })
            .await;

        Ok(if found { stored } else { None })
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.table.remove(id).await)
    }

    async fn count_by_customer(&self, customer_id: Uuid) -> AppResult<i64> {
        Ok(self.table.count(|c| c.customer_id == customer_id).await)
    }

    async fn count_by_mechanic(&self, mechanic_id: Uuid) -> AppResult<i64> {
        Ok(self
            .table
            .count(|c| c.assigned_mechanic_id == Some(mechanic_id))
            .await)
    }

    async fn count_by_status(&self) -> AppResult<Vec<(JobStatus, i64)>> {
        let mut counts = Vec::new();
        for status in JobStatus::ALL {
            let count = self.table.count(|c| c.status == status).await;
            if count > 0 {
                counts.push((status, count));
            }
        }
        Ok(counts)
    }

    async fn find_reminder_candidates(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<JobCard>> {
        let mut cards = self
            .table
            .filter(|c| !c.reminder_sent && c.job_in_date <= cutoff)
            .await;
        cards.sort_by(|a, b| a.job_in_date.cmp(&b.job_in_date));
        Ok(cards)
    }

    async fn mark_reminder_sent(&self, id: Uuid) -> AppResult<bool> {
        Ok(self
            .table
            .update_if(id, |card| {
                if card.reminder_sent {
                    return false;
                }
                card.reminder_sent = true;
                card.updated_at = Utc::now();
                true
            })
            .await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job_card::{CreateJobCardRequest, ServiceType};
    use chrono::Duration;

    fn card(days_ago: i64) -> JobCard {
        JobCard::new(CreateJobCardRequest {
            customer_id: Uuid::new_v4(),
            vehicle_number: "MH12AB1234".to_string(),
            job_in_date: Some(Utc::now() - Duration::days(days_ago)),
            estimated_delivery: None,
            service_type: ServiceType::OilChange,
            status: None,
            assigned_mechanic_id: None,
            km_in: None,
            job_description: None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_mark_reminder_sent_only_once() {
        let repo = MemoryJobCardRepository::default();
        let stored = repo.create(&card(120)).await.unwrap();
        assert!(repo.mark_reminder_sent(stored.id).await.unwrap());
        assert!(!repo.mark_reminder_sent(stored.id).await.unwrap());
        assert!(repo.find_reminder_candidates(Utc::now()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_preserves_reminder_flag() {
        let repo = MemoryJobCardRepository::default();
        let stored = repo.create(&card(120)).await.unwrap();
        repo.mark_reminder_sent(stored.id).await.unwrap();

        let mut edited = stored.clone();
        edited.status = JobStatus::Delivered;
        let updated = repo.update(&edited).await.unwrap().unwrap();
        assert!(updated.reminder_sent);
        assert_eq!(updated.status, JobStatus::Delivered);
    }

    #[tokio::test]
    async fn test_candidates_respect_cutoff() {
        let repo = MemoryJobCardRepository::default();
        let old = repo.create(&card(100)).await.unwrap();
        repo.create(&card(10)).await.unwrap();

        let cutoff = Utc::now() - Duration::days(90);
        let candidates = repo.find_reminder_candidates(cutoff).await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id, old.id);
    }
}
