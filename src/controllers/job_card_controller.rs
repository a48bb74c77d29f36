use std::collections::HashMap;

use uuid::Uuid;
use validator::Validate;

use crate::dto::api_response::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::customer::Customer;
use crate::models::job_card::{
    CreateJobCardRequest, JobCard, JobCardFilters, JobCardView, UpdateJobCardRequest,
};
use crate::models::mechanic::Mechanic;
use crate::repositories::Repositories;
use crate::services::access_policy::{authorize, Action, Feature};
use crate::utils::errors::{not_found_error, validation_error, AppResult};

pub struct JobCardController {
    repos: Repositories,
}

impl JobCardController {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        request: CreateJobCardRequest,
    ) -> AppResult<ApiResponse<JobCardView>> {
        authorize(user.role, Feature::JobCards, Action::Write)?;
        request.validate()?;

        let card = JobCard::new(request)?;
        self.check_references(&card).await?;

        let card = self.repos.job_cards.create(&card).await?;
        log::info!("📋 Orden creada: {} para {}", card.id, card.vehicle_number);

        let view = self.expand(card).await?;
        Ok(ApiResponse::success_with_message(view, "Job card created successfully"))
    }

    /// Lista con cliente y mecánico expandidos
    pub async fn list(
        &self,
        user: &AuthenticatedUser,
        filters: JobCardFilters,
    ) -> AppResult<Vec<JobCardView>> {
        authorize(user.role, Feature::JobCards, Action::Read)?;

        let cards = self.repos.job_cards.list(&filters).await?;
        let mut customers: HashMap<Uuid, Option<Customer>> = HashMap::new();
        let mut mechanics: HashMap<Uuid, Option<Mechanic>> = HashMap::new();
        let mut views = Vec::with_capacity(cards.len());

        for card in cards {
            if !customers.contains_key(&card.customer_id) {
                let customer = self.repos.customers.find_by_id(card.customer_id).await?;
                customers.insert(card.customer_id, customer);
            }
            let customer = customers.get(&card.customer_id).cloned().flatten();

            let assigned_mechanic = match card.assigned_mechanic_id {
                Some(mechanic_id) => {
                    if !mechanics.contains_key(&mechanic_id) {
                        let mechanic = self.repos.mechanics.find_by_id(mechanic_id).await?;
                        mechanics.insert(mechanic_id, mechanic);
                    }
                    mechanics.get(&mechanic_id).cloned().flatten()
                }
                None => None,
            };

            views.push(JobCardView {
                job_card: card,
                customer,
                assigned_mechanic,
            });
        }

        Ok(views)
    }

    pub async fn get(&self, user: &AuthenticatedUser, id: Uuid) -> AppResult<JobCardView> {
        authorize(user.role, Feature::JobCards, Action::Read)?;
        let card = self.find(id).await?;
        self.expand(card).await
    }

    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        request: UpdateJobCardRequest,
    ) -> AppResult<ApiResponse<JobCardView>> {
        authorize(user.role, Feature::JobCards, Action::Write)?;
        request.validate()?;

        let mut card = self.find(id).await?;
        card.apply_update(request)?;
        self.check_references(&card).await?;

        let card = self
            .repos
            .job_cards
            .update(&card)
            .await?
            .ok_or_else(|| not_found_error("Job card", &id.to_string()))?;

        let view = self.expand(card).await?;
        Ok(ApiResponse::success_with_message(view, "Job card updated successfully"))
    }

    pub async fn delete(&self, user: &AuthenticatedUser, id: Uuid) -> AppResult<ApiResponse<()>> {
        authorize(user.role, Feature::JobCards, Action::Delete)?;
        if !self.repos.job_cards.delete(id).await? {
            return Err(not_found_error("Job card", &id.to_string()));
        }
        log::info!("🗑️ Orden eliminada: {}", id);
        Ok(ApiResponse::message("Job card deleted successfully"))
    }

    async fn check_references(&self, card: &JobCard) -> AppResult<()> {
        let customer = self
            .repos
            .customers
            .find_by_id(card.customer_id)
            .await?
            .ok_or_else(|| validation_error("customer_id", "Customer does not exist"))?;
        if !customer.has_vehicle_number(&card.vehicle_number) {
            return Err(validation_error(
                "vehicle_number",
                "Vehicle is not registered for the selected customer",
            ));
        }
        if let Some(mechanic_id) = card.assigned_mechanic_id {
            if self.repos.mechanics.find_by_id(mechanic_id).await?.is_none() {
                return Err(validation_error("assigned_mechanic_id", "Mechanic does not exist"));
            }
        }
        Ok(())
    }

    async fn expand(&self, card: JobCard) -> AppResult<JobCardView> {
        let customer = self.repos.customers.find_by_id(card.customer_id).await?;
        let assigned_mechanic = match card.assigned_mechanic_id {
            Some(mechanic_id) => self.repos.mechanics.find_by_id(mechanic_id).await?,
            None => None,
        };
        Ok(JobCardView {
            job_card: card,
            customer,
            assigned_mechanic,
        })
    }

    async fn find(&self, id: Uuid) -> AppResult<JobCard> {
        self.repos
            .job_cards
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Job card", &id.to_string()))
    }
}
