use uuid::Uuid;
use validator::Validate;

use crate::dto::api_response::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::mechanic::{CreateMechanicRequest, Mechanic, UpdateMechanicRequest};
use crate::repositories::Repositories;
use crate::services::access_policy::{authorize, Action, Feature};
use crate::utils::errors::{not_found_error, AppError, AppResult};

pub struct MechanicController {
    repos: Repositories,
}

impl MechanicController {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        request: CreateMechanicRequest,
    ) -> AppResult<ApiResponse<Mechanic>> {
        authorize(user.role, Feature::Mechanics, Action::Write)?;
        request.validate()?;

        let mechanic = self.repos.mechanics.create(&Mechanic::new(request)).await?;
        log::info!("🔧 Mecánico creado: {}", mechanic.name);
        Ok(ApiResponse::success_with_message(mechanic, "Mechanic created successfully"))
    }

    pub async fn list(&self, user: &AuthenticatedUser) -> AppResult<Vec<Mechanic>> {
        authorize(user.role, Feature::Mechanics, Action::Read)?;
        self.repos.mechanics.list().await
    }

    pub async fn get(&self, user: &AuthenticatedUser, id: Uuid) -> AppResult<Mechanic> {
        authorize(user.role, Feature::Mechanics, Action::Read)?;
        self.find(id).await
    }

    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        request: UpdateMechanicRequest,
    ) -> AppResult<ApiResponse<Mechanic>> {
        authorize(user.role, Feature::Mechanics, Action::Write)?;
        request.validate()?;

        let mut mechanic = self.find(id).await?;
        mechanic.apply_update(request);
        let mechanic = self
            .repos
            .mechanics
            .update(&mechanic)
            .await?
            .ok_or_else(|| not_found_error("Mechanic", &id.to_string()))?;

        Ok(ApiResponse::success_with_message(mechanic, "Mechanic updated successfully"))
    }

    pub async fn delete(&self, user: &AuthenticatedUser, id: Uuid) -> AppResult<ApiResponse<()>> {
        authorize(user.role, Feature::Mechanics, Action::Delete)?;
        self.find(id).await?;

        let assigned = self.repos.job_cards.count_by_mechanic(id).await?;
        if assigned > 0 {
            return Err(AppError::Conflict(format!(
                "Mechanic is assigned to {} job card(s)",
                assigned
            )));
        }

        if !self.repos.mechanics.delete(id).await? {
            return Err(not_found_error("Mechanic", &id.to_string()));
        }
        Ok(ApiResponse::message("Mechanic deleted successfully"))
    }

    async fn find(&self, id: Uuid) -> AppResult<Mechanic> {
        self.repos
            .mechanics
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Mechanic", &id.to_string()))
    }
}
