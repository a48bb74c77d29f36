use validator::Validate;

use crate::dto::api_response::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::garage::{CreateGarageRequest, GarageProfile, UpdateGarageRequest};
use crate::repositories::Repositories;
use crate::services::access_policy::{authorize, Action, Feature};
use crate::utils::errors::{AppError, AppResult};

/// Perfil del taller del usuario autenticado
pub struct GarageController {
    repos: Repositories,
}

impl GarageController {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Quien no tiene perfil propio ve el del taller
    pub async fn get(&self, user: &AuthenticatedUser) -> AppResult<GarageProfile> {
        authorize(user.role, Feature::GarageProfile, Action::Read)?;
        match self.repos.garages.find_by_user(user.user_id).await? {
            Some(profile) => Ok(profile),
            None => self
                .repos
                .garages
                .find_first()
                .await?
                .ok_or_else(|| AppError::NotFound("Garage profile not found".to_string())),
        }
    }

    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        request: CreateGarageRequest,
    ) -> AppResult<ApiResponse<GarageProfile>> {
        authorize(user.role, Feature::GarageProfile, Action::Write)?;
        request.validate()?;

        let profile = self
            .repos
            .garages
            .create(&GarageProfile::new(user.user_id, request))
            .await?;

        log::info!("🏪 Perfil de taller creado: {}", profile.garage_name);
        Ok(ApiResponse::success_with_message(profile, "Garage profile created successfully"))
    }

    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        request: UpdateGarageRequest,
    ) -> AppResult<ApiResponse<GarageProfile>> {
        authorize(user.role, Feature::GarageProfile, Action::Write)?;
        request.validate()?;

        let mut profile = self.own(user).await?;
        profile.apply_update(request);
        let profile = self
            .repos
            .garages
            .update(&profile)
            .await?
            .ok_or_else(|| AppError::NotFound("Garage profile not found".to_string()))?;

        Ok(ApiResponse::success_with_message(profile, "Garage profile updated successfully"))
    }

    pub async fn delete(&self, user: &AuthenticatedUser) -> AppResult<ApiResponse<()>> {
        authorize(user.role, Feature::GarageProfile, Action::Delete)?;
        if !self.repos.garages.delete_by_user(user.user_id).await? {
            return Err(AppError::NotFound("Garage profile not found".to_string()));
        }
        Ok(ApiResponse::message("Garage profile deleted successfully"))
    }

    async fn own(&self, user: &AuthenticatedUser) -> AppResult<GarageProfile> {
        self.repos
            .garages
            .find_by_user(user.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Garage profile not found".to_string()))
    }
}
