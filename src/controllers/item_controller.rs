use uuid::Uuid;
use validator::Validate;

use crate::dto::api_response::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::item::{CreateItemRequest, Item, UpdateItemRequest};
use crate::repositories::Repositories;
use crate::services::access_policy::{authorize, Action, Feature};
use crate::utils::errors::{not_found_error, AppError, AppResult};

pub struct ItemController {
    repos: Repositories,
}

impl ItemController {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        request: CreateItemRequest,
    ) -> AppResult<ApiResponse<Item>> {
        authorize(user.role, Feature::Items, Action::Write)?;
        request.validate()?;

        let item = self.repos.items.create(&Item::new(request)?).await?;
        Ok(ApiResponse::success_with_message(item, "Item created successfully"))
    }

    pub async fn list(&self, user: &AuthenticatedUser) -> AppResult<Vec<Item>> {
        authorize(user.role, Feature::Items, Action::Read)?;
        self.repos.items.list().await
    }

    pub async fn get(&self, user: &AuthenticatedUser, id: Uuid) -> AppResult<Item> {
        authorize(user.role, Feature::Items, Action::Read)?;
        self.find(id).await
    }

    /// El importe se recalcula en cada actualización
    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        request: UpdateItemRequest,
    ) -> AppResult<ApiResponse<Item>> {
        authorize(user.role, Feature::Items, Action::Write)?;
        request.validate()?;

        let mut item = self.find(id).await?;
        item.apply_update(request)?;
        let item = self
            .repos
            .items
            .update(&item)
            .await?
            .ok_or_else(|| not_found_error("Item", &id.to_string()))?;

        Ok(ApiResponse::success_with_message(item, "Item updated successfully"))
    }

    pub async fn delete(&self, user: &AuthenticatedUser, id: Uuid) -> AppResult<ApiResponse<()>> {
        authorize(user.role, Feature::Items, Action::Delete)?;
        self.find(id).await?;

        let bills = self.repos.gst_bills.count_by_item(id).await?
            + self.repos.non_gst_bills.count_by_item(id).await?;
        if bills > 0 {
            return Err(AppError::Conflict(format!("Item is referenced by {} bill(s)", bills)));
        }

        if !self.repos.items.delete(id).await? {
            return Err(not_found_error("Item", &id.to_string()));
        }
        Ok(ApiResponse::message("Item deleted successfully"))
    }

    async fn find(&self, id: Uuid) -> AppResult<Item> {
        self.repos
            .items
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Item", &id.to_string()))
    }
}
