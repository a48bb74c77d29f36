use uuid::Uuid;
use validator::Validate;

use crate::dto::api_response::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::permission::{
    CreatePermissionRequest, LinkPermissionRequest, Permission, RolePermissionsResponse,
    UpdatePermissionRequest,
};
use crate::models::user::Role;
use crate::repositories::Repositories;
use crate::services::access_policy::{authorize, Action, Feature};
use crate::utils::errors::{conflict_error, not_found_error, validation_error, AppError, AppResult};

pub struct PermissionController {
    repos: Repositories,
}

impl PermissionController {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        request: CreatePermissionRequest,
    ) -> AppResult<ApiResponse<Permission>> {
        authorize(user.role, Feature::Permissions, Action::Write)?;
        request.validate()?;

        if self.repos.permissions.name_exists(&request.name, None).await? {
            return Err(conflict_error("Permission", "name", request.name.trim()));
        }

        let permission = self.repos.permissions.create(&Permission::new(request)).await?;
        Ok(ApiResponse::success_with_message(permission, "Permission created successfully"))
    }

    pub async fn list(&self, user: &AuthenticatedUser) -> AppResult<Vec<Permission>> {
        authorize(user.role, Feature::Permissions, Action::Read)?;
        self.repos.permissions.list().await
    }

    pub async fn get(&self, user: &AuthenticatedUser, id: Uuid) -> AppResult<Permission> {
        authorize(user.role, Feature::Permissions, Action::Read)?;
        self.find(id).await
    }

    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        request: UpdatePermissionRequest,
    ) -> AppResult<ApiResponse<Permission>> {
        authorize(user.role, Feature::Permissions, Action::Write)?;
        request.validate()?;

        if let Some(name) = &request.name {
            if self.repos.permissions.name_exists(name, Some(id)).await? {
                return Err(conflict_error("Permission", "name", name.trim()));
            }
        }

        let mut permission = self.find(id).await?;
        permission.apply_update(request);
        let permission = self
            .repos
            .permissions
            .update(&permission)
            .await?
            .ok_or_else(|| not_found_error("Permission", &id.to_string()))?;

        Ok(ApiResponse::success_with_message(permission, "Permission updated successfully"))
    }

    /// Un permiso enlazado a algún rol no se puede borrar
    pub async fn delete(&self, user: &AuthenticatedUser, id: Uuid) -> AppResult<ApiResponse<()>> {
        authorize(user.role, Feature::Permissions, Action::Delete)?;
        self.find(id).await?;

        let links = self.repos.permissions.count_links(id).await?;
        if links > 0 {
            return Err(AppError::Conflict(format!(
                "Permission is linked to {} role(s)",
                links
            )));
        }

        if !self.repos.permissions.delete(id).await? {
            return Err(not_found_error("Permission", &id.to_string()));
        }
        Ok(ApiResponse::message("Permission deleted successfully"))
    }

    pub async fn role_permissions(
        &self,
        user: &AuthenticatedUser,
        role: Role,
    ) -> AppResult<RolePermissionsResponse> {
        authorize(user.role, Feature::Permissions, Action::Read)?;
        let permissions = self.repos.permissions.permissions_for_role(role).await?;
        Ok(RolePermissionsResponse { role, permissions })
    }

    pub async fn link(
        &self,
        user: &AuthenticatedUser,
        role: Role,
        request: LinkPermissionRequest,
    ) -> AppResult<ApiResponse<RolePermissionsResponse>> {
        authorize(user.role, Feature::Permissions, Action::Write)?;

        if self.repos.permissions.find_by_id(request.permission_id).await?.is_none() {
            return Err(validation_error("permission_id", "Permission does not exist"));
        }
        if !self.repos.permissions.link(role, request.permission_id).await? {
            return Err(AppError::Conflict(format!(
                "Permission '{}' is already linked to role '{}'",
                request.permission_id, role
            )));
        }

        log::info!("🔗 Permiso {} enlazado al rol {}", request.permission_id, role);
        let permissions = self.repos.permissions.permissions_for_role(role).await?;
        Ok(ApiResponse::success_with_message(
            RolePermissionsResponse { role, permissions },
            "Permission linked successfully",
        ))
    }

    pub async fn unlink(
        &self,
        user: &AuthenticatedUser,
        role: Role,
        permission_id: Uuid,
    ) -> AppResult<ApiResponse<()>> {
        authorize(user.role, Feature::Permissions, Action::Delete)?;
        if !self.repos.permissions.unlink(role, permission_id).await? {
            return Err(AppError::NotFound(format!(
                "Permission '{}' is not linked to role '{}'",
                permission_id, role
            )));
        }
        Ok(ApiResponse::message("Permission unlinked successfully"))
    }

    async fn find(&self, id: Uuid) -> AppResult<Permission> {
        self.repos
            .permissions
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Permission", &id.to_string()))
    }
}
