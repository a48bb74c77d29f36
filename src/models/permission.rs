//! Modelos de Permission y Role-Permission
//!
//! Catálogo de permisos con nombre y su asignación a roles. La
//! autorización efectiva de la API la decide `services::access_policy`;
//! estos registros son administrables desde el panel de permisos.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::user::Role;
use crate::utils::validation::{normalize_optional, validate_not_blank};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub id: Uuid,
    pub name: String,
    pub active: bool,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Enlace rol ↔ permiso
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RolePermission {
    pub role: Role,
    pub permission_id: Uuid,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePermissionRequest {
    #[validate(length(max = 100), custom = "validate_not_blank")]
    pub name: String,

    pub active: Option<bool>,

    #[validate(length(max = 500))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePermissionRequest {
    #[validate(length(max = 100), custom = "validate_not_blank")]
    pub name: Option<String>,

    pub active: Option<bool>,

    #[validate(length(max = 500))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkPermissionRequest {
    pub permission_id: Uuid,
}

/// Permisos asignados a un rol
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RolePermissionsResponse {
    pub role: Role,
    pub permissions: Vec<Permission>,
}

impl Permission {
    pub fn new(request: CreatePermissionRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            active: request.active.unwrap_or(true),
            description: normalize_optional(request.description),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_update(&mut self, request: UpdatePermissionRequest) {
        if let Some(name) = request.name {
            self.name = name.trim().to_string();
        }
        if let Some(active) = request.active {
            self.active = active;
        }
        if request.description.is_some() {
            self.description = normalize_optional(request.description);
        }
        self.updated_at = Utc::now();
    }
}
