//! Modelo de Mechanic

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::utils::validation::validate_not_blank;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Mechanic {
    pub id: Uuid,
    pub name: String,
    pub specialty: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMechanicRequest {
    #[validate(length(max = 100), custom = "validate_not_blank")]
    pub name: String,

    #[validate(length(max = 100), custom = "validate_not_blank")]
    pub specialty: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMechanicRequest {
    #[validate(length(max = 100), custom = "validate_not_blank")]
    pub name: Option<String>,

    #[validate(length(max = 100), custom = "validate_not_blank")]
    pub specialty: Option<String>,
}

impl Mechanic {
    pub fn new(request: CreateMechanicRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            specialty: request.specialty.trim().to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_update(&mut self, request: UpdateMechanicRequest) {
        if let Some(name) = request.name {
            self.name = name.trim().to_string();
        }
        if let Some(specialty) = request.specialty {
            self.specialty = specialty.trim().to_string();
        }
        self.updated_at = Utc::now();
    }
}
