use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::user::{Role, UserResponse};
use crate::services::access_policy::FeatureAccess;

// Login request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

// Login response: token + usuario público
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub user: UserResponse,
}

impl LoginResponse {
    pub fn bearer(token: String, expires_in: u64, user: UserResponse) -> Self {
        Self {
            token,
            token_type: "Bearer".to_string(),
            expires_in,
            user,
        }
    }
}

// Lo que el rol del usuario puede hacer; el UI lo usa para su navegación
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessResponse {
    pub role: Role,
    pub features: Vec<FeatureAccess>,
}
