//! Modelo de User
//!
//! Usuarios del taller con su rol. La contraseña solo existe como hash
//! bcrypt y nunca se serializa hacia la API.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::utils::validation::{normalize_email, normalize_optional, validate_not_blank, validate_phone};

/// Roles del sistema - mapea al ENUM user_role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Mechanic,
    User,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Mechanic, Role::User];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Mechanic => "mechanic",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "mechanic" => Ok(Role::Mechanic),
            "user" => Ok(Role::User),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// User almacenado
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub role: Role,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Construye el usuario; el hash se calcula antes en el controlador
    pub fn new(request: CreateUserRequest, password_hash: String, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            full_name: request.full_name.trim().to_string(),
            email: normalize_email(&request.email),
            password_hash,
            phone: normalize_optional(request.phone),
            role,
            profile_picture: normalize_optional(request.profile_picture),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Request para crear un nuevo usuario (registro o alta por admin)
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(length(max = 100), custom = "validate_not_blank")]
    pub full_name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 6, max = 100))]
    pub password: String,

    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,

    pub role: Option<Role>,

    pub profile_picture: Option<String>,
}

/// Request para actualizar un usuario existente
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(length(max = 100), custom = "validate_not_blank")]
    pub full_name: Option<String>,

    #[validate(email)]
    pub email: Option<String>,

    #[validate(length(min = 6, max = 100))]
    pub password: Option<String>,

    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,

    pub role: Option<Role>,

    pub profile_picture: Option<String>,
}

/// Response de usuario para la API (sin hash)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            phone: user.phone,
            role: user.role,
            profile_picture: user.profile_picture,
            created_at: user.created_at,
        }
    }
}

/// Filtros para búsqueda de usuarios
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserFilters {
    pub role: Option<Role>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("mechanic".parse::<Role>().unwrap(), Role::Mechanic);
        assert!("manager".parse::<Role>().is_err());
    }

    #[test]
    fn test_response_has_no_password_field() {
        let request = CreateUserRequest {
            full_name: "Ravi Kumar".to_string(),
            email: " Ravi@Garage.in ".to_string(),
            password: "Secret123".to_string(),
            phone: None,
            role: None,
            profile_picture: None,
        };
        let user = User::new(request, "$2b$04$hash".to_string(), Role::User);
        assert_eq!(user.email, "ravi@garage.in");

        let json = serde_json::to_value(UserResponse::from(user)).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["role"], "user");
    }

    #[test]
    fn test_create_request_validation() {
        let request = CreateUserRequest {
            full_name: " ".to_string(),
            email: "not-an-email".to_string(),
            password: "123".to_string(),
            phone: Some("12".to_string()),
            role: None,
            profile_picture: None,
        };
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        for field in ["full_name", "email", "password", "phone"] {
            assert!(fields.contains_key(field), "missing error for {}", field);
        }
    }
}
