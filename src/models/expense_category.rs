//! Modelo de Expense Category

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::utils::validation::{validate_hex_color, validate_not_blank};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseCategory {
    pub id: Uuid,
    pub name: String,
    /// Clave estable usada por el UI (por defecto, el nombre en minúsculas)
    pub value: String,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpenseCategoryRequest {
    #[validate(length(max = 100), custom = "validate_not_blank")]
    pub name: String,

    #[validate(length(max = 100))]
    pub value: Option<String>,

    #[validate(custom = "validate_hex_color")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExpenseCategoryRequest {
    #[validate(length(max = 100), custom = "validate_not_blank")]
    pub name: Option<String>,

    #[validate(length(max = 100))]
    pub value: Option<String>,

    #[validate(custom = "validate_hex_color")]
    pub color: Option<String>,
}

impl ExpenseCategory {
    pub fn new(request: CreateExpenseCategoryRequest) -> Self {
        let now = Utc::now();
        let name = request.name.trim().to_string();
        let value = request
            .value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| slug(&name));

        Self {
            id: Uuid::new_v4(),
            name,
            value,
            color: request.color.map(|c| c.trim().to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_update(&mut self, request: UpdateExpenseCategoryRequest) {
        if let Some(name) = request.name {
            self.name = name.trim().to_string();
        }
        if let Some(value) = request.value {
            let value = value.trim();
            self.value = if value.is_empty() { slug(&self.name) } else { value.to_string() };
        }
        if let Some(color) = request.color {
            self.color = Some(color.trim().to_string());
        }
        self.updated_at = Utc::now();
    }
}

fn slug(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_defaults_to_slug() {
        let category = ExpenseCategory::new(CreateExpenseCategoryRequest {
            name: " Spare Parts ".to_string(),
            value: None,
            color: Some("#FF8800".to_string()),
        });
        assert_eq!(category.name, "Spare Parts");
        assert_eq!(category.value, "spare_parts");
    }

    #[test]
    fn test_bad_color_fails_validation() {
        let request = CreateExpenseCategoryRequest {
            name: "Rent".to_string(),
            value: None,
            color: Some("orange".to_string()),
        };
        assert!(request.validate().is_err());
    }
}
