//! Modelo de Item
//!
//! Repuestos y servicios facturables. `amount` no se acepta del cliente:
//! lo calcula `services::billing` al escribir.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::gst::GstRate;
use crate::services::billing;
use crate::utils::errors::AppResult;
use crate::utils::validation::{normalize_optional, validate_non_negative, validate_not_blank};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: Uuid,
    pub description: String,
    pub hsn_code: Option<String>,
    pub quantity: i32,
    pub rate: Decimal,
    #[sqlx(try_from = "i16")]
    pub gst_percent: GstRate,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    #[validate(length(max = 200), custom = "validate_not_blank")]
    pub description: String,

    #[validate(length(max = 20))]
    pub hsn_code: Option<String>,

    #[validate(range(min = 1))]
    pub quantity: i32,

    #[validate(custom = "validate_non_negative")]
    pub rate: Decimal,

    pub gst_percent: Option<GstRate>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    #[validate(length(max = 200), custom = "validate_not_blank")]
    pub description: Option<String>,

    #[validate(length(max = 20))]
    pub hsn_code: Option<String>,

    #[validate(range(min = 1))]
    pub quantity: Option<i32>,

    #[validate(custom = "validate_non_negative")]
    pub rate: Option<Decimal>,

    pub gst_percent: Option<GstRate>,
}

impl Item {
    pub fn new(request: CreateItemRequest) -> AppResult<Self> {
        let now = Utc::now();
        let mut item = Self {
            id: Uuid::new_v4(),
            description: request.description.trim().to_string(),
            hsn_code: normalize_optional(request.hsn_code),
            quantity: request.quantity,
            rate: request.rate,
            gst_percent: request.gst_percent.unwrap_or(GstRate::ZERO),
            amount: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        };
        item.recompute_amount()?;
        Ok(item)
    }

    pub fn apply_update(&mut self, request: UpdateItemRequest) -> AppResult<()> {
        if let Some(description) = request.description {
            self.description = description.trim().to_string();
        }
        if request.hsn_code.is_some() {
            self.hsn_code = normalize_optional(request.hsn_code);
        }
        if let Some(quantity) = request.quantity {
            self.quantity = quantity;
        }
        if let Some(rate) = request.rate {
            self.rate = rate;
        }
        if let Some(gst_percent) = request.gst_percent {
            self.gst_percent = gst_percent;
        }
        self.recompute_amount()?;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// amount = quantity × rate
    pub fn recompute_amount(&mut self) -> AppResult<()> {
        self.amount = billing::line_amount(self.quantity, self.rate)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    #[test]
    fn test_amount_is_computed_on_create_and_update() {
        let mut item = Item::new(CreateItemRequest {
            description: "Engine oil 1L".to_string(),
            hsn_code: Some("2710".to_string()),
            quantity: 4,
            rate: dec("450.25"),
            gst_percent: GstRate::new(18).ok(),
        })
        .unwrap();
        assert_eq!(item.amount, dec("1801.00"));

        item.apply_update(UpdateItemRequest {
            quantity: Some(2),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(item.amount, dec("900.50"));
    }

    #[test]
    fn test_quantity_and_rate_bounds() {
        let request = CreateItemRequest {
            description: "Brake pad".to_string(),
            hsn_code: None,
            quantity: 0,
            rate: dec("-1"),
            gst_percent: None,
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("quantity"));
        assert!(errors.field_errors().contains_key("rate"));
    }
}
