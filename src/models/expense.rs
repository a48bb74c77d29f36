//! Modelo de Expense

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::utils::validation::{normalize_optional, validate_non_negative, validate_not_blank};

/// Forma de pago - mapea al ENUM payment_mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_mode", rename_all = "snake_case")]
pub enum PaymentMode {
    Cash,
    #[serde(rename = "Bank Transfer")]
    BankTransfer,
    #[serde(rename = "UPI")]
    Upi,
    Cheque,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: Uuid,
    pub date: NaiveDate,
    /// Categoría del gasto (nombre de una Expense Category o texto libre)
    #[serde(rename = "type")]
    pub expense_type: String,
    pub amount: Decimal,
    pub description: Option<String>,
    pub paid_to: String,
    pub payment_mode: PaymentMode,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpenseRequest {
    pub date: NaiveDate,

    #[serde(rename = "type")]
    #[validate(length(max = 100), custom = "validate_not_blank")]
    pub expense_type: String,

    #[validate(custom = "validate_non_negative")]
    pub amount: Decimal,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    #[validate(length(max = 150), custom = "validate_not_blank")]
    pub paid_to: String,

    pub payment_mode: PaymentMode,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExpenseRequest {
    pub date: Option<NaiveDate>,

    #[serde(rename = "type")]
    #[validate(length(max = 100), custom = "validate_not_blank")]
    pub expense_type: Option<String>,

    #[validate(custom = "validate_non_negative")]
    pub amount: Option<Decimal>,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    #[validate(length(max = 150), custom = "validate_not_blank")]
    pub paid_to: Option<String>,

    pub payment_mode: Option<PaymentMode>,
}

/// Filtros para listados de gastos
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseFilters {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    #[serde(rename = "type")]
    pub expense_type: Option<String>,
    pub payment_mode: Option<PaymentMode>,
}

impl ExpenseFilters {
    pub fn matches(&self, expense: &Expense) -> bool {
        self.from.map_or(true, |from| expense.date >= from)
            && self.to.map_or(true, |to| expense.date <= to)
            && self
                .expense_type
                .as_deref()
                .map_or(true, |t| expense.expense_type.eq_ignore_ascii_case(t.trim()))
            && self.payment_mode.map_or(true, |m| expense.payment_mode == m)
    }
}

impl Expense {
    pub fn new(created_by: Uuid, request: CreateExpenseRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            date: request.date,
            expense_type: request.expense_type.trim().to_string(),
            amount: request.amount,
            description: normalize_optional(request.description),
            paid_to: request.paid_to.trim().to_string(),
            payment_mode: request.payment_mode,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_update(&mut self, request: UpdateExpenseRequest) {
        if let Some(date) = request.date {
            self.date = date;
        }
        if let Some(expense_type) = request.expense_type {
            self.expense_type = expense_type.trim().to_string();
        }
        if let Some(amount) = request.amount {
            self.amount = amount;
        }
        if request.description.is_some() {
            self.description = normalize_optional(request.description);
        }
        if let Some(paid_to) = request.paid_to {
            self.paid_to = paid_to.trim().to_string();
        }
        if let Some(payment_mode) = request.payment_mode {
            self.payment_mode = payment_mode;
        }
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_format_uses_type_and_mode_labels() {
        let request: CreateExpenseRequest = serde_json::from_value(json!({
            "date": "2024-03-01",
            "type": "Rent",
            "amount": "15000.00",
            "paidTo": "Landlord",
            "paymentMode": "Bank Transfer"
        }))
        .unwrap();
        assert!(request.validate().is_ok());

        let expense = Expense::new(Uuid::new_v4(), request);
        let value = serde_json::to_value(&expense).unwrap();
        assert_eq!(value["type"], "Rent");
        assert_eq!(value["paymentMode"], "Bank Transfer");
        assert_eq!(value["paidTo"], "Landlord");
    }

    #[test]
    fn test_unknown_payment_mode_is_rejected() {
        let parsed = serde_json::from_value::<PaymentMode>(json!("Crypto"));
        assert!(parsed.is_err());
        let upi: PaymentMode = serde_json::from_value(json!("UPI")).unwrap();
        assert_eq!(upi, PaymentMode::Upi);
    }

    #[test]
    fn test_negative_amount_fails_validation() {
        let request = CreateExpenseRequest {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            expense_type: "Tools".to_string(),
            amount: Decimal::new(-100, 0),
            description: None,
            paid_to: "Hardware store".to_string(),
            payment_mode: PaymentMode::Cash,
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("amount"));
    }

    #[test]
    fn test_filters_by_range_and_mode() {
        let expense = Expense::new(
            Uuid::new_v4(),
            CreateExpenseRequest {
                date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
                expense_type: "Rent".to_string(),
                amount: Decimal::new(5000, 0),
                description: None,
                paid_to: "Landlord".to_string(),
                payment_mode: PaymentMode::Cheque,
            },
        );
        let filters = ExpenseFilters {
            from: NaiveDate::from_ymd_opt(2024, 3, 1),
            to: NaiveDate::from_ymd_opt(2024, 3, 31),
            expense_type: Some("rent".to_string()),
            payment_mode: Some(PaymentMode::Cheque),
        };
        assert!(filters.matches(&expense));
        let filters = ExpenseFilters {
            payment_mode: Some(PaymentMode::Cash),
            ..Default::default()
        };
        assert!(!filters.matches(&expense));
    }
}
