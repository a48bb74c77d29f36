//! Modelo de Non-GST Bill
//!
//! Factura sin GST: referencia Items del catálogo y congela los datos del
//! taller en el momento de emitirla.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::garage::GarageProfile;
use crate::utils::validation::validate_non_negative;

/// Copia de los datos del taller tomada al emitir la factura
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GarageSnapshot {
    pub name: String,
    pub address: Option<String>,
    pub gstin: Option<String>,
    pub state: Option<String>,
}

impl From<&GarageProfile> for GarageSnapshot {
    fn from(profile: &GarageProfile) -> Self {
        let address = [profile.address.as_deref(), profile.city.as_deref(), profile.zip.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            name: profile.garage_name.clone(),
            address: (!address.is_empty()).then_some(address),
            gstin: profile.gst_number.clone(),
            state: profile.state.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NonGstBill {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub vehicle_id: Uuid,
    pub invoice_no: String,
    pub invoice_date: NaiveDate,
    pub item_ids: Vec<Uuid>,
    pub mechanic_charge: Decimal,
    pub total_amount: Decimal,
    pub additional_notes: Option<String>,
    pub garage: GarageSnapshot,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateNonGstBillRequest {
    pub customer_id: Uuid,

    pub vehicle_id: Uuid,

    /// Si no viene se genera el siguiente número libre (INV-000001, ...)
    #[validate(length(min = 1, max = 40))]
    pub invoice_no: Option<String>,

    pub invoice_date: Option<NaiveDate>,

    #[validate(length(min = 1))]
    pub item_ids: Vec<Uuid>,

    #[validate(custom = "validate_non_negative")]
    pub mechanic_charge: Option<Decimal>,

    #[validate(length(max = 1000))]
    pub additional_notes: Option<String>,
}

/// Solo las notas son editables tras la emisión
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNonGstBillRequest {
    #[validate(length(max = 1000))]
    pub additional_notes: Option<String>,
}
