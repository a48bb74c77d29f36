//! Modelo de GST Bill
//!
//! Factura con GST. Las líneas se guardan con sus importes ya calculados
//! (JSONB en PostgreSQL); una vez emitida solo se puede corregir el GSTIN.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::gst::GstRate;
use crate::utils::validation::{validate_gstin, validate_non_negative};

/// Línea de factura GST con importes derivados
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GstBillLine {
    pub item_id: Option<Uuid>,
    pub description: String,
    pub hsn_code: Option<String>,
    pub quantity: i32,
    pub rate: Decimal,
    pub gst_percent: GstRate,
    pub actual_amount: Decimal,
    pub gst_amount: Decimal,
    pub total_amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GstBill {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub vehicle_id: Uuid,
    pub gstin: Option<String>,
    pub invoice_no: String,
    pub invoice_date: NaiveDate,
    pub lines: Vec<GstBillLine>,
    pub mechanic_charge: Decimal,
    /// Suma del GST de todas las líneas
    pub gst: Decimal,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Línea enviada por el cliente. Con `itemId` los campos ausentes se
/// toman del Item; sin él, descripción, cantidad y tarifa son obligatorias.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BillLineInput {
    pub item_id: Option<Uuid>,

    #[validate(length(max = 200))]
    pub description: Option<String>,

    #[validate(length(max = 20))]
    pub hsn_code: Option<String>,

    #[validate(range(min = 1))]
    pub quantity: Option<i32>,

    #[validate(custom = "validate_non_negative")]
    pub rate: Option<Decimal>,

    pub gst_percent: Option<GstRate>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateGstBillRequest {
    pub customer_id: Uuid,

    pub vehicle_id: Uuid,

    #[validate(custom = "validate_gstin")]
    pub gstin: Option<String>,

    /// Si no viene se genera el siguiente número libre (GST-000001, ...)
    #[validate(length(min = 1, max = 40))]
    pub invoice_no: Option<String>,

    pub invoice_date: Option<NaiveDate>,

    #[validate(length(min = 1))]
    pub lines: Vec<BillLineInput>,

    #[validate(custom = "validate_non_negative")]
    pub mechanic_charge: Option<Decimal>,
}

/// Lo único modificable de una factura GST emitida
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGstBillRequest {
    #[validate(custom = "validate_gstin")]
    pub gstin: Option<String>,
}

/// Filtros para listados de facturas (GST y sin GST)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillFilters {
    pub customer_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl BillFilters {
    pub fn matches(&self, customer_id: Uuid, invoice_date: NaiveDate) -> bool {
        self.customer_id.map_or(true, |c| c == customer_id)
            && self.from.map_or(true, |from| invoice_date >= from)
            && self.to.map_or(true, |to| invoice_date <= to)
    }
}
