use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Resumen para el panel principal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub customer_count: i64,
    /// Órdenes por estado, con el nombre que usa el UI ("In Progress", ...)
    pub job_cards_by_status: BTreeMap<String, i64>,
    pub gst_revenue: Decimal,
    pub non_gst_revenue: Decimal,
    pub total_revenue: Decimal,
    pub total_expenses: Decimal,
}
