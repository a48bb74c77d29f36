use std::collections::BTreeMap;

use crate::dto::dashboard_dto::DashboardSummary;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::job_card::JobStatus;
use crate::repositories::Repositories;
use crate::services::access_policy::{authorize, Action, Feature};
use crate::utils::errors::{AppError, AppResult};

pub struct DashboardController {
    repos: Repositories,
}

impl DashboardController {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Todos los estados aparecen, aunque tengan cero órdenes
    pub async fn summary(&self, user: &AuthenticatedUser) -> AppResult<DashboardSummary> {
        authorize(user.role, Feature::Dashboard, Action::Read)?;

        let mut job_cards_by_status: BTreeMap<String, i64> = BTreeMap::new();
        for status in JobStatus::ALL {
            job_cards_by_status.insert(status_label(status)?, 0);
        }
        for (status, count) in self.repos.job_cards.count_by_status().await? {
            job_cards_by_status.insert(status_label(status)?, count);
        }

        let gst_revenue = self.repos.gst_bills.total_revenue().await?;
        let non_gst_revenue = self.repos.non_gst_bills.total_revenue().await?;

        Ok(DashboardSummary {
            customer_count: self.repos.customers.count().await?,
            job_cards_by_status,
            gst_revenue,
            non_gst_revenue,
            total_revenue: gst_revenue + non_gst_revenue,
            total_expenses: self.repos.expenses.total().await?,
        })
    }
}

/// Nombre del estado tal como viaja en JSON
fn status_label(status: JobStatus) -> AppResult<String> {
    match serde_json::to_value(status) {
        Ok(serde_json::Value::String(label)) => Ok(label),
        _ => Err(AppError::Internal(format!("Unexpected job status encoding: {:?}", status))),
    }
}
