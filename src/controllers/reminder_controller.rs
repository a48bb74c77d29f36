use chrono::Utc;

use crate::dto::api_response::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::services::access_policy::{authorize, Action, Feature};
use crate::services::reminder_service::{ReminderJob, ReminderRunReport};
use crate::utils::errors::AppResult;

/// Ejecución manual de la tarea de recordatorios
pub struct ReminderController {
    job: ReminderJob,
}

impl ReminderController {
    pub fn new(job: ReminderJob) -> Self {
        Self { job }
    }

    pub async fn run(&self, user: &AuthenticatedUser) -> AppResult<ApiResponse<ReminderRunReport>> {
        authorize(user.role, Feature::Reminders, Action::Write)?;
        log::info!("⏰ Ejecución manual de recordatorios por {}", user.user_id);

        let report = self.job.run(Utc::now()).await?;
        let message = format!("{} reminder(s) sent", report.sent);
        Ok(ApiResponse::success_with_message(report, message))
    }
}
