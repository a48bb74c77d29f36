use axum::{extract::State, routing::post, Extension, Json, Router};

use crate::controllers::reminder_controller::ReminderController;
use crate::dto::api_response::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::services::reminder_service::ReminderRunReport;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_reminder_router() -> Router<AppState> {
    Router::new().route("/run", post(run_reminders))
}

async fn run_reminders(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<ReminderRunReport>>, AppError> {
    let controller = ReminderController::new(state.reminder_job());
    Ok(Json(controller.run(&user).await?))
}
