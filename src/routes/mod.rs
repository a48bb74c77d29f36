//! Rutas HTTP
//!
//! Un router por entidad bajo `/api`. Todo lo que no es `/api/auth` ni
//! `/health` pasa por el middleware de autenticación.

pub mod auth_routes;
pub mod customer_routes;
pub mod dashboard_routes;
pub mod expense_category_routes;
pub mod expense_routes;
pub mod garage_routes;
pub mod gst_bill_routes;
pub mod item_routes;
pub mod job_card_routes;
pub mod mechanic_routes;
pub mod non_gst_bill_routes;
pub mod permission_routes;
pub mod reminder_routes;
pub mod user_routes;

use axum::{extract::State, middleware::from_fn_with_state, routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::middleware::auth::auth_middleware;
use crate::middleware::cors::cors_layer;
use crate::state::AppState;

/// Router completo de la aplicación
pub fn create_app(state: AppState) -> Router {
    let protected = Router::new()
        .nest("/access", auth_routes::create_access_router())
        .nest("/customers", customer_routes::create_customer_router())
        .nest("/jobcards", job_card_routes::create_job_card_router())
        .nest("/mechanics", mechanic_routes::create_mechanic_router())
        .nest("/items", item_routes::create_item_router())
        .nest("/gst-bills", gst_bill_routes::create_gst_bill_router())
        .nest("/non-gst-bills", non_gst_bill_routes::create_non_gst_bill_router())
        .nest("/expenses", expense_routes::create_expense_router())
        .nest(
            "/expense-categories",
            expense_category_routes::create_expense_category_router(),
        )
        .nest("/users", user_routes::create_user_router())
        .nest("/permissions", permission_routes::create_permission_router())
        .nest("/garage", garage_routes::create_garage_router())
        .nest("/dashboard", dashboard_routes::create_dashboard_router())
        .nest("/reminders", reminder_routes::create_reminder_router())
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    let api = Router::new()
        .nest("/auth", auth_routes::create_auth_router(state.clone()))
        .merge(protected);

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.config.environment,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
