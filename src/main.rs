use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use garage_service::config::database::DatabaseConfig;
use garage_service::config::environment::EnvironmentConfig;
use garage_service::database::DatabaseConnection;
use garage_service::repositories::Repositories;
use garage_service::services::mailer::{HttpMailer, LogMailer, Mailer};
use garage_service::services::reminder_service::spawn_reminder_scheduler;
use garage_service::{create_app, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging (RUST_LOG, por defecto info)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("🔧 Garage Service Manager - API");
    info!("================================");

    let config = EnvironmentConfig::from_env()?;

    let repos = match DatabaseConfig::from_environment(&config) {
        Some(db_config) => match DatabaseConnection::connect(&db_config).await {
            Ok(connection) => Repositories::postgres(connection.pool().clone()),
            Err(e) => {
                error!("❌ Error conectando a la base de datos: {}", e);
                return Err(anyhow::anyhow!("Error de base de datos: {}", e));
            }
        },
        None if config.is_development() => {
            warn!("⚠️ DATABASE_URL no definido: usando almacenamiento en memoria");
            Repositories::in_memory()
        }
        None => {
            error!("❌ DATABASE_URL es obligatorio fuera de desarrollo");
            return Err(anyhow::anyhow!("DATABASE_URL is required in {}", config.environment));
        }
    };

    let mailer: Arc<dyn Mailer> = if config.mail.api_url.is_some() {
        Arc::new(HttpMailer::new(&config.mail)?)
    } else {
        warn!("📭 MAIL_API_URL no definido: los correos solo se registran en el log");
        Arc::new(LogMailer)
    };

    let addr: SocketAddr = config.server_url().parse()?;
    let state = AppState::new(config, repos, mailer);

    if state.config.reminder.enabled {
        let every = Duration::from_secs(state.config.reminder.interval_secs.max(60));
        info!("⏰ Recordatorios programados cada {:?}", every);
        spawn_reminder_scheduler(Arc::new(state.reminder_job()), every);
    }

    let app = create_app(state);

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health");
    info!("   POST /api/auth/register | /api/auth/login, GET /api/auth/me, GET /api/access");
    info!("   CRUD /api/customers, /api/jobcards, /api/mechanics, /api/items");
    info!("   CRUD /api/gst-bills, /api/non-gst-bills, /api/expenses, /api/expense-categories");
    info!("   CRUD /api/users, /api/permissions, /api/garage");
    info!("   GET  /api/dashboard/summary, POST /api/reminders/run");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Error del servidor: {}", e);
        return Err(e.into());
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo escuchar Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo escuchar SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
