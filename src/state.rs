//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::middleware::rate_limit::RateLimitState;
use crate::repositories::Repositories;
use crate::services::mailer::Mailer;
use crate::services::reminder_service::ReminderJob;
use crate::utils::jwt::JwtConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<EnvironmentConfig>,
    pub repos: Repositories,
    pub mailer: Arc<dyn Mailer>,
    pub rate_limit: RateLimitState,
}

impl AppState {
    pub fn new(config: EnvironmentConfig, repos: Repositories, mailer: Arc<dyn Mailer>) -> Self {
        let rate_limit = RateLimitState::new(&config);
        Self {
            config: Arc::new(config),
            repos,
            mailer,
            rate_limit,
        }
    }

    pub fn jwt_config(&self) -> JwtConfig {
        JwtConfig::from(self.config.as_ref())
    }

    /// Tarea de recordatorios sobre los mismos repositorios y mailer
    pub fn reminder_job(&self) -> ReminderJob {
        ReminderJob::new(&self.repos, self.mailer.clone(), &self.config)
    }
}
