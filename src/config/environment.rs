//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.
//! Toda la configuración externa (base de datos, correo, URL pública) llega
//! por variables de entorno, opcionalmente desde un fichero `.env`.

use std::env;
use std::str::FromStr;

use thiserror::Error;

/// Errores al leer la configuración
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Configuración del envío de correos
#[derive(Debug, Clone, Default)]
pub struct MailConfig {
    /// Endpoint HTTP del proveedor de correo; sin él los correos solo se registran en el log
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub from: String,
    pub timeout_secs: u64,
}

/// Configuración del job de recordatorios
#[derive(Debug, Clone)]
pub struct ReminderConfig {
    pub enabled: bool,
    pub interval_secs: u64,
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    /// Sin DATABASE_URL se usa el almacenamiento en memoria (solo desarrollo)
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub bcrypt_cost: u32,
    pub cors_origins: Vec<String>,
    pub rate_limit_requests: u32,
    pub rate_limit_window: u64,
    pub app_base_url: String,
    pub mail: MailConfig,
    pub reminder: ReminderConfig,
}

impl EnvironmentConfig {
    /// Leer la configuración desde las variables de entorno
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = parse_or("PORT", 3000)?;
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        Ok(Self {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            port,
            database_url: optional("DATABASE_URL"),
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", 20)?,
            jwt_secret: required("JWT_SECRET")?,
            jwt_expiration: parse_or("JWT_EXPIRATION", 86_400)?,
            bcrypt_cost: parse_or("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            cors_origins: optional("CORS_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            rate_limit_requests: parse_or("RATE_LIMIT_REQUESTS", 30)?,
            rate_limit_window: parse_or("RATE_LIMIT_WINDOW", 60)?,
            app_base_url: env::var("APP_BASE_URL")
                .unwrap_or_else(|_| format!("http://localhost:{}", port)),
            mail: MailConfig {
                api_url: optional("MAIL_API_URL"),
                api_key: optional("MAIL_API_KEY"),
                from: env::var("MAIL_FROM").unwrap_or_else(|_| "no-reply@garage.local".to_string()),
                timeout_secs: parse_or("MAIL_TIMEOUT_SECS", 10)?,
            },
            reminder: ReminderConfig {
                enabled: parse_or("REMINDER_ENABLED", true)?,
                interval_secs: parse_or("REMINDER_INTERVAL_SECS", 86_400)?,
            },
            host,
        })
    }

    /// Configuración mínima para tests: memoria, bcrypt barato, sin correo real
    pub fn for_tests() -> Self {
        Self {
            environment: "test".to_string(),
            port: 0,
            host: "127.0.0.1".to_string(),
            database_url: None,
            db_max_connections: 1,
            jwt_secret: "test-secret".to_string(),
            jwt_expiration: 3600,
            bcrypt_cost: 4,
            cors_origins: Vec::new(),
            rate_limit_requests: 1_000,
            rate_limit_window: 60,
            app_base_url: "http://localhost:3000".to_string(),
            mail: MailConfig {
                api_url: None,
                api_key: None,
                from: "no-reply@garage.local".to_string(),
                timeout_secs: 1,
            },
            reminder: ReminderConfig {
                enabled: false,
                interval_secs: 86_400,
            },
        }
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la dirección del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn optional(name: &'static str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::Missing(name))
}

fn parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match optional(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_or_uses_default_when_unset() {
        let value: u64 = parse_or("GARAGE_TEST_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_parse_or_rejects_garbage() {
        env::set_var("GARAGE_TEST_BAD_NUMBER", "twelve");
        let result: Result<u32, _> = parse_or("GARAGE_TEST_BAD_NUMBER", 1);
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { name: "GARAGE_TEST_BAD_NUMBER", .. })
        ));
    }

    #[test]
    fn test_test_config_is_cheap() {
        let config = EnvironmentConfig::for_tests();
        assert_eq!(config.bcrypt_cost, 4);
        assert!(config.database_url.is_none());
        assert!(!config.is_production());
    }
}
