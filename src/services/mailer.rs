//! Envío de correo
//!
//! `Mailer` abstrae el transporte. `HttpMailer` publica el mensaje como
//! JSON en la API HTTP del proveedor; `LogMailer` solo lo registra y se usa
//! cuando no hay MAIL_API_URL configurada.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::config::environment::MailConfig;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("mail provider rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("mail send timed out after {0:?}")]
    Timeout(Duration),

    #[error("invalid mail configuration: {0}")]
    Config(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError>;
}

#[derive(Serialize)]
struct MailPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// Cliente para una API de correo transaccional (POST JSON)
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    from: String,
}

impl HttpMailer {
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        let api_url = config
            .api_url
            .clone()
            .ok_or_else(|| MailError::Config("MAIL_API_URL is not set".to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;

        Ok(Self {
            client,
            api_url,
            api_key: config.api_key.clone(),
            from: config.from.clone(),
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        let payload = MailPayload {
            from: &self.from,
            to: &message.to,
            subject: &message.subject,
            html: &message.html,
        };

        let mut request = self.client.post(&self.api_url).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        log::debug!("📧 Correo aceptado por el proveedor para {}", message.to);
        Ok(())
    }
}

/// Mailer de desarrollo: registra el correo en el log
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        log::info!("📧 [log-mailer] to={} subject={:?}", message.to, message.subject);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_mailer_requires_url() {
        let config = MailConfig {
            api_url: None,
            api_key: None,
            from: "no-reply@garage.local".to_string(),
            timeout_secs: 5,
        };
        assert!(matches!(HttpMailer::new(&config), Err(MailError::Config(_))));
    }

    #[tokio::test]
    async fn test_log_mailer_always_succeeds() {
        let message = EmailMessage {
            to: "a.sharma@example.com".to_string(),
            subject: "Service reminder".to_string(),
            html: "<p>Hi</p>".to_string(),
        };
        assert!(LogMailer.send(&message).await.is_ok());
    }
}
