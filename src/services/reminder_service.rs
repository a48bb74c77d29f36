//! Recordatorios de servicio periódico
//!
//! Cada ejecución busca órdenes de trabajo con `reminder_sent = false` cuya
//! entrada fue hace tres meses naturales o más, envía un correo al cliente y
//! marca la orden. La marca es condicional, así que repetir la ejecución (o
//! solaparla con otra) nunca envía dos veces el mismo recordatorio.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::{interval, timeout, MissedTickBehavior};

use crate::config::environment::EnvironmentConfig;
use crate::models::customer::Customer;
use crate::models::job_card::JobCard;
use crate::repositories::customer_repository::CustomerRepository;
use crate::repositories::job_card_repository::JobCardRepository;
use crate::repositories::Repositories;
use crate::services::mailer::{EmailMessage, MailError, Mailer};
use crate::utils::errors::AppResult;

/// Meses desde la entrada del vehículo hasta el recordatorio
pub const REMINDER_AFTER_MONTHS: u32 = 3;

/// Resultado de una ejecución
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderRunReport {
    pub candidates: usize,
    pub sent: usize,
    pub skipped: usize,
    pub failed: usize,
}

pub struct ReminderJob {
    job_cards: Arc<dyn JobCardRepository>,
    customers: Arc<dyn CustomerRepository>,
    mailer: Arc<dyn Mailer>,
    base_url: String,
    send_timeout: Duration,
}

impl ReminderJob {
    pub fn new(repos: &Repositories, mailer: Arc<dyn Mailer>, config: &EnvironmentConfig) -> Self {
        Self {
            job_cards: repos.job_cards.clone(),
            customers: repos.customers.clone(),
            mailer,
            base_url: config.app_base_url.clone(),
            send_timeout: Duration::from_secs(config.mail.timeout_secs.max(1)),
        }
    }

    /// Ejecuta una pasada completa con `now` como instante de referencia
    pub async fn run(&self, now: DateTime<Utc>) -> AppResult<ReminderRunReport> {
        let cutoff = reminder_cutoff(now);
        let candidates = self.job_cards.find_reminder_candidates(cutoff).await?;

        let mut report = ReminderRunReport {
            candidates: candidates.len(),
            ..Default::default()
        };

        for card in candidates {
            match self.remind(&card).await {
                Outcome::Sent => report.sent += 1,
                Outcome::Skipped => report.skipped += 1,
                Outcome::Failed => report.failed += 1,
            }
        }

        log::info!(
            "⏰ Recordatorios: {} candidatas, {} enviados, {} omitidos, {} fallidos",
            report.candidates,
            report.sent,
            report.skipped,
            report.failed
        );
        Ok(report)
    }

    async fn remind(&self, card: &JobCard) -> Outcome {
        let customer = match self.customers.find_by_id(card.customer_id).await {
            Ok(Some(customer)) => customer,
            Ok(None) => {
                log::warn!("⚠️ Job card {}: cliente {} no existe, se omite", card.id, card.customer_id);
                return Outcome::Skipped;
            }
            Err(e) => {
                log::error!("❌ Job card {}: error leyendo cliente: {}", card.id, e);
                return Outcome::Failed;
            }
        };

        let Some(email) = customer.contact_email() else {
            log::info!("📭 Job card {}: el cliente {} no tiene email, se omite", card.id, customer.id);
            return Outcome::Skipped;
        };

        let message = reminder_email(&customer, email, card, &self.base_url);
        if let Err(e) = self.deliver(&message).await {
            log::warn!("📧 Recordatorio a {} falló: {}", email, e);
            return Outcome::Failed;
        }

        match self.job_cards.mark_reminder_sent(card.id).await {
            Ok(true) => Outcome::Sent,
            Ok(false) => {
                log::warn!("⚠️ Job card {} ya estaba marcada por otra ejecución", card.id);
                Outcome::Skipped
            }
            Err(e) => {
                log::error!("❌ Job card {}: correo enviado pero no se pudo marcar: {}", card.id, e);
                Outcome::Failed
            }
        }
    }

    /// Envía con tiempo límite; cualquier fallo del proveedor es ExternalService
    async fn deliver(&self, message: &EmailMessage) -> AppResult<()> {
        timeout(self.send_timeout, self.mailer.send(message))
            .await
            .map_err(|_| MailError::Timeout(self.send_timeout))??;
        Ok(())
    }
}

enum Outcome {
    Sent,
    Skipped,
    Failed,
}

/// now − 3 meses naturales
pub fn reminder_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now.checked_sub_months(Months::new(REMINDER_AFTER_MONTHS))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

pub fn reminder_email(customer: &Customer, to: &str, card: &JobCard, base_url: &str) -> EmailMessage {
    let vehicle = escape_html(&card.vehicle_number);
    let html = format!(
        r#"<html>
  <body style="font-family: Arial, sans-serif; color: #222;">
    <h2>Time for your next service</h2>
    <p>Dear {name},</p>
    <p>Your vehicle <strong>{vehicle}</strong> was last serviced with us on <strong>{date}</strong>.
       It is now due for its periodic service.</p>
    <p>Book your appointment at <a href="{link}">{link}</a> or reply to this email.</p>
    <p>Thank you for choosing us.</p>
  </body>
</html>"#,
        name = escape_html(&customer.name),
        vehicle = vehicle,
        date = card.job_in_date.format("%d %b %Y"),
        link = escape_html(base_url),
    );

    EmailMessage {
        to: to.to_string(),
        subject: format!("Service reminder for {}", card.vehicle_number),
        html,
    }
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Lanza la tarea periódica; la primera pasada ocurre al arrancar
pub fn spawn_reminder_scheduler(job: Arc<ReminderJob>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(e) = job.run(Utc::now()).await {
                log::error!("❌ Error en la ejecución de recordatorios: {}", e);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_cutoff_is_three_calendar_months() {
        let now = Utc.with_ymd_and_hms(2024, 5, 31, 12, 0, 0).unwrap();
        assert_eq!(
            reminder_cutoff(now),
            Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<b>Tom & Jerry</b>"), "&lt;b&gt;Tom &amp; Jerry&lt;/b&gt;");
    }
}
