//! Modelo de JobCard
//!
//! Orden de trabajo: sigue la visita de un vehículo desde la entrada hasta
//! la entrega. `reminder_sent` no se acepta en ningún request: solo lo
//! cambia el job de recordatorios.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::customer::Customer;
use crate::models::mechanic::Mechanic;
use crate::utils::errors::{validation_error, AppResult};
use crate::utils::validation::{normalize_optional, normalize_vehicle_number, validate_not_blank};

/// Tipo de servicio - mapea al ENUM service_type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "service_type", rename_all = "snake_case")]
pub enum ServiceType {
    #[serde(rename = "General Service")]
    GeneralService,
    #[serde(rename = "Oil Change")]
    OilChange,
    Repair,
    #[serde(rename = "Body Work")]
    BodyWork,
    Electrical,
    Inspection,
    Other,
}

/// Estado de la orden - mapea al ENUM job_status
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "job_status", rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    Delivered,
    Cancelled,
}

impl JobStatus {
    pub const ALL: [JobStatus; 5] = [
        JobStatus::Pending,
        JobStatus::InProgress,
        JobStatus::Completed,
        JobStatus::Delivered,
        JobStatus::Cancelled,
    ];
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct JobCard {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub vehicle_number: String,
    pub job_in_date: DateTime<Utc>,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub service_type: ServiceType,
    pub status: JobStatus,
    pub assigned_mechanic_id: Option<Uuid>,
    pub km_in: Option<i32>,
    pub job_description: Option<String>,
    pub reminder_sent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// JobCard con sus referencias expandidas (listados)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobCardView {
    #[serde(flatten)]
    pub job_card: JobCard,
    pub customer: Option<Customer>,
    pub assigned_mechanic: Option<Mechanic>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobCardRequest {
    pub customer_id: Uuid,

    #[validate(length(max = 20), custom = "validate_not_blank")]
    pub vehicle_number: String,

    /// Por defecto, el momento del alta
    pub job_in_date: Option<DateTime<Utc>>,

    pub estimated_delivery: Option<DateTime<Utc>>,

    pub service_type: ServiceType,

    pub status: Option<JobStatus>,

    pub assigned_mechanic_id: Option<Uuid>,

    #[validate(range(min = 0))]
    pub km_in: Option<i32>,

    #[validate(length(max = 2000))]
    pub job_description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobCardRequest {
    pub customer_id: Option<Uuid>,

    #[validate(length(max = 20), custom = "validate_not_blank")]
    pub vehicle_number: Option<String>,

    pub job_in_date: Option<DateTime<Utc>>,

    pub estimated_delivery: Option<DateTime<Utc>>,

    pub service_type: Option<ServiceType>,

    pub status: Option<JobStatus>,

    /// Ausente: sin cambios; `null`: quita el mecánico asignado
    #[serde(default, deserialize_with = "present")]
    pub assigned_mechanic_id: Option<Option<Uuid>>,

    #[validate(range(min = 0))]
    pub km_in: Option<i32>,

    #[validate(length(max = 2000))]
    pub job_description: Option<String>,
}

/// Distingue un campo presente con `null` de un campo ausente
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Filtros para búsqueda de órdenes
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobCardFilters {
    pub status: Option<JobStatus>,
    pub customer_id: Option<Uuid>,
    pub reminder_sent: Option<bool>,
}

impl JobCardFilters {
    pub fn matches(&self, card: &JobCard) -> bool {
        self.status.map_or(true, |s| card.status == s)
            && self.customer_id.map_or(true, |c| card.customer_id == c)
            && self.reminder_sent.map_or(true, |r| card.reminder_sent == r)
    }
}

impl JobCard {
    pub fn new(request: CreateJobCardRequest) -> AppResult<Self> {
        let now = Utc::now();
        let card = Self {
            id: Uuid::new_v4(),
            customer_id: request.customer_id,
            vehicle_number: normalize_vehicle_number(&request.vehicle_number),
            job_in_date: request.job_in_date.unwrap_or(now),
            estimated_delivery: request.estimated_delivery,
            service_type: request.service_type,
            status: request.status.unwrap_or_default(),
            assigned_mechanic_id: request.assigned_mechanic_id,
            km_in: request.km_in,
            job_description: normalize_optional(request.job_description),
            reminder_sent: false,
            created_at: now,
            updated_at: now,
        };
        card.check_dates()?;
        Ok(card)
    }

    pub fn apply_update(&mut self, request: UpdateJobCardRequest) -> AppResult<()> {
        if let Some(customer_id) = request.customer_id {
            self.customer_id = customer_id;
        }
        if let Some(vehicle_number) = request.vehicle_number {
            self.vehicle_number = normalize_vehicle_number(&vehicle_number);
        }
        if let Some(job_in_date) = request.job_in_date {
            self.job_in_date = job_in_date;
        }
        if request.estimated_delivery.is_some() {
            self.estimated_delivery = request.estimated_delivery;
        }
        if let Some(service_type) = request.service_type {
            self.service_type = service_type;
        }
        if let Some(status) = request.status {
            self.status = status;
        }
        if let Some(assigned_mechanic_id) = request.assigned_mechanic_id {
            self.assigned_mechanic_id = assigned_mechanic_id;
        }
        if request.km_in.is_some() {
            self.km_in = request.km_in;
        }
        if request.job_description.is_some() {
            self.job_description = normalize_optional(request.job_description);
        }
        self.updated_at = Utc::now();
        self.check_dates()
    }

    fn check_dates(&self) -> AppResult<()> {
        match self.estimated_delivery {
            Some(delivery) if delivery < self.job_in_date => Err(validation_error(
                "estimated_delivery",
                "Estimated delivery cannot be before the job-in date",
            )),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn request() -> CreateJobCardRequest {
        CreateJobCardRequest {
            customer_id: Uuid::new_v4(),
            vehicle_number: "mh12ab1234".to_string(),
            job_in_date: None,
            estimated_delivery: None,
            service_type: ServiceType::GeneralService,
            status: None,
            assigned_mechanic_id: None,
            km_in: Some(42_000),
            job_description: Some("Periodic service".to_string()),
        }
    }

    #[test]
    fn test_defaults_pending_and_not_reminded() {
        let card = JobCard::new(request()).unwrap();
        assert_eq!(card.status, JobStatus::Pending);
        assert!(!card.reminder_sent);
        assert_eq!(card.vehicle_number, "MH12AB1234");
    }

    #[test]
    fn test_delivery_before_intake_is_rejected() {
        let mut req = request();
        let now = Utc::now();
        req.job_in_date = Some(now);
        req.estimated_delivery = Some(now - Duration::days(1));
        assert!(JobCard::new(req).is_err());
    }

    #[test]
    fn test_negative_km_fails_validation() {
        let mut req = request();
        req.km_in = Some(-1);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(
            serde_json::to_value(JobStatus::InProgress).unwrap(),
            serde_json::json!("In Progress")
        );
        let service: ServiceType = serde_json::from_str("\"Oil Change\"").unwrap();
        assert_eq!(service, ServiceType::OilChange);
        assert!(serde_json::from_str::<JobStatus>("\"Lost\"").is_err());
    }

    #[test]
    fn test_update_can_unassign_mechanic() {
        let mut req = request();
        req.assigned_mechanic_id = Some(Uuid::new_v4());
        let mut card = JobCard::new(req).unwrap();

        let untouched: UpdateJobCardRequest =
            serde_json::from_value(serde_json::json!({ "status": "Completed" })).unwrap();
        assert_eq!(untouched.assigned_mechanic_id, None);
        card.apply_update(untouched).unwrap();
        assert!(card.assigned_mechanic_id.is_some());

        let cleared: UpdateJobCardRequest =
            serde_json::from_value(serde_json::json!({ "assignedMechanicId": null })).unwrap();
        assert_eq!(cleared.assigned_mechanic_id, Some(None));
        card.apply_update(cleared).unwrap();
        assert_eq!(card.assigned_mechanic_id, None);
    }

    #[test]
    fn test_filters() {
        let card = JobCard::new(request()).unwrap();
        assert!(JobCardFilters::default().matches(&card));
        let filters = JobCardFilters {
            status: Some(JobStatus::Completed),
            ..Default::default()
        };
        assert!(!filters.matches(&card));
        let filters = JobCardFilters {
            reminder_sent: Some(false),
            customer_id: Some(card.customer_id),
            ..Default::default()
        };
        assert!(filters.matches(&card));
    }
}
