//! Modelo de Garage Profile
//!
//! Perfil del taller, uno por usuario propietario. Sus datos alimentan la
//! cabecera de las facturas.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::gst::GstRate;
use crate::utils::validation::{
    normalize_email, normalize_optional, validate_gstin, validate_not_blank, validate_phone_or_empty,
};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GarageProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub logo: Option<String>,
    pub garage_name: String,
    pub phone: Option<String>,
    pub email: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub footer_message: Option<String>,
    pub enable_gst: bool,
    pub gst_number: Option<String>,
    #[sqlx(try_from = "i16")]
    pub gst_rate: GstRate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateGarageRequest {
    pub logo: Option<String>,

    #[validate(length(max = 150), custom = "validate_not_blank")]
    pub garage_name: String,

    #[validate(custom = "validate_phone_or_empty")]
    pub phone: Option<String>,

    #[validate(email)]
    pub email: String,

    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,

    #[validate(length(max = 12))]
    pub zip: Option<String>,

    #[validate(length(max = 500))]
    pub footer_message: Option<String>,

    #[serde(default)]
    pub enable_gst: bool,

    #[validate(custom = "validate_gstin")]
    pub gst_number: Option<String>,

    pub gst_rate: Option<GstRate>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGarageRequest {
    pub logo: Option<String>,

    #[validate(length(max = 150), custom = "validate_not_blank")]
    pub garage_name: Option<String>,

    #[validate(custom = "validate_phone_or_empty")]
    pub phone: Option<String>,

    #[validate(email)]
    pub email: Option<String>,

    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,

    #[validate(length(max = 12))]
    pub zip: Option<String>,

    #[validate(length(max = 500))]
    pub footer_message: Option<String>,

    pub enable_gst: Option<bool>,

    #[validate(custom = "validate_gstin")]
    pub gst_number: Option<String>,

    pub gst_rate: Option<GstRate>,
}

impl GarageProfile {
    pub fn new(user_id: Uuid, request: CreateGarageRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            logo: normalize_optional(request.logo),
            garage_name: request.garage_name.trim().to_string(),
            phone: normalize_optional(request.phone),
            email: normalize_email(&request.email),
            address: normalize_optional(request.address),
            city: normalize_optional(request.city),
            state: normalize_optional(request.state),
            zip: normalize_optional(request.zip),
            footer_message: normalize_optional(request.footer_message),
            enable_gst: request.enable_gst,
            gst_number: normalize_optional(request.gst_number).map(|g| g.to_uppercase()),
            gst_rate: request.gst_rate.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_update(&mut self, request: UpdateGarageRequest) {
        if request.logo.is_some() {
            self.logo = normalize_optional(request.logo);
        }
        if let Some(garage_name) = request.garage_name {
            self.garage_name = garage_name.trim().to_string();
        }
        if request.phone.is_some() {
            self.phone = normalize_optional(request.phone);
        }
        if let Some(email) = request.email {
            self.email = normalize_email(&email);
        }
        if request.address.is_some() {
            self.address = normalize_optional(request.address);
        }
        if request.city.is_some() {
            self.city = normalize_optional(request.city);
        }
        if request.state.is_some() {
            self.state = normalize_optional(request.state);
        }
        if request.zip.is_some() {
            self.zip = normalize_optional(request.zip);
        }
        if request.footer_message.is_some() {
            self.footer_message = normalize_optional(request.footer_message);
        }
        if let Some(enable_gst) = request.enable_gst {
            self.enable_gst = enable_gst;
        }
        if request.gst_number.is_some() {
            self.gst_number = normalize_optional(request.gst_number).map(|g| g.to_uppercase());
        }
        if let Some(gst_rate) = request.gst_rate {
            self.gst_rate = gst_rate;
        }
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::non_gst_bill::GarageSnapshot;

    fn request() -> CreateGarageRequest {
        CreateGarageRequest {
            logo: None,
            garage_name: "Sharma Motors".to_string(),
            phone: Some("9876500000".to_string()),
            email: "Desk@SharmaMotors.in".to_string(),
            address: Some("12 MG Road".to_string()),
            city: Some("Pune".to_string()),
            state: Some("Maharashtra".to_string()),
            zip: Some("411001".to_string()),
            footer_message: None,
            enable_gst: true,
            gst_number: Some("27aapfu0939f1zv".to_string()),
            gst_rate: None,
        }
    }

    #[test]
    fn test_defaults_and_normalization() {
        let garage = GarageProfile::new(Uuid::new_v4(), request());
        assert_eq!(garage.gst_rate.percent(), 18);
        assert_eq!(garage.email, "desk@sharmamotors.in");
        assert_eq!(garage.gst_number.as_deref(), Some("27AAPFU0939F1ZV"));
    }

    #[test]
    fn test_bad_gst_number_and_email_fail_validation() {
        let mut req = request();
        req.gst_number = Some("NOT-A-GSTIN".to_string());
        req.email = "nope".to_string();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("gst_number"));
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_snapshot_joins_address_parts() {
        let garage = GarageProfile::new(Uuid::new_v4(), request());
        let snapshot = GarageSnapshot::from(&garage);
        assert_eq!(snapshot.name, "Sharma Motors");
        assert_eq!(snapshot.address.as_deref(), Some("12 MG Road, Pune, 411001"));
        assert_eq!(snapshot.state.as_deref(), Some("Maharashtra"));
    }
}
