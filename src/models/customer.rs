//! Modelo de Customer
//!
//! Clientes del taller con sus vehículos embebidos. Los vehículos no son
//! una entidad propia: viven dentro del cliente (JSONB en PostgreSQL) y
//! cada uno lleva un `id` estable para que las facturas puedan referenciarlo.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::utils::errors::{validation_error, AppResult};
use crate::utils::validation::{
    normalize_optional, normalize_vehicle_number, validate_email_or_empty, validate_not_blank,
    validate_phone, validate_phone_or_empty,
};

/// Vehículo embebido en un cliente
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: Uuid,
    pub vehicle_number: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub fuel_type: String,
    pub vehicle_type: String,
    pub registration_date: Option<NaiveDate>,
    pub insurance_expiry: Option<NaiveDate>,
}

/// Customer principal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub mobile: String,
    pub alternate_number: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub vehicles: Vec<Vehicle>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Datos de un vehículo en requests de alta/actualización
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VehicleInput {
    /// Presente al reenviar un vehículo existente; conserva su id
    pub id: Option<Uuid>,

    #[validate(length(max = 20), custom = "validate_not_blank")]
    pub vehicle_number: String,

    pub brand: Option<String>,
    pub model: Option<String>,

    #[validate(custom = "validate_not_blank")]
    pub fuel_type: String,

    #[validate(custom = "validate_not_blank")]
    pub vehicle_type: String,

    pub registration_date: Option<NaiveDate>,
    pub insurance_expiry: Option<NaiveDate>,
}

impl VehicleInput {
    pub fn into_vehicle(self) -> Vehicle {
        Vehicle {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            vehicle_number: normalize_vehicle_number(&self.vehicle_number),
            brand: normalize_optional(self.brand),
            model: normalize_optional(self.model),
            fuel_type: self.fuel_type.trim().to_string(),
            vehicle_type: self.vehicle_type.trim().to_string(),
            registration_date: self.registration_date,
            insurance_expiry: self.insurance_expiry,
        }
    }
}

/// Request para crear un nuevo cliente
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerRequest {
    #[validate(length(max = 100), custom = "validate_not_blank")]
    pub name: String,

    #[validate(custom = "validate_phone")]
    pub mobile: String,

    #[validate(custom = "validate_phone_or_empty")]
    pub alternate_number: Option<String>,

    #[validate(custom = "validate_email_or_empty")]
    pub email: Option<String>,

    pub address: Option<String>,

    #[serde(default)]
    pub vehicles: Vec<VehicleInput>,
}

/// Request para actualizar un cliente existente
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomerRequest {
    #[validate(length(max = 100), custom = "validate_not_blank")]
    pub name: Option<String>,

    #[validate(custom = "validate_phone")]
    pub mobile: Option<String>,

    #[validate(custom = "validate_phone_or_empty")]
    pub alternate_number: Option<String>,

    #[validate(custom = "validate_email_or_empty")]
    pub email: Option<String>,

    pub address: Option<String>,

    /// Si viene, reemplaza la lista completa de vehículos
    pub vehicles: Option<Vec<VehicleInput>>,
}

/// Filtros para búsqueda de clientes
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerFilters {
    /// Coincidencia parcial en nombre, móvil o matrícula
    pub search: Option<String>,
}

impl Customer {
    pub fn new(request: CreateCustomerRequest) -> AppResult<Self> {
        let now = Utc::now();
        let vehicles = build_vehicles(request.vehicles)?;
        Ok(Self {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            mobile: request.mobile.trim().to_string(),
            alternate_number: normalize_optional(request.alternate_number),
            email: normalize_optional(request.email),
            address: normalize_optional(request.address),
            vehicles,
            created_at: now,
            updated_at: now,
        })
    }

    /// Aplica una actualización parcial; "" en un campo opcional lo borra
    pub fn apply_update(&mut self, request: UpdateCustomerRequest) -> AppResult<()> {
        if let Some(name) = request.name {
            self.name = name.trim().to_string();
        }
        if let Some(mobile) = request.mobile {
            self.mobile = mobile.trim().to_string();
        }
        if request.alternate_number.is_some() {
            self.alternate_number = normalize_optional(request.alternate_number);
        }
        if request.email.is_some() {
            self.email = normalize_optional(request.email);
        }
        if request.address.is_some() {
            self.address = normalize_optional(request.address);
        }
        if let Some(vehicles) = request.vehicles {
            self.vehicles = build_vehicles(vehicles)?;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Añade un vehículo comprobando que la matrícula no esté repetida
    pub fn add_vehicle(&mut self, input: VehicleInput) -> AppResult<Vehicle> {
        let vehicle = input.into_vehicle();
        if self.has_vehicle_number(&vehicle.vehicle_number) {
            return Err(validation_error(
                "vehicle_number",
                format!("Vehicle {} is already registered for this customer", vehicle.vehicle_number),
            ));
        }
        self.vehicles.push(vehicle.clone());
        self.updated_at = Utc::now();
        Ok(vehicle)
    }

    pub fn remove_vehicle(&mut self, vehicle_id: Uuid) -> bool {
        let before = self.vehicles.len();
        self.vehicles.retain(|v| v.id != vehicle_id);
        let removed = self.vehicles.len() != before;
        if removed {
            self.updated_at = Utc::now();
        }
        removed
    }

    pub fn find_vehicle(&self, vehicle_id: Uuid) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.id == vehicle_id)
    }

    pub fn has_vehicle_number(&self, vehicle_number: &str) -> bool {
        let wanted = normalize_vehicle_number(vehicle_number);
        self.vehicles.iter().any(|v| v.vehicle_number == wanted)
    }

    /// Email utilizable para recordatorios
    pub fn contact_email(&self) -> Option<&str> {
        self.email.as_deref().map(str::trim).filter(|e| !e.is_empty())
    }

    pub fn matches_search(&self, search: &str) -> bool {
        let needle = search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&needle)
            || self.mobile.contains(&needle)
            || self
                .vehicles
                .iter()
                .any(|v| v.vehicle_number.to_lowercase().contains(&needle))
    }
}

fn build_vehicles(inputs: Vec<VehicleInput>) -> AppResult<Vec<Vehicle>> {
    let mut vehicles: Vec<Vehicle> = Vec::with_capacity(inputs.len());
    for input in inputs {
        input.validate()?;
        let vehicle = input.into_vehicle();
        if vehicles.iter().any(|v| v.vehicle_number == vehicle.vehicle_number) {
            return Err(validation_error(
                "vehicles",
                format!("Vehicle number {} appears more than once", vehicle.vehicle_number),
            ));
        }
        vehicles.push(vehicle);
    }
    Ok(vehicles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::errors::AppError;

    fn vehicle(number: &str) -> VehicleInput {
        VehicleInput {
            id: None,
            vehicle_number: number.to_string(),
            brand: Some("Maruti".to_string()),
            model: Some("Swift".to_string()),
            fuel_type: "Petrol".to_string(),
            vehicle_type: "Car".to_string(),
            registration_date: None,
            insurance_expiry: None,
        }
    }

    fn request() -> CreateCustomerRequest {
        CreateCustomerRequest {
            name: "A. Sharma".to_string(),
            mobile: "9876543210".to_string(),
            alternate_number: Some("".to_string()),
            email: Some("a.sharma@example.com".to_string()),
            address: None,
            vehicles: vec![vehicle("mh12ab1234")],
        }
    }

    #[test]
    fn test_new_customer_normalizes_fields() {
        let customer = Customer::new(request()).unwrap();
        assert_eq!(customer.alternate_number, None);
        assert_eq!(customer.vehicles[0].vehicle_number, "MH12AB1234");
        assert!(customer.has_vehicle_number("mh12ab1234"));
        assert_eq!(customer.contact_email(), Some("a.sharma@example.com"));
    }

    #[test]
    fn test_missing_required_fields_fail_validation() {
        let mut bad = request();
        bad.name = "".to_string();
        bad.mobile = "".to_string();
        let errors = bad.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
        assert!(errors.field_errors().contains_key("mobile"));
    }

    #[test]
    fn test_vehicle_requires_number_fuel_and_type() {
        let mut input = vehicle("");
        input.fuel_type = " ".to_string();
        input.vehicle_type = "".to_string();
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("vehicle_number"));
        assert!(fields.contains_key("fuel_type"));
        assert!(fields.contains_key("vehicle_type"));
    }

    #[test]
    fn test_duplicate_vehicle_numbers_are_rejected() {
        let mut req = request();
        req.vehicles.push(vehicle("MH12AB1234 "));
        assert!(matches!(Customer::new(req), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_update_clears_email_with_empty_string() {
        let mut customer = Customer::new(request()).unwrap();
        customer
            .apply_update(UpdateCustomerRequest {
                email: Some("".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(customer.email, None);
        assert_eq!(customer.contact_email(), None);
    }

    #[test]
    fn test_add_and_remove_vehicle() {
        let mut customer = Customer::new(request()).unwrap();
        let added = customer.add_vehicle(vehicle("KA01XY9999")).unwrap();
        assert_eq!(customer.vehicles.len(), 2);
        assert!(customer.add_vehicle(vehicle("ka01xy9999")).is_err());
        assert!(customer.remove_vehicle(added.id));
        assert!(!customer.remove_vehicle(added.id));
    }

    #[test]
    fn test_search_matches_name_mobile_and_plate() {
        let customer = Customer::new(request()).unwrap();
        assert!(customer.matches_search("sharma"));
        assert!(customer.matches_search("98765"));
        assert!(customer.matches_search("ab12"));
        assert!(!customer.matches_search("verma"));
    }
}
