use uuid::Uuid;
use validator::Validate;

use crate::controllers::validate_each;
use crate::dto::api_response::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::customer::{
    CreateCustomerRequest, Customer, CustomerFilters, UpdateCustomerRequest, VehicleInput,
};
use crate::models::gst_bill::BillFilters;
use crate::repositories::Repositories;
use crate::services::access_policy::{authorize, Action, Feature};
use crate::utils::errors::{not_found_error, AppError, AppResult};

pub struct CustomerController {
    repos: Repositories,
}

impl CustomerController {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        request: CreateCustomerRequest,
    ) -> AppResult<ApiResponse<Customer>> {
        authorize(user.role, Feature::Customers, Action::Write)?;
        request.validate()?;
        validate_each(&request.vehicles)?;

        let customer = Customer::new(request)?;
        let customer = self.repos.customers.create(&customer).await?;

        log::info!("👤 Cliente creado: {} ({})", customer.name, customer.id);
        Ok(ApiResponse::success_with_message(customer, "Customer created successfully"))
    }

    pub async fn list(
        &self,
        user: &AuthenticatedUser,
        filters: CustomerFilters,
    ) -> AppResult<Vec<Customer>> {
        authorize(user.role, Feature::Customers, Action::Read)?;
        self.repos.customers.list(&filters).await
    }

    pub async fn get(&self, user: &AuthenticatedUser, id: Uuid) -> AppResult<Customer> {
        authorize(user.role, Feature::Customers, Action::Read)?;
        self.find(id).await
    }

    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        request: UpdateCustomerRequest,
    ) -> AppResult<ApiResponse<Customer>> {
        authorize(user.role, Feature::Customers, Action::Write)?;
        request.validate()?;
        if let Some(vehicles) = &request.vehicles {
            validate_each(vehicles)?;
        }

        let mut customer = self.find(id).await?;
        customer.apply_update(request)?;
        let customer = self.save(customer).await?;

        Ok(ApiResponse::success_with_message(customer, "Customer updated successfully"))
    }

    /// Rechaza el borrado si hay órdenes o facturas que lo referencian
    pub async fn delete(&self, user: &AuthenticatedUser, id: Uuid) -> AppResult<ApiResponse<()>> {
        authorize(user.role, Feature::Customers, Action::Delete)?;
        self.find(id).await?;

        let job_cards = self.repos.job_cards.count_by_customer(id).await?;
        let bills = self.repos.gst_bills.count_by_customer(id).await?
            + self.repos.non_gst_bills.count_by_customer(id).await?;
        if job_cards > 0 || bills > 0 {
            return Err(AppError::Conflict(format!(
                "Customer is referenced by {} job card(s) and {} bill(s)",
                job_cards, bills
            )));
        }

        if !self.repos.customers.delete(id).await? {
            return Err(not_found_error("Customer", &id.to_string()));
        }

        log::info!("🗑️ Cliente eliminado: {}", id);
        Ok(ApiResponse::message("Customer deleted successfully"))
    }

    pub async fn add_vehicle(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        input: VehicleInput,
    ) -> AppResult<ApiResponse<Customer>> {
        authorize(user.role, Feature::Customers, Action::Write)?;
        input.validate()?;

        let mut customer = self.find(id).await?;
        let vehicle = customer.add_vehicle(input)?;
        let customer = self.save(customer).await?;

        log::info!("🚗 Vehículo {} añadido al cliente {}", vehicle.vehicle_number, id);
        Ok(ApiResponse::success_with_message(customer, "Vehicle added successfully"))
    }

    /// Un vehículo facturado no se puede quitar
    pub async fn remove_vehicle(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        vehicle_id: Uuid,
    ) -> AppResult<ApiResponse<Customer>> {
        authorize(user.role, Feature::Customers, Action::Write)?;

        let mut customer = self.find(id).await?;
        if !customer.remove_vehicle(vehicle_id) {
            return Err(not_found_error("Vehicle", &vehicle_id.to_string()));
        }

        let filters = BillFilters {
            customer_id: Some(id),
            ..Default::default()
        };
        let billed = self
            .repos
            .gst_bills
            .list(&filters)
            .await?
            .iter()
            .any(|b| b.vehicle_id == vehicle_id)
            || self
                .repos
                .non_gst_bills
                .list(&filters)
                .await?
                .iter()
                .any(|b| b.vehicle_id == vehicle_id);
        if billed {
            return Err(AppError::Conflict(
                "Vehicle is referenced by existing bills".to_string(),
            ));
        }

        let customer = self.save(customer).await?;
        Ok(ApiResponse::success_with_message(customer, "Vehicle removed successfully"))
    }

    async fn find(&self, id: Uuid) -> AppResult<Customer> {
        self.repos
            .customers
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Customer", &id.to_string()))
    }

    async fn save(&self, customer: Customer) -> AppResult<Customer> {
        let id = customer.id;
        self.repos
            .customers
            .update(&customer)
            .await?
            .ok_or_else(|| not_found_error("Customer", &id.to_string()))
    }
}
