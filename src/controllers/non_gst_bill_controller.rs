use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

use crate::dto::api_response::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::gst_bill::BillFilters;
use crate::models::non_gst_bill::{
    CreateNonGstBillRequest, GarageSnapshot, NonGstBill, UpdateNonGstBillRequest,
};
use crate::repositories::Repositories;
use crate::services::access_policy::{authorize, Action, Feature};
use crate::services::billing::{self, NON_GST_INVOICE_PREFIX};
use crate::utils::errors::{conflict_error, not_found_error, validation_error, AppResult};
use crate::utils::validation::normalize_optional;

pub struct NonGstBillController {
    repos: Repositories,
}

impl NonGstBillController {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        request: CreateNonGstBillRequest,
    ) -> AppResult<ApiResponse<NonGstBill>> {
        authorize(user.role, Feature::Billing, Action::Write)?;
        request.validate()?;

        let customer = self
            .repos
            .customers
            .find_by_id(request.customer_id)
            .await?
            .ok_or_else(|| validation_error("customer_id", "Customer does not exist"))?;
        if customer.find_vehicle(request.vehicle_id).is_none() {
            return Err(validation_error(
                "vehicle_id",
                "Vehicle does not belong to the selected customer",
            ));
        }

        let items: HashMap<Uuid, Decimal> = self
            .repos
            .items
            .find_by_ids(&request.item_ids)
            .await?
            .into_iter()
            .map(|item| (item.id, item.amount))
            .collect();

        let mut amounts = Vec::with_capacity(request.item_ids.len());
        for item_id in &request.item_ids {
            let amount = items
                .get(item_id)
                .ok_or_else(|| validation_error("item_ids", format!("Item {} does not exist", item_id)))?;
            amounts.push(*amount);
        }

        let mechanic_charge = request.mechanic_charge.unwrap_or(Decimal::ZERO);
        let total_amount = billing::non_gst_total(amounts, mechanic_charge)?;
        let invoice_no = self.resolve_invoice_no(request.invoice_no).await?;
        let garage = self.garage_snapshot(user).await?;

        let now = Utc::now();
        let bill = NonGstBill {
            id: Uuid::new_v4(),
            customer_id: customer.id,
            vehicle_id: request.vehicle_id,
            invoice_no,
            invoice_date: request.invoice_date.unwrap_or_else(|| now.date_naive()),
            item_ids: request.item_ids,
            mechanic_charge,
            total_amount,
            additional_notes: normalize_optional(request.additional_notes),
            garage,
            created_at: now,
            updated_at: now,
        };

        let bill = self.repos.non_gst_bills.create(&bill).await?;
        log::info!("🧾 Factura {} emitida: total {}", bill.invoice_no, bill.total_amount);
        Ok(ApiResponse::success_with_message(bill, "Bill created successfully"))
    }

    pub async fn list(
        &self,
        user: &AuthenticatedUser,
        filters: BillFilters,
    ) -> AppResult<Vec<NonGstBill>> {
        authorize(user.role, Feature::Billing, Action::Read)?;
        self.repos.non_gst_bills.list(&filters).await
    }

    pub async fn get(&self, user: &AuthenticatedUser, id: Uuid) -> AppResult<NonGstBill> {
        authorize(user.role, Feature::Billing, Action::Read)?;
        self.find(id).await
    }

    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        request: UpdateNonGstBillRequest,
    ) -> AppResult<ApiResponse<NonGstBill>> {
        authorize(user.role, Feature::Billing, Action::Write)?;
        request.validate()?;

        let mut bill = self.find(id).await?;
        if request.additional_notes.is_some() {
            bill.additional_notes = normalize_optional(request.additional_notes);
        }
        bill.updated_at = Utc::now();

        let bill = self
            .repos
            .non_gst_bills
            .update(&bill)
            .await?
            .ok_or_else(|| not_found_error("Bill", &id.to_string()))?;
        Ok(ApiResponse::success_with_message(bill, "Bill updated successfully"))
    }

    pub async fn delete(&self, user: &AuthenticatedUser, id: Uuid) -> AppResult<ApiResponse<()>> {
        authorize(user.role, Feature::Billing, Action::Delete)?;
        if !self.repos.non_gst_bills.delete(id).await? {
            return Err(not_found_error("Bill", &id.to_string()));
        }
        Ok(ApiResponse::message("Bill deleted successfully"))
    }

    /// Perfil del emisor; si no tiene, el del taller
    async fn garage_snapshot(&self, user: &AuthenticatedUser) -> AppResult<GarageSnapshot> {
        let profile = match self.repos.garages.find_by_user(user.user_id).await? {
            Some(profile) => Some(profile),
            None => self.repos.garages.find_first().await?,
        };
        Ok(profile.as_ref().map(GarageSnapshot::from).unwrap_or_default())
    }

    async fn resolve_invoice_no(&self, requested: Option<String>) -> AppResult<String> {
        match normalize_optional(requested) {
            Some(invoice_no) => {
                if self.repos.non_gst_bills.invoice_no_exists(&invoice_no).await? {
                    return Err(conflict_error("Bill", "invoiceNo", &invoice_no));
                }
                Ok(invoice_no)
            }
            None => {
                let existing = self
                    .repos
                    .non_gst_bills
                    .invoice_numbers(NON_GST_INVOICE_PREFIX)
                    .await?;
                Ok(billing::next_invoice_no(
                    NON_GST_INVOICE_PREFIX,
                    existing.iter().map(String::as_str),
                ))
            }
        }
    }

    async fn find(&self, id: Uuid) -> AppResult<NonGstBill> {
        self.repos
            .non_gst_bills
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Bill", &id.to_string()))
    }
}
