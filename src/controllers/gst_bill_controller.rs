//! Facturas con GST
//!
//! Las líneas se calculan aquí antes de persistir: importe, GST y total por
//! línea, y después GST y total de la factura. Una vez emitida, la factura
//! solo admite cambiar el GSTIN del cliente.

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

use crate::controllers::validate_each;
use crate::dto::api_response::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::gst::GstRate;
use crate::models::gst_bill::{
    BillFilters, BillLineInput, CreateGstBillRequest, GstBill, GstBillLine, UpdateGstBillRequest,
};
use crate::repositories::Repositories;
use crate::services::access_policy::{authorize, Action, Feature};
use crate::services::billing::{self, GST_INVOICE_PREFIX};
use crate::utils::errors::{conflict_error, not_found_error, validation_error, AppResult};
use crate::utils::validation::normalize_optional;

pub struct GstBillController {
    repos: Repositories,
}

impl GstBillController {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        request: CreateGstBillRequest,
    ) -> AppResult<ApiResponse<GstBill>> {
        authorize(user.role, Feature::Billing, Action::Write)?;
        request.validate()?;
        validate_each(&request.lines)?;

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

        let mut lines = Vec::with_capacity(request.lines.len());
        for input in request.lines {
            lines.push(self.build_line(input).await?);
        }

        let mechanic_charge = request.mechanic_charge.unwrap_or(Decimal::ZERO);
        let totals = billing::gst_invoice_totals(&lines, mechanic_charge)?;
        let invoice_no = self.resolve_invoice_no(request.invoice_no).await?;

        let now = Utc::now();
        let bill = GstBill {
            id: Uuid::new_v4(),
            customer_id: customer.id,
            vehicle_id: request.vehicle_id,
            gstin: normalize_optional(request.gstin).map(|g| g.to_uppercase()),
            invoice_no,
            invoice_date: request.invoice_date.unwrap_or_else(|| now.date_naive()),
            lines,
            mechanic_charge,
            gst: totals.gst,
            total_amount: totals.total_amount,
            created_at: now,
            updated_at: now,
        };

        let bill = self.repos.gst_bills.create(&bill).await?;
        log::info!("🧾 Factura GST {} emitida: total {}", bill.invoice_no, bill.total_amount);
        Ok(ApiResponse::success_with_message(bill, "GST bill created successfully"))
    }

    pub async fn list(&self, user: &AuthenticatedUser, filters: BillFilters) -> AppResult<Vec<GstBill>> {
        authorize(user.role, Feature::Billing, Action::Read)?;
        self.repos.gst_bills.list(&filters).await
    }

    pub async fn get(&self, user: &AuthenticatedUser, id: Uuid) -> AppResult<GstBill> {
        authorize(user.role, Feature::Billing, Action::Read)?;
        self.find(id).await
    }

    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        request: UpdateGstBillRequest,
    ) -> AppResult<ApiResponse<GstBill>> {
        authorize(user.role, Feature::Billing, Action::Write)?;
        request.validate()?;

        let mut bill = self.find(id).await?;
        if request.gstin.is_some() {
            bill.gstin = normalize_optional(request.gstin).map(|g| g.to_uppercase());
        }
        bill.updated_at = Utc::now();

        let bill = self
            .repos
            .gst_bills
            .update(&bill)
            .await?
            .ok_or_else(|| not_found_error("GST bill", &id.to_string()))?;
        Ok(ApiResponse::success_with_message(bill, "GST bill updated successfully"))
    }

    pub async fn delete(&self, user: &AuthenticatedUser, id: Uuid) -> AppResult<ApiResponse<()>> {
        authorize(user.role, Feature::Billing, Action::Delete)?;
        if !self.repos.gst_bills.delete(id).await? {
            return Err(not_found_error("GST bill", &id.to_string()));
        }
        log::info!("🗑️ Factura GST eliminada: {}", id);
        Ok(ApiResponse::message("GST bill deleted successfully"))
    }

    /// Completa la línea con los datos del Item cuando viene `itemId`
    async fn build_line(&self, input: BillLineInput) -> AppResult<GstBillLine> {
        let item = match input.item_id {
            Some(item_id) => Some(
                self.repos
                    .items
                    .find_by_id(item_id)
                    .await?
                    .ok_or_else(|| validation_error("lines", format!("Item {} does not exist", item_id)))?,
            ),
            None => None,
        };

        let description = normalize_optional(input.description)
            .or_else(|| item.as_ref().map(|i| i.description.clone()))
            .ok_or_else(|| validation_error("lines", "Every line needs a description"))?;
        let hsn_code =
            normalize_optional(input.hsn_code).or_else(|| item.as_ref().and_then(|i| i.hsn_code.clone()));
        let quantity = input
            .quantity
            .or_else(|| item.as_ref().map(|i| i.quantity))
            .ok_or_else(|| validation_error("lines", "Every line needs a quantity"))?;
        let rate = input
            .rate
            .or_else(|| item.as_ref().map(|i| i.rate))
            .ok_or_else(|| validation_error("lines", "Every line needs a rate"))?;
        let gst_percent = input
            .gst_percent
            .or_else(|| item.as_ref().map(|i| i.gst_percent))
            .unwrap_or_default();

        line(input.item_id, description, hsn_code, quantity, rate, gst_percent)
    }

    async fn resolve_invoice_no(&self, requested: Option<String>) -> AppResult<String> {
        match normalize_optional(requested) {
            Some(invoice_no) => {
                if self.repos.gst_bills.invoice_no_exists(&invoice_no).await? {
                    return Err(conflict_error("GST bill", "invoiceNo", &invoice_no));
                }
                Ok(invoice_no)
            }
            None => {
                let existing = self.repos.gst_bills.invoice_numbers(GST_INVOICE_PREFIX).await?;
                Ok(billing::next_invoice_no(
                    GST_INVOICE_PREFIX,
                    existing.iter().map(String::as_str),
                ))
            }
        }
    }

    async fn find(&self, id: Uuid) -> AppResult<GstBill> {
        self.repos
            .gst_bills
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("GST bill", &id.to_string()))
    }
}

fn line(
    item_id: Option<Uuid>,
    description: String,
    hsn_code: Option<String>,
    quantity: i32,
    rate: Decimal,
    gst_percent: GstRate,
) -> AppResult<GstBillLine> {
    let amounts = billing::compute_line(quantity, rate, gst_percent)?;
    Ok(GstBillLine {
        item_id,
        description,
        hsn_code,
        quantity,
        rate,
        gst_percent,
        actual_amount: amounts.actual_amount,
        gst_amount: amounts.gst_amount,
        total_amount: amounts.total_amount,
    })
}
