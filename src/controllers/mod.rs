//! Controladores
//!
//! Cada controlador valida la request, comprueba la política de acceso del
//! rol que llama y coordina los repositorios. Los handlers de `routes` solo
//! extraen parámetros y delegan aquí.

pub mod auth_controller;
pub mod customer_controller;
pub mod dashboard_controller;
pub mod expense_category_controller;
pub mod expense_controller;
pub mod garage_controller;
pub mod gst_bill_controller;
pub mod item_controller;
pub mod job_card_controller;
pub mod mechanic_controller;
pub mod non_gst_bill_controller;
pub mod permission_controller;
pub mod reminder_controller;
pub mod user_controller;

use validator::Validate;

use crate::utils::errors::AppResult;

/// Valida cada elemento de una colección anidada
pub(crate) fn validate_each<T: Validate>(items: &[T]) -> AppResult<()> {
    for item in items {
        item.validate()?;
    }
    Ok(())
}
