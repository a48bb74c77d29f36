//! Capa de acceso a datos
//!
//! Cada entidad expone un trait de repositorio con una implementación
//! PostgreSQL y otra en memoria. `Repositories` agrupa las de un mismo
//! backend y se elige una sola vez al arrancar.

pub mod customer_repository;
pub mod expense_category_repository;
pub mod expense_repository;
pub mod garage_repository;
pub mod gst_bill_repository;
pub mod item_repository;
pub mod job_card_repository;
pub mod mechanic_repository;
pub mod memory;
pub mod non_gst_bill_repository;
pub mod permission_repository;
pub mod user_repository;

use std::sync::Arc;

use sqlx::PgPool;

use crate::utils::errors::AppError;

use customer_repository::{CustomerRepository, MemoryCustomerRepository, PgCustomerRepository};
use expense_category_repository::{
    ExpenseCategoryRepository, MemoryExpenseCategoryRepository, PgExpenseCategoryRepository,
};
use expense_repository::{ExpenseRepository, MemoryExpenseRepository, PgExpenseRepository};
use garage_repository::{GarageRepository, MemoryGarageRepository, PgGarageRepository};
use gst_bill_repository::{GstBillRepository, MemoryGstBillRepository, PgGstBillRepository};
use item_repository::{ItemRepository, MemoryItemRepository, PgItemRepository};
use job_card_repository::{JobCardRepository, MemoryJobCardRepository, PgJobCardRepository};
use mechanic_repository::{MechanicRepository, MemoryMechanicRepository, PgMechanicRepository};
use non_gst_bill_repository::{
    MemoryNonGstBillRepository, NonGstBillRepository, PgNonGstBillRepository,
};
use permission_repository::{
    MemoryPermissionRepository, PermissionRepository, PgPermissionRepository,
};
use user_repository::{MemoryUserRepository, PgUserRepository, UserRepository};

/// Todos los repositorios de la aplicación
#[derive(Clone)]
pub struct Repositories {
    pub customers: Arc<dyn CustomerRepository>,
    pub mechanics: Arc<dyn MechanicRepository>,
    pub users: Arc<dyn UserRepository>,
    pub job_cards: Arc<dyn JobCardRepository>,
    pub items: Arc<dyn ItemRepository>,
    pub gst_bills: Arc<dyn GstBillRepository>,
    pub non_gst_bills: Arc<dyn NonGstBillRepository>,
    pub expenses: Arc<dyn ExpenseRepository>,
    pub expense_categories: Arc<dyn ExpenseCategoryRepository>,
    pub garages: Arc<dyn GarageRepository>,
    pub permissions: Arc<dyn PermissionRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            customers: Arc::new(PgCustomerRepository::new(pool.clone())),
            mechanics: Arc::new(PgMechanicRepository::new(pool.clone())),
            users: Arc::new(PgUserRepository::new(pool.clone())),
            job_cards: Arc::new(PgJobCardRepository::new(pool.clone())),
            items: Arc::new(PgItemRepository::new(pool.clone())),
            gst_bills: Arc::new(PgGstBillRepository::new(pool.clone())),
            non_gst_bills: Arc::new(PgNonGstBillRepository::new(pool.clone())),
            expenses: Arc::new(PgExpenseRepository::new(pool.clone())),
            expense_categories: Arc::new(PgExpenseCategoryRepository::new(pool.clone())),
            garages: Arc::new(PgGarageRepository::new(pool.clone())),
            permissions: Arc::new(PgPermissionRepository::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            customers: Arc::new(MemoryCustomerRepository::default()),
            mechanics: Arc::new(MemoryMechanicRepository::default()),
            users: Arc::new(MemoryUserRepository::default()),
            job_cards: Arc::new(MemoryJobCardRepository::default()),
            items: Arc::new(MemoryItemRepository::default()),
            gst_bills: Arc::new(MemoryGstBillRepository::default()),
            non_gst_bills: Arc::new(MemoryNonGstBillRepository::default()),
            expenses: Arc::new(MemoryExpenseRepository::default()),
            expense_categories: Arc::new(MemoryExpenseCategoryRepository::default()),
            garages: Arc::new(MemoryGarageRepository::default()),
            permissions: Arc::new(MemoryPermissionRepository::default()),
        }
    }
}

/// Traduce errores de sqlx: violaciones de unicidad o de clave foránea son
/// conflictos; el resto, errores de base de datos genéricos.
pub(crate) fn db_error(context: &str, error: sqlx::Error) -> AppError {
    if let Some(db_err) = error.as_database_error() {
        if db_err.is_unique_violation() {
            return AppError::Conflict(format!("{}: a record with the same unique value already exists", context));
        }
        if db_err.is_foreign_key_violation() {
            return AppError::Conflict(format!("{}: the record is still referenced or references a missing record", context));
        }
    }
    log::error!("❌ {}: {}", context, error);
    AppError::Database(error)
}

/// Escapa comodines de LIKE en un término de búsqueda
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(" ab_1 "), "%ab\\_1%");
        assert_eq!(like_pattern("50%"), "%50\\%%");
    }

    #[test]
    fn test_non_database_errors_stay_generic() {
        let error = db_error("Error finding customer", sqlx::Error::RowNotFound);
        assert!(matches!(error, AppError::Database(_)));
    }
}
