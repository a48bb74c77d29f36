//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos del taller junto con sus
//! requests de alta/actualización y filtros de listado.

pub mod customer;
pub mod expense;
pub mod expense_category;
pub mod garage;
pub mod gst;
pub mod gst_bill;
pub mod item;
pub mod job_card;
pub mod mechanic;
pub mod non_gst_bill;
pub mod permission;
pub mod user;
