//! Backend de gestión de taller
//!
//! API REST para clientes y vehículos, órdenes de trabajo, facturación con
//! y sin GST, gastos, usuarios y permisos, más la tarea periódica de
//! recordatorios de servicio por email.

pub mod client;
pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

pub use routes::create_app;
pub use state::AppState;
