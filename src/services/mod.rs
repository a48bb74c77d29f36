//! Lógica de negocio
//!
//! Cálculo de facturación, política de acceso por rol, contraseñas, envío
//! de correo y la tarea de recordatorios de servicio.

pub mod access_policy;
pub mod billing;
pub mod mailer;
pub mod password_service;
pub mod reminder_service;
