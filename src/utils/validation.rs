//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validación de datos.
//! Las funciones `validate_*` se usan desde `#[validate(custom = "...")]`
//! en los requests de los modelos.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use validator::ValidationError;

lazy_static! {
    /// GSTIN: 2 dígitos de estado, PAN (5 letras, 4 dígitos, 1 letra), entidad, 'Z', checksum
    pub static ref GSTIN_REGEX: Regex =
        Regex::new(r"^[0-9]{2}[A-Z]{5}[0-9]{4}[A-Z][1-9A-Z]Z[0-9A-Z]$").unwrap();
    pub static ref HEX_COLOR_REGEX: Regex = Regex::new(r"^#(?:[0-9a-fA-F]{3}){1,2}$").unwrap();
}

/// Validar que un string no esté vacío
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_blank");
        error.message = Some("This field is required".into());
        return Err(error);
    }
    Ok(())
}

/// Validar formato de teléfono (básico)
pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    let clean_phone = value.chars().filter(|c| c.is_ascii_digit()).collect::<String>();
    if clean_phone.len() < 10 || clean_phone.len() > 15 {
        let mut error = ValidationError::new("phone");
        error.add_param("value".into(), &value.to_string());
        error.message = Some("Phone number must contain 10 to 15 digits".into());
        return Err(error);
    }
    Ok(())
}

/// Teléfono opcional: "" significa "borrar el valor"
pub fn validate_phone_or_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Ok(());
    }
    validate_phone(value)
}

/// Email opcional: "" significa "borrar el valor"
pub fn validate_email_or_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() || validator::validate_email(value.trim()) {
        return Ok(());
    }
    let mut error = ValidationError::new("email");
    error.add_param("value".into(), &value.to_string());
    Err(error)
}

/// Validar que un importe no sea negativo
pub fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut error = ValidationError::new("non_negative");
        error.add_param("value".into(), &value.to_string());
        error.message = Some("Amount must not be negative".into());
        return Err(error);
    }
    Ok(())
}

/// Validar formato GSTIN
pub fn validate_gstin(value: &str) -> Result<(), ValidationError> {
    if !GSTIN_REGEX.is_match(&value.trim().to_uppercase()) {
        let mut error = ValidationError::new("gstin");
        error.add_param("value".into(), &value.to_string());
        error.message = Some("GSTIN must look like 22AAAAA0000A1Z5".into());
        return Err(error);
    }
    Ok(())
}

/// Validar color hexadecimal (#RGB o #RRGGBB)
pub fn validate_hex_color(value: &str) -> Result<(), ValidationError> {
    if !HEX_COLOR_REGEX.is_match(value.trim()) {
        let mut error = ValidationError::new("color");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Limpia un campo opcional: recorta espacios y convierte "" en None
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Normaliza emails para comparaciones de unicidad
pub fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Normaliza matrículas: mayúsculas y sin espacios extremos
pub fn normalize_vehicle_number(value: &str) -> String {
    value.trim().to_uppercase()
}
