//! Hash y verificación de contraseñas con bcrypt
//!
//! Los controladores llaman a estas funciones antes de escribir un usuario;
//! el repositorio solo ve el hash.

use std::sync::OnceLock;

use bcrypt::{hash, verify};

use crate::utils::errors::{AppError, AppResult};

pub fn hash_password(password: &str, cost: u32) -> AppResult<String> {
    hash(password, cost).map_err(|e| AppError::Hash(format!("Error hashing password: {}", e)))
}

pub fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    verify(password, password_hash)
        .map_err(|e| AppError::Hash(format!("Error verifying password: {}", e)))
}

/// Hash de relleno con el mismo coste que los reales
fn dummy_hash(cost: u32) -> Option<&'static str> {
    static DUMMY: OnceLock<Option<String>> = OnceLock::new();
    DUMMY
        .get_or_init(|| hash("no-such-account", cost).ok())
        .as_deref()
}

/// Verifica contra el hash de relleno para que un email desconocido
/// tarde lo mismo que una contraseña incorrecta
pub fn verify_against_dummy(password: &str, cost: u32) {
    if let Some(dummy) = dummy_hash(cost) {
        let _ = verify(password, dummy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_is_exact() {
        let hashed = hash_password("Secret123", 4).unwrap();
        assert_ne!(hashed, "Secret123");
        assert!(verify_password("Secret123", &hashed).unwrap());
        assert!(!verify_password("secret123", &hashed).unwrap());
        assert!(!verify_password("Secret1234", &hashed).unwrap());
    }

    #[test]
    fn test_dummy_hash_never_matches() {
        let dummy = dummy_hash(4).unwrap();
        assert!(dummy.starts_with("$2"));
        assert!(!verify_password("Secret123", dummy).unwrap());
        verify_against_dummy("Secret123", 4);
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(matches!(
            verify_password("Secret123", "not-a-hash"),
            Err(AppError::Hash(_))
        ));
    }
}
