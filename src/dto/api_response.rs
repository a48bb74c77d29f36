use serde::{Deserialize, Serialize};

/// Envoltorio de las respuestas de escritura
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Respuesta sin datos (p. ej. tras un borrado)
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_omits_empty_fields() {
        let value = serde_json::to_value(ApiResponse::message("Customer deleted")).unwrap();
        assert_eq!(value, serde_json::json!({ "success": true, "message": "Customer deleted" }));

        let value = serde_json::to_value(ApiResponse::success(5)).unwrap();
        assert_eq!(value, serde_json::json!({ "success": true, "data": 5 }));
    }
}
