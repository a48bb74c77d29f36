//! Middleware de autenticación JWT
//!
//! Este módulo maneja la autenticación JWT, extracción de tokens
//! y verificación de usuarios autenticados.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{
    models::user::Role,
    state::AppState,
    utils::errors::{AppError, AppResult},
    utils::jwt::{extract_token_from_header, verify_token},
};

/// Usuario autenticado que se inyecta en las requests
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub role: Role,
}

/// Valida el token y carga el rol vigente del usuario
async fn authenticate(state: &AppState, auth_header: &str) -> AppResult<AuthenticatedUser> {
    let token = extract_token_from_header(auth_header)?;
    let claims = verify_token(token, &state.jwt_config())?;
    let user_id = claims.user_id()?;

    // El rol del token puede estar desactualizado; manda el almacenado
    let user = state
        .repos
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User no longer exists".to_string()))?;

    Ok(AuthenticatedUser {
        user_id: user.id,
        role: user.role,
    })
}

/// Middleware de autenticación JWT
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Authorization token required".to_string()))?;

    let user = authenticate(&state, auth_header).await?;
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Middleware opcional de autenticación (para rutas que pueden ser públicas o privadas)
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    if let Some(auth_header) = auth_header {
        match authenticate(&state, &auth_header).await {
            Ok(user) => {
                request.extensions_mut().insert(user);
            }
            Err(AppError::Database(e)) => return Err(AppError::Database(e)),
            Err(e) => log::debug!("🔓 Token opcional ignorado: {}", e),
        }
    }

    Ok(next.run(request).await)
}
