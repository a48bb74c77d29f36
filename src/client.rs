//! Cliente HTTP para la API del taller
//!
//! La sesión (token + usuario) vive en un único objeto explícito: `login`
//! la establece, `logout` la borra y cada petición lee el token de ahí.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dto::api_response::ApiResponse;
use crate::dto::auth_dto::{AccessResponse, LoginRequest, LoginResponse};
use crate::dto::dashboard_dto::DashboardSummary;
use crate::models::customer::Customer;
use crate::models::user::UserResponse;
use crate::services::access_policy::{is_allowed, Action, Feature};
use crate::services::reminder_service::ReminderRunReport;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api {
        status: StatusCode,
        code: Option<String>,
        message: String,
    },

    #[error("Not logged in")]
    NotLoggedIn,
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Sesión autenticada
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: UserResponse,
}

impl Session {
    /// Misma tabla que aplica el servidor; sirve para ocultar navegación
    pub fn can(&self, feature: Feature, action: Action) -> bool {
        is_allowed(self.user.role, feature, action)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
    code: Option<String>,
}

/// Cliente de la API (base_url sin `/api`)
pub struct GarageClient {
    client: Client,
    base_url: String,
    session: Option<Session>,
}

impl GarageClient {
    pub fn new(base_url: &str) -> ClientResult<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session: None,
        })
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    /// Inicia sesión y guarda token y usuario
    pub async fn login(&mut self, email: &str, password: &str) -> ClientResult<&Session> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response: LoginResponse = self
            .send(self.request(Method::POST, "/api/auth/login").json(&request))
            .await?;

        log::info!("🔐 Sesión iniciada como {}", response.user.email);
        Ok(&*self.session.insert(Session {
            token: response.token,
            user: response.user,
        }))
    }

    pub fn logout(&mut self) {
        if let Some(session) = self.session.take() {
            log::info!("👋 Sesión cerrada para {}", session.user.email);
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.send(self.authorized(Method::GET, path)?).await
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> ClientResult<T> {
        self.send(self.authorized(Method::POST, path)?.json(body)).await
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> ClientResult<T> {
        self.send(self.authorized(Method::PUT, path)?.json(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.send(self.authorized(Method::DELETE, path)?).await
    }

    pub async fn me(&self) -> ClientResult<UserResponse> {
        self.get("/api/auth/me").await
    }

    pub async fn access(&self) -> ClientResult<AccessResponse> {
        self.get("/api/access").await
    }

    pub async fn list_customers(&self) -> ClientResult<Vec<Customer>> {
        self.get("/api/customers").await
    }

    pub async fn dashboard_summary(&self) -> ClientResult<DashboardSummary> {
        self.get("/api/dashboard/summary").await
    }

    pub async fn run_reminders(&self) -> ClientResult<ReminderRunReport> {
        let response: ApiResponse<ReminderRunReport> =
            self.post("/api/reminders/run", &serde_json::json!({})).await?;
        Ok(response.data.unwrap_or_default())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, format!("{}{}", self.base_url, path))
    }

    fn authorized(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let session = self.session.as_ref().ok_or(ClientError::NotLoggedIn)?;
        Ok(self.request(method, path).bearer_auth(&session.token))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let body = response.json::<ErrorBody>().await.ok();
        let (code, message) = match body {
            Some(body) => (
                body.code,
                body.message
                    .or(body.error)
                    .unwrap_or_else(|| status.to_string()),
            ),
            None => (None, status.to_string()),
        };
        log::warn!("⚠️ API respondió {}: {}", status, message);

        Err(ClientError::Api { status, code, message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requests_without_session_fail() {
        let client = GarageClient::new("http://localhost:8080/").unwrap();
        assert!(!client.is_logged_in());
        assert_eq!(client.base_url, "http://localhost:8080");
        assert!(matches!(
            client.authorized(Method::GET, "/api/customers"),
            Err(ClientError::NotLoggedIn)
        ));
    }
}
