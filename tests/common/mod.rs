#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use garage_service::config::environment::EnvironmentConfig;
use garage_service::repositories::Repositories;
use garage_service::services::mailer::{EmailMessage, MailError, Mailer};
use garage_service::{create_app, AppState};

pub const ADMIN_EMAIL: &str = "admin@garage.test";
pub const PASSWORD: &str = "Secret123";

/// Guarda los correos en memoria
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<EmailMessage>>,
}

impl RecordingMailer {
    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Rechaza todo
pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _message: &EmailMessage) -> Result<(), MailError> {
        Err(MailError::Rejected {
            status: 503,
            body: "unavailable".to_string(),
        })
    }
}

/// No responde nunca para `stalled`; el resto se entrega normalmente
pub struct HangingMailer {
    pub stalled: String,
    pub delivered: RecordingMailer,
}

impl HangingMailer {
    pub fn new(stalled: &str) -> Self {
        Self {
            stalled: stalled.to_string(),
            delivered: RecordingMailer::default(),
        }
    }
}

#[async_trait]
impl Mailer for HangingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        if message.to == self.stalled {
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
        self.delivered.send(message).await
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub mailer: Arc<RecordingMailer>,
}

impl TestApp {
    pub fn new() -> Self {
        let mailer = Arc::new(RecordingMailer::default());
        let state = AppState::new(
            EnvironmentConfig::for_tests(),
            Repositories::in_memory(),
            mailer.clone(),
        );
        Self {
            router: create_app(state.clone()),
            state,
            mailer,
        }
    }

    pub fn repos(&self) -> &Repositories {
        &self.state.repos
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    pub async fn login(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    /// Registra el primer usuario (queda como admin) y devuelve su token
    pub async fn admin_token(&self) -> String {
        let (status, _) = self
            .request(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({ "fullName": "Garage Admin", "email": ADMIN_EMAIL, "password": PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        self.token_for(ADMIN_EMAIL).await
    }

    /// Crea un usuario con el rol dado (como admin) y devuelve su token
    pub async fn user_token(&self, admin_token: &str, email: &str, role: &str) -> String {
        let (status, body) = self
            .post(
                "/api/users",
                admin_token,
                json!({ "fullName": "Staff Member", "email": email, "password": PASSWORD, "role": role }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        self.token_for(email).await
    }

    pub async fn token_for(&self, email: &str) -> String {
        let (status, body) = self.login(email, PASSWORD).await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        body["token"].as_str().unwrap().to_string()
    }

    /// Cliente con un vehículo; devuelve (customer_id, vehicle_id)
    pub async fn customer_with_vehicle(&self, token: &str) -> (String, String) {
        let (status, body) = self
            .post(
                "/api/customers",
                token,
                json!({
                    "name": "A. Sharma",
                    "mobile": "9876543210",
                    "email": "sharma@example.com",
                    "vehicles": [{
                        "vehicleNumber": "MH12AB1234",
                        "fuelType": "Petrol",
                        "vehicleType": "Car"
                    }]
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        let customer = &body["data"];
        (
            customer["id"].as_str().unwrap().to_string(),
            customer["vehicles"][0]["id"].as_str().unwrap().to_string(),
        )
    }
}
