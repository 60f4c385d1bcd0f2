//! Outbound client for the user service that owns account creation.

use std::time::Duration;

use agribazaar_core::config::BackendConfig;
use agribazaar_core::{RegistrationRequest, UserId};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("user service request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("user service responded with status {status}")]
    Status { status: u16, body: String },
    #[error("user service response body could not be read: {0}")]
    Body(#[source] reqwest::Error),
}

#[async_trait]
pub trait UserBackend: Send + Sync {
    async fn create_user(&self, request: &RegistrationRequest) -> Result<UserId, UpstreamError>;
}

#[derive(Clone, Debug)]
pub struct HttpUserBackend {
    client: Client,
    endpoint: String,
}

impl HttpUserBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(Duration::from_secs(config.timeout_secs)).build()?;
        Ok(Self { client, endpoint: config.user_endpoint.trim().to_string() })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl UserBackend for HttpUserBackend {
    async fn create_user(&self, request: &RegistrationRequest) -> Result<UserId, UpstreamError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request.backend_payload())
            .send()
            .await
            .map_err(UpstreamError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(UpstreamError::Body)?;
        if !status.is_success() {
            return Err(UpstreamError::Status { status: status.as_u16(), body });
        }

        Ok(parse_user_id(&body))
    }
}

/// The user service answers with the new id, either as JSON (a string, a number,
/// or an object with an `id` field) or as plain text.
pub fn parse_user_id(body: &str) -> UserId {
    let trimmed = body.trim();
    let id = match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::String(id)) => id,
        Ok(Value::Number(id)) => id.to_string(),
        Ok(Value::Object(map)) => match map.get("id") {
            Some(Value::String(id)) => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            _ => trimmed.to_string(),
        },
        _ => trimmed.to_string(),
    };
    UserId(id)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use agribazaar_core::config::BackendConfig;
    use agribazaar_core::RegistrationRequest;
    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    use super::{parse_user_id, HttpUserBackend, UpstreamError, UserBackend};

    type Received = Arc<Mutex<Vec<Value>>>;

    async fn spawn_user_service(status: StatusCode, reply: Value) -> (String, Received) {
        let received: Received = Arc::default();
        let app = Router::new()
            .route(
                "/api/user",
                post(move |State(received): State<Received>, Json(body): Json<Value>| async move {
                    if let Ok(mut bodies) = received.lock() {
                        bodies.push(body);
                    }
                    (status, Json(reply))
                }),
            )
            .with_state(received.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind backend");
        let address = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        (format!("http://{address}/api/user"), received)
    }

    fn backend(endpoint: String) -> HttpUserBackend {
        HttpUserBackend::new(&BackendConfig { user_endpoint: endpoint, timeout_secs: 5 })
            .expect("client builds")
    }

    fn registration() -> RegistrationRequest {
        RegistrationRequest::from_json_slice(
            br#"{"username":"kofi","email":"kofi@farm.test","password":"pw","role":"buyer"}"#,
        )
    }

    #[test]
    fn user_id_accepts_json_and_plain_text() {
        assert_eq!(parse_user_id("\"42\"").0, "42");
        assert_eq!(parse_user_id("42").0, "42");
        assert_eq!(parse_user_id(r#"{"id": 7}"#).0, "7");
        assert_eq!(parse_user_id(r#"{"id": "u-7"}"#).0, "u-7");
        assert_eq!(parse_user_id(" 64f0c2a9e1 \n").0, "64f0c2a9e1");
    }

    #[tokio::test]
    async fn forwards_registration_and_returns_created_id() {
        let (endpoint, received) = spawn_user_service(StatusCode::CREATED, json!("42")).await;

        let id = backend(endpoint).create_user(&registration()).await.expect("user created");

        assert_eq!(id.0, "42");
        let bodies = received.lock().expect("lock").clone();
        assert_eq!(
            bodies,
            vec![json!({ "name": "kofi", "email": "kofi@farm.test", "password": "pw", "role": "buyer" })]
        );
    }

    #[tokio::test]
    async fn non_success_status_is_an_upstream_error() {
        let (endpoint, _) =
            spawn_user_service(StatusCode::CONFLICT, json!({ "error": "email taken" })).await;

        let error = backend(endpoint).create_user(&registration()).await.expect_err("conflict");

        assert!(matches!(error, UpstreamError::Status { status: 409, ref body } if body.contains("email taken")));
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let address = listener.local_addr().expect("local addr");
        drop(listener);

        let error = backend(format!("http://{address}/api/user"))
            .create_user(&registration())
            .await
            .expect_err("nothing is listening");

        assert!(matches!(error, UpstreamError::Transport(_)));
    }
}
