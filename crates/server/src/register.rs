//! `POST /api/register`: forwards account creation to the user service.
//!
//! The route answers `201 {message, id}` when the user service accepts the
//! request, `500` with an empty body when it does not, and `405` for every other
//! method. Upstream failure details go to the log only. Every forwarded request
//! leaves a `Registration` audit event.

use std::sync::Arc;

use agribazaar_core::audit::{AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink};
use agribazaar_core::{ApplicationError, InterfaceError, RegistrationRequest};
use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use crate::backend::{UpstreamError, UserBackend};
use crate::errors::status_for;

pub const USER_CREATED_MESSAGE: &str = "User created successfully";

#[derive(Clone)]
pub struct RegisterState {
    backend: Arc<dyn UserBackend>,
    audit_sink: Arc<dyn AuditSink>,
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub id: String,
}

pub fn router(backend: Arc<dyn UserBackend>, audit_sink: Arc<dyn AuditSink>) -> Router {
    Router::new()
        .route("/api/register", any(register))
        .with_state(RegisterState { backend, audit_sink })
}

pub async fn register(State(state): State<RegisterState>, method: Method, body: Bytes) -> Response {
    if method != Method::POST {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    let correlation_id = Uuid::new_v4().to_string();
    let request = RegistrationRequest::from_json_slice(&body);
    let audit = AuditContext::new(None, None, correlation_id.as_str(), "registration-proxy");

    match state.backend.create_user(&request).await {
        Ok(id) => {
            state.audit_sink.emit(
                AuditEvent::new(
                    &audit,
                    "registration.user_created",
                    AuditCategory::Registration,
                    AuditOutcome::Success,
                )
                .with_metadata("user_id", id.0.as_str()),
            );
            let payload = RegisterResponse { message: USER_CREATED_MESSAGE.to_string(), id: id.0 };
            (StatusCode::CREATED, Json(payload)).into_response()
        }
        Err(upstream) => {
            log_upstream_failure(&correlation_id, &upstream);
            let interface =
                ApplicationError::Upstream(upstream.to_string()).into_interface(correlation_id);
            state.audit_sink.emit(failure_event(&audit, &interface));
            status_for(&interface).into_response()
        }
    }
}

fn failure_event(audit: &AuditContext, interface: &InterfaceError) -> AuditEvent {
    AuditEvent::new(
        audit,
        "registration.failed",
        AuditCategory::Registration,
        AuditOutcome::Failed,
    )
    .with_metadata("error", interface.to_string())
}

fn log_upstream_failure(correlation_id: &str, upstream: &UpstreamError) {
    match upstream {
        UpstreamError::Status { status, body } => error!(
            event_name = "registration.upstream_rejected",
            correlation_id = %correlation_id,
            status = *status,
            body = %body,
            "user service rejected registration"
        ),
        other => error!(
            event_name = "registration.upstream_failed",
            correlation_id = %correlation_id,
            error = %other,
            "user service request failed"
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use agribazaar_core::audit::{AuditCategory, AuditOutcome, InMemoryAuditSink};
    use agribazaar_core::{RegistrationRequest, UserId};
    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::{router, RegisterResponse, USER_CREATED_MESSAGE};
    use crate::backend::{UpstreamError, UserBackend};

    #[derive(Default)]
    struct FakeUserBackend {
        fail: bool,
        forwarded: Mutex<Vec<Value>>,
    }

    #[async_trait]
    impl UserBackend for FakeUserBackend {
        async fn create_user(
            &self,
            request: &RegistrationRequest,
        ) -> Result<UserId, UpstreamError> {
            if let Ok(mut forwarded) = self.forwarded.lock() {
                forwarded.push(serde_json::to_value(request.backend_payload()).unwrap_or_default());
            }
            if self.fail {
                return Err(UpstreamError::Status { status: 503, body: "down".to_string() });
            }
            Ok(UserId("42".to_string()))
        }
    }

    fn request(method: Method, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri("/api/register")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request builds")
    }

    fn app(backend: &Arc<FakeUserBackend>, sink: &InMemoryAuditSink) -> axum::Router {
        router(backend.clone(), Arc::new(sink.clone()))
    }

    const BODY: &str =
        r#"{"username":"amina","email":"amina@farm.test","password":"pw","role":"farmer"}"#;

    #[tokio::test]
    async fn post_returns_created_with_backend_id() {
        let backend = Arc::new(FakeUserBackend::default());
        let sink = InMemoryAuditSink::default();
        let response =
            app(&backend, &sink).oneshot(request(Method::POST, BODY)).await.expect("response");

        assert_eq!(response.status(), StatusCode::CREATED);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let payload: RegisterResponse = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(
            payload,
            RegisterResponse { message: USER_CREATED_MESSAGE.to_string(), id: "42".to_string() }
        );

        let forwarded = backend.forwarded.lock().expect("lock").clone();
        assert_eq!(forwarded[0]["name"], json!("amina"));
        assert_eq!(forwarded[0]["role"], json!("farmer"));

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].category, AuditCategory::Registration);
        assert_eq!(events[0].outcome, AuditOutcome::Success);
        assert_eq!(events[0].metadata.get("user_id").map(String::as_str), Some("42"));
    }

    #[tokio::test]
    async fn backend_failure_returns_empty_500() {
        let backend = Arc::new(FakeUserBackend { fail: true, ..FakeUserBackend::default() });
        let sink = InMemoryAuditSink::default();
        let response =
            app(&backend, &sink).oneshot(request(Method::POST, BODY)).await.expect("response");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        assert!(bytes.is_empty());

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "registration.failed");
        assert_eq!(events[0].category, AuditCategory::Registration);
        assert_eq!(events[0].outcome, AuditOutcome::Failed);
        assert!(events[0].metadata["error"].contains("status 503"));
        assert!(!events[0].correlation_id.is_empty());
    }

    #[tokio::test]
    async fn other_methods_are_not_allowed() {
        for method in [Method::GET, Method::PUT, Method::DELETE, Method::PATCH] {
            let backend = Arc::new(FakeUserBackend::default());
            let sink = InMemoryAuditSink::default();
            let response = app(&backend, &sink)
                .oneshot(request(method.clone(), BODY))
                .await
                .expect("response");

            assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
            assert!(backend.forwarded.lock().expect("lock").is_empty());
            assert!(sink.events().is_empty());
        }
    }

    #[tokio::test]
    async fn malformed_body_is_still_forwarded() {
        let backend = Arc::new(FakeUserBackend::default());
        let sink = InMemoryAuditSink::default();
        let response = app(&backend, &sink)
            .oneshot(request(Method::POST, "not json"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(backend.forwarded.lock().expect("lock")[0], json!({}));
    }
}
