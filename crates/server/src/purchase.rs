//! JSON surface for the purchase page.
//!
//! - `GET  /api/purchase/draft`: validate a quantity and price the draft
//! - `POST /api/purchase/checkout`: request, confirm and hand off to payment
//!
//! Both endpoints are stateless: each request builds its own purchase session
//! from the navigation parameters it carries.

use std::sync::Arc;

use agribazaar_core::audit::AuditSink;
use agribazaar_core::{
    ApplicationError, DomainError, FlowTransitionError, NavigationParams, PaymentHandoff,
    PurchaseSession,
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::{message_of, status_for};

#[derive(Clone)]
pub struct PurchaseState {
    payment_destination: String,
    audit_sink: Arc<dyn AuditSink>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PurchaseParams {
    pub id: Option<String>,
    pub name: Option<String>,
    pub price: Option<String>,
    pub quantity: Option<String>,
    pub buy: Option<String>,
}

impl PurchaseParams {
    fn navigation(&self) -> NavigationParams {
        NavigationParams {
            id: self.id.clone(),
            name: self.name.clone(),
            price: self.price.clone(),
            quantity: self.quantity.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftView {
    pub product_id: String,
    pub product_name: String,
    pub unit_price: String,
    pub available_stock: u32,
    pub quantity: u32,
    pub total_price: String,
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub session_id: String,
    pub handoff: PaymentHandoff,
    pub location: String,
    pub summary: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseError {
    pub error: String,
    pub message: String,
    pub correlation_id: String,
}

pub fn router(payment_destination: String, audit_sink: Arc<dyn AuditSink>) -> Router {
    Router::new()
        .route("/api/purchase/draft", get(draft))
        .route("/api/purchase/checkout", post(checkout))
        .with_state(PurchaseState { payment_destination, audit_sink })
}

pub async fn draft(
    State(state): State<PurchaseState>,
    Query(params): Query<PurchaseParams>,
) -> Result<Json<DraftView>, (StatusCode, Json<PurchaseError>)> {
    let correlation_id = Uuid::new_v4().to_string();
    let mut session = new_session(&state, &params, &correlation_id);

    if let Some(raw) = params.buy.as_deref() {
        session.set_quantity(raw).map_err(|error| rejection(error, &correlation_id))?;
    }

    Ok(Json(draft_view(&session)))
}

pub async fn checkout(
    State(state): State<PurchaseState>,
    Json(params): Json<PurchaseParams>,
) -> Result<Json<CheckoutResponse>, (StatusCode, Json<PurchaseError>)> {
    let correlation_id = Uuid::new_v4().to_string();
    let mut session = new_session(&state, &params, &correlation_id);

    let handoff = run_checkout(&mut session, params.buy.as_deref()).map_err(|error| {
        warn!(
            event_name = "purchase.checkout_rejected",
            correlation_id = %correlation_id,
            session_id = %session.id(),
            error = %error,
            "purchase checkout rejected"
        );
        rejection(error, &correlation_id)
    })?;

    info!(
        event_name = "purchase.checkout_confirmed",
        correlation_id = %correlation_id,
        session_id = %session.id(),
        product_id = %session.request().product_id.0,
        quantity = %handoff.quantity,
        total_price = %handoff.total_price,
        "purchase confirmed, handing off to payment"
    );

    Ok(Json(CheckoutResponse {
        session_id: session.id().to_string(),
        location: payment_location(&handoff),
        summary: handoff.summary(),
        handoff,
    }))
}

fn new_session(
    state: &PurchaseState,
    params: &PurchaseParams,
    correlation_id: &str,
) -> PurchaseSession {
    PurchaseSession::from_navigation(&params.navigation())
        .with_payment_destination(state.payment_destination.clone())
        .with_audit(state.audit_sink.clone(), correlation_id, "storefront")
}

fn run_checkout(
    session: &mut PurchaseSession,
    buy: Option<&str>,
) -> Result<PaymentHandoff, FlowTransitionError> {
    if let Some(raw) = buy {
        session.set_quantity(raw)?;
    }
    session.request_purchase()?;
    session.confirm()
}

fn draft_view(session: &PurchaseSession) -> DraftView {
    let request = session.request();
    let draft = session.draft();
    DraftView {
        product_id: request.product_id.0.clone(),
        product_name: request.product_name.clone(),
        unit_price: request.unit_price.to_string(),
        available_stock: request.available_stock,
        quantity: draft.requested_quantity,
        total_price: draft.total_display(),
        error: draft.validation_message(),
    }
}

/// Destination path with the hand-off parameters as an encoded query string.
fn payment_location(handoff: &PaymentHandoff) -> String {
    let Ok(mut url) = Url::parse("http://storefront.local") else {
        return handoff.destination.clone();
    };
    url.set_path(&handoff.destination);
    url.query_pairs_mut().extend_pairs(handoff.query_pairs());
    match url.query() {
        Some(query) => format!("{}?{query}", url.path()),
        None => url.path().to_string(),
    }
}

fn rejection(error: FlowTransitionError, correlation_id: &str) -> (StatusCode, Json<PurchaseError>) {
    let domain = match error {
        FlowTransitionError::ValidationPending { error, .. } => DomainError::Quantity(error),
        other => DomainError::FlowTransition(other),
    };
    let interface = ApplicationError::from(domain).into_interface(correlation_id);
    (
        status_for(&interface),
        Json(PurchaseError {
            error: interface.user_message().to_string(),
            message: message_of(&interface).to_string(),
            correlation_id: interface.correlation_id().to_string(),
        }),
    )
}
