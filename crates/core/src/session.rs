//! One buyer's interaction with the purchase page: the draft, the confirmation
//! state, and the hand-off to payment once the buyer confirms.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::{AuditContext, AuditSink};
use crate::domain::product::{NavigationParams, PurchaseRequest};
use crate::flows::{
    ConfirmationState, FlowContext, FlowEngine, FlowEvent, FlowTransitionError, PurchaseFlow,
    TransitionOutcome,
};
use crate::purchase::{initial_draft, set_quantity, PurchaseDraft};

pub const DEFAULT_PAYMENT_DESTINATION: &str = "/payment";

/// Navigation event emitted when a purchase is confirmed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentHandoff {
    pub destination: String,
    pub name: String,
    pub quantity: String,
    pub total_price: String,
}

impl PaymentHandoff {
    pub fn summary(&self) -> String {
        format!(
            "Purchasing {} unit(s) of {} for a total of ${}",
            self.quantity, self.name, self.total_price
        )
    }

    /// Query parameters carried to the payment destination, in order.
    pub fn query_pairs(&self) -> [(&'static str, &str); 3] {
        [
            ("name", self.name.as_str()),
            ("quantity", self.quantity.as_str()),
            ("totalPrice", self.total_price.as_str()),
        ]
    }
}

/// Serializable view of a session, enough to restore it elsewhere.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub request: PurchaseRequest,
    pub draft: PurchaseDraft,
    pub state: ConfirmationState,
    pub payment_destination: String,
}

struct SessionAudit {
    sink: Arc<dyn AuditSink>,
    context: AuditContext,
}

pub struct PurchaseSession {
    id: String,
    request: PurchaseRequest,
    draft: PurchaseDraft,
    state: ConfirmationState,
    payment_destination: String,
    engine: FlowEngine<PurchaseFlow>,
    audit: Option<SessionAudit>,
}

impl PurchaseSession {
    pub fn new(request: PurchaseRequest) -> Self {
        let engine = FlowEngine::default();
        Self {
            id: Uuid::new_v4().to_string(),
            draft: initial_draft(&request),
            state: engine.initial_state(),
            request,
            payment_destination: DEFAULT_PAYMENT_DESTINATION.to_string(),
            engine,
            audit: None,
        }
    }

    pub fn from_navigation(params: &NavigationParams) -> Self {
        Self::new(PurchaseRequest::from_navigation(params))
    }

    pub fn restore(snapshot: SessionSnapshot) -> Self {
        Self {
            id: snapshot.session_id,
            request: snapshot.request,
            draft: snapshot.draft,
            state: snapshot.state,
            payment_destination: snapshot.payment_destination,
            engine: FlowEngine::default(),
            audit: None,
        }
    }

    pub fn with_payment_destination(mut self, destination: impl Into<String>) -> Self {
        self.payment_destination = destination.into();
        self
    }

    /// Records every transition, applied or rejected, to `sink`.
    pub fn with_audit(
        mut self,
        sink: Arc<dyn AuditSink>,
        correlation_id: impl Into<String>,
        actor: impl Into<String>,
    ) -> Self {
        let context = AuditContext::new(
            Some(self.request.product_id.clone()),
            Some(self.id.clone()),
            correlation_id,
            actor,
        );
        self.audit = Some(SessionAudit { sink, context });
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn request(&self) -> &PurchaseRequest {
        &self.request
    }

    pub fn draft(&self) -> &PurchaseDraft {
        &self.draft
    }

    pub fn state(&self) -> ConfirmationState {
        self.state
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id.clone(),
            request: self.request.clone(),
            draft: self.draft.clone(),
            state: self.state,
            payment_destination: self.payment_destination.clone(),
        }
    }

    /// Applies raw quantity input. Only accepted while no confirmation prompt is
    /// open; the draft is left untouched otherwise.
    pub fn set_quantity(&mut self, raw: &str) -> Result<&PurchaseDraft, FlowTransitionError> {
        self.transition(FlowEvent::QuantityChanged)?;
        self.draft = set_quantity(&self.request, raw);
        Ok(&self.draft)
    }

    pub fn request_purchase(&mut self) -> Result<TransitionOutcome, FlowTransitionError> {
        self.transition(FlowEvent::PurchaseRequested)
    }

    pub fn cancel(&mut self) -> Result<TransitionOutcome, FlowTransitionError> {
        self.transition(FlowEvent::CancelRequested)
    }

    pub fn confirm(&mut self) -> Result<PaymentHandoff, FlowTransitionError> {
        self.transition(FlowEvent::ConfirmRequested)?;
        Ok(PaymentHandoff {
            destination: self.payment_destination.clone(),
            name: self.request.product_name.clone(),
            quantity: self.draft.requested_quantity.to_string(),
            total_price: self.draft.total_display(),
        })
    }

    /// Text of the confirmation prompt while one is open.
    pub fn confirmation_prompt(&self) -> Option<String> {
        (self.state == ConfirmationState::AwaitingConfirmation).then(|| {
            format!(
                "Are you sure you want to purchase {} unit(s) of {} for a total of ${}?",
                self.draft.requested_quantity,
                self.request.product_name,
                self.draft.total_display()
            )
        })
    }

    fn transition(&mut self, event: FlowEvent) -> Result<TransitionOutcome, FlowTransitionError> {
        let context = FlowContext { validation_error: self.draft.validation_error.clone() };
        let outcome = match &self.audit {
            Some(audit) => self.engine.apply_with_audit(
                &self.state,
                &event,
                &context,
                audit.sink.as_ref(),
                &audit.context,
            ),
            None => self.engine.apply(&self.state, &event, &context),
        }?;
        self.state = outcome.to;
        Ok(outcome)
    }
}
