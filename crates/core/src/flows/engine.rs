use thiserror::Error;

use crate::audit::{AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink};
use crate::flows::states::{
    ConfirmationState, FlowAction, FlowContext, FlowEvent, TransitionOutcome,
};
use crate::purchase::QuantityError;

pub trait FlowDefinition {
    fn initial_state(&self) -> ConfirmationState;
    fn transition(
        &self,
        current: &ConfirmationState,
        event: &FlowEvent,
        context: &FlowContext,
    ) -> Result<TransitionOutcome, FlowTransitionError>;
}

/// Two-step purchase confirmation: request, then confirm or cancel.
#[derive(Clone, Debug, Default)]
pub struct PurchaseFlow;

impl FlowDefinition for PurchaseFlow {
    fn initial_state(&self) -> ConfirmationState {
        ConfirmationState::Idle
    }

    fn transition(
        &self,
        current: &ConfirmationState,
        event: &FlowEvent,
        context: &FlowContext,
    ) -> Result<TransitionOutcome, FlowTransitionError> {
        transition_purchase(current, event, context)
    }
}

#[derive(Clone, Debug)]
pub struct FlowEngine<F> {
    flow: F,
}

impl<F> FlowEngine<F>
where
    F: FlowDefinition,
{
    pub fn new(flow: F) -> Self {
        Self { flow }
    }

    pub fn initial_state(&self) -> ConfirmationState {
        self.flow.initial_state()
    }

    pub fn apply(
        &self,
        current: &ConfirmationState,
        event: &FlowEvent,
        context: &FlowContext,
    ) -> Result<TransitionOutcome, FlowTransitionError> {
        self.flow.transition(current, event, context)
    }

    pub fn apply_with_audit<S>(
        &self,
        current: &ConfirmationState,
        event: &FlowEvent,
        context: &FlowContext,
        sink: &S,
        audit: &AuditContext,
    ) -> Result<TransitionOutcome, FlowTransitionError>
    where
        S: AuditSink + ?Sized,
    {
        let result = self.apply(current, event, context);
        match &result {
            Ok(outcome) => {
                sink.emit(
                    AuditEvent::new(
                        audit,
                        "flow.transition_applied",
                        AuditCategory::Flow,
                        AuditOutcome::Success,
                    )
                    .with_metadata("from", format!("{:?}", outcome.from))
                    .with_metadata("to", format!("{:?}", outcome.to))
                    .with_metadata("event", format!("{:?}", outcome.event)),
                );
            }
            Err(error) => {
                sink.emit(
                    AuditEvent::new(
                        audit,
                        "flow.transition_rejected",
                        AuditCategory::Flow,
                        AuditOutcome::Rejected,
                    )
                    .with_metadata("event", format!("{event:?}"))
                    .with_metadata("error", error.to_string()),
                );
            }
        }
        result
    }
}

impl Default for FlowEngine<PurchaseFlow> {
    fn default() -> Self {
        Self::new(PurchaseFlow)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FlowTransitionError {
    #[error("purchase blocked in {state:?} while the quantity is invalid: {error}")]
    ValidationPending { state: ConfirmationState, error: QuantityError },
    #[error("invalid transition from {state:?} using event {event:?}")]
    InvalidTransition { state: ConfirmationState, event: FlowEvent },
}

fn transition_purchase(
    current: &ConfirmationState,
    event: &FlowEvent,
    context: &FlowContext,
) -> Result<TransitionOutcome, FlowTransitionError> {
    use ConfirmationState::{AwaitingConfirmation, Confirmed, Idle};
    use FlowAction::{
        DismissConfirmationPrompt, NavigateToPayment, RecomputeDraft, ShowConfirmationPrompt,
    };
    use FlowEvent::{CancelRequested, ConfirmRequested, PurchaseRequested, QuantityChanged};

    let (to, actions) = match (current, event) {
        (Idle, QuantityChanged) => (Idle, vec![RecomputeDraft]),
        (Idle, PurchaseRequested) => {
            ensure_valid_quantity(current, context)?;
            (AwaitingConfirmation, vec![ShowConfirmationPrompt])
        }
        (AwaitingConfirmation, ConfirmRequested) => {
            ensure_valid_quantity(current, context)?;
            (Confirmed, vec![DismissConfirmationPrompt, NavigateToPayment])
        }
        (AwaitingConfirmation, PurchaseRequested) => (AwaitingConfirmation, Vec::new()),
        (AwaitingConfirmation, CancelRequested) => (Idle, vec![DismissConfirmationPrompt]),
        (Idle, CancelRequested) => (Idle, Vec::new()),
        _ => {
            return Err(FlowTransitionError::InvalidTransition {
                state: *current,
                event: event.clone(),
            });
        }
    };

    Ok(TransitionOutcome { from: *current, to, event: event.clone(), actions })
}

fn ensure_valid_quantity(
    current: &ConfirmationState,
    context: &FlowContext,
) -> Result<(), FlowTransitionError> {
    match &context.validation_error {
        Some(error) => Err(FlowTransitionError::ValidationPending {
            state: *current,
            error: error.clone(),
        }),
        None => Ok(()),
    }
}
