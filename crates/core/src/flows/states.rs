use serde::{Deserialize, Serialize};

use crate::purchase::QuantityError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfirmationState {
    #[default]
    Idle,
    AwaitingConfirmation,
    Confirmed,
}

impl ConfirmationState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Confirmed)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowEvent {
    QuantityChanged,
    PurchaseRequested,
    CancelRequested,
    ConfirmRequested,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FlowContext {
    pub validation_error: Option<QuantityError>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowAction {
    RecomputeDraft,
    ShowConfirmationPrompt,
    DismissConfirmationPrompt,
    NavigateToPayment,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub from: ConfirmationState,
    pub to: ConfirmationState,
    pub event: FlowEvent,
    pub actions: Vec<FlowAction>,
}
