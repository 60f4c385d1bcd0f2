pub mod engine;
pub mod states;

pub use engine::{FlowDefinition, FlowEngine, FlowTransitionError, PurchaseFlow};
pub use states::{ConfirmationState, FlowAction, FlowContext, FlowEvent, TransitionOutcome};
