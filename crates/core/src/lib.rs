pub mod audit;
pub mod config;
pub mod domain;
pub mod errors;
pub mod flows;
pub mod purchase;
pub mod session;

pub use domain::product::{NavigationParams, ProductId, PurchaseRequest};
pub use domain::registration::{RegistrationRequest, UserId};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use flows::{
    ConfirmationState, FlowAction, FlowContext, FlowEngine, FlowEvent, FlowTransitionError,
    PurchaseFlow, TransitionOutcome,
};
pub use purchase::{PurchaseDraft, QuantityError};
pub use session::{PaymentHandoff, PurchaseSession, DEFAULT_PAYMENT_DESTINATION};
