use thiserror::Error;

use crate::{flows::FlowTransitionError, purchase::QuantityError};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error(transparent)]
    FlowTransition(#[from] FlowTransitionError),
    #[error("invalid purchase quantity: {0}")]
    Quantity(#[from] QuantityError),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("upstream failure: {0}")]
    Upstream(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("upstream request failed: {message}")]
    UpstreamFailure { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The request could not be processed. Check inputs and try again."
            }
            Self::UpstreamFailure { .. } => "The request could not be completed.",
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::UpstreamFailure { correlation_id, .. } => correlation_id,
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::UpstreamFailure { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        match value {
            ApplicationError::Domain(DomainError::Quantity(error)) => Self::BadRequest {
                message: error.to_string(),
                correlation_id: "unassigned".to_owned(),
            },
            ApplicationError::Domain(DomainError::FlowTransition(_)) => Self::BadRequest {
                message: "purchase flow rejected the request".to_owned(),
                correlation_id: "unassigned".to_owned(),
            },
            ApplicationError::Upstream(message) => {
                Self::UpstreamFailure { message, correlation_id: "unassigned".to_owned() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::{ApplicationError, DomainError, InterfaceError};
    use crate::flows::{ConfirmationState, FlowEvent, FlowTransitionError};
    use crate::purchase::QuantityError;

    #[test]
    fn quantity_error_maps_to_bad_request_with_inline_message() {
        let interface = ApplicationError::from(DomainError::from(QuantityError::ExceedsStock {
            available: 5,
        }))
        .into_interface("req-1");

        assert!(matches!(
            interface,
            InterfaceError::BadRequest {
                ref message,
                ref correlation_id,
            } if correlation_id == "req-1"
                && message == "Quantity cannot exceed available stock of 5"
        ));
    }

    #[test]
    fn flow_rejection_has_user_safe_message() {
        let interface = ApplicationError::from(DomainError::from(
            FlowTransitionError::InvalidTransition {
                state: ConfirmationState::Confirmed,
                event: FlowEvent::CancelRequested,
            },
        ))
        .into_interface("req-2");

        assert_eq!(
            interface.user_message(),
            "The request could not be processed. Check inputs and try again."
        );
        assert_eq!(interface.correlation_id(), "req-2");
    }

    #[test]
    fn upstream_error_maps_to_upstream_failure() {
        let interface =
            ApplicationError::Upstream("connection refused".to_owned()).into_interface("req-3");

        assert!(matches!(interface, InterfaceError::UpstreamFailure { .. }));
        assert_eq!(interface.user_message(), "The request could not be completed.");
    }
}
