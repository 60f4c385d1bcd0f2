use agribazaar_core::InterfaceError;
use axum::http::StatusCode;

pub fn status_for(error: &InterfaceError) -> StatusCode {
    match error {
        InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        InterfaceError::UpstreamFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn message_of(error: &InterfaceError) -> &str {
    match error {
        InterfaceError::BadRequest { message, .. }
        | InterfaceError::UpstreamFailure { message, .. } => message,
    }
}
