//! Errors returned to callers of the callable function

use serde::Serialize;

/// Structured, user-displayable failure of the callable function
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallableError {
    #[error("The function must be called while authenticated")]
    Unauthenticated,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CallableError {
    /// Error code as seen by client SDKs
    pub fn code(&self) -> &'static str {
        match self {
            CallableError::Unauthenticated => "unauthenticated",
            CallableError::InvalidArgument(_) => "invalid-argument",
            CallableError::Internal(_) => "internal",
        }
    }

    /// Canonical status name used in the wire envelope
    pub fn status(&self) -> &'static str {
        match self {
            CallableError::Unauthenticated => "UNAUTHENTICATED",
            CallableError::InvalidArgument(_) => "INVALID_ARGUMENT",
            CallableError::Internal(_) => "INTERNAL",
        }
    }

    /// HTTP status code for the wire envelope
    pub fn http_status(&self) -> u16 {
        match self {
            CallableError::Unauthenticated => 401,
            CallableError::InvalidArgument(_) => 400,
            CallableError::Internal(_) => 500,
        }
    }

    /// Body of the `error` field in the wire envelope
    pub fn to_wire(&self) -> WireError {
        WireError {
            status: self.status(),
            message: self.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WireError {
    pub status: &'static str,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(CallableError::Unauthenticated.code(), "unauthenticated");
        assert_eq!(CallableError::InvalidArgument("x".into()).code(), "invalid-argument");
        assert_eq!(CallableError::Internal("x".into()).code(), "internal");
    }

    #[test]
    fn test_wire_error() {
        let wire = serde_json::to_value(CallableError::InvalidArgument("no image".into()).to_wire()).unwrap();
        assert_eq!(wire["status"], "INVALID_ARGUMENT");
        assert_eq!(wire["message"], "Invalid argument: no image");
    }
}
