//! Error kinds shared by every component of the engine.
//!
//! Failures are normalised as close to the transport as possible, so core logic only ever sees these types and
//! never inspects raw response shapes.
use thiserror::Error;

/// Precondition failures. These are raised locally, before any request is sent, and are never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("The cart is empty.")]
    EmptyCart,
    #[error("Sign in before confirming the order.")]
    MissingUser,
    #[error("An order id is required.")]
    MissingOrderId,
    #[error("An order status is required.")]
    MissingStatus,
    #[error("Sign in to see your orders.")]
    NotAuthenticated,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request could not be sent, or the connection dropped before a response arrived.
    #[error("Network error. {0}")]
    Network(String),
    /// The server answered with a non-2xx status. `message` is the server's own text where it sent one.
    #[error("{message}")]
    Status { status: u16, message: String },
}

impl TransportError {
    /// Builds a status error from the server's error body, falling back to `HTTP {status} {reason}`.
    pub fn from_status(status: u16, reason: Option<&str>, body: Option<String>) -> Self {
        let message = body.map(|b| b.trim().to_string()).filter(|b| !b.is_empty()).unwrap_or_else(|| {
            format!("HTTP {status} {}", reason.unwrap_or_default()).trim().to_string()
        });
        Self::Status { status, message }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Network(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unexpected response body. {0}")]
pub struct ParseError(pub String);

impl From<serde_json::Error> for ParseError {
    fn from(e: serde_json::Error) -> Self {
        Self(e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Transport(#[from] TransportError),
    /// The backend refused a new order. Carries the server's error body, or the bare status.
    #[error("The order was not accepted. {0}")]
    Submission(TransportError),
    #[error("{0}")]
    Parse(#[from] ParseError),
}

impl ApiError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
