use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Client-side error taxonomy for the admin engine.
///
/// Every failure a controller or dispatcher can produce collapses into one
/// of these variants; there is no silent failure path. Validation errors
/// never reach the network, session expiry carries a mandated side effect
/// (token cleared, redirect scheduled) performed by the dispatcher.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Session expired. Please log in again.")]
    SessionExpired,
}

impl ApiError {
    /// HTTP status associated with the failure, when there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            ApiError::SessionExpired => Some(401),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ApiError::Validation(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err.to_string())
    }
}
