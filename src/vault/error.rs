/// Errors returned by the Vault transport layer.
///
/// Status-specific variants mirror the HTTP codes Vault uses so callers can
/// match on the kind of failure instead of parsing status numbers.
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    InvalidPath(String),

    #[error("{0}")]
    RateLimitExceeded(String),

    #[error("{0}")]
    Internal(String),

    #[error("{0}")]
    BadGateway(String),

    #[error("Vault is sealed: {0}")]
    Sealed(String),

    #[error("HTTP status {0}: {1}")]
    HttpStatus(u16, String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl VaultError {
    /// Classifies a non-success Vault response.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            400 => VaultError::InvalidRequest(message),
            401 => VaultError::Unauthorized(message),
            403 => VaultError::Forbidden(message),
            404 => VaultError::InvalidPath(message),
            429 => VaultError::RateLimitExceeded(message),
            500 => VaultError::Internal(message),
            502 => VaultError::BadGateway(message),
            503 => VaultError::Sealed(message),
            _ => VaultError::HttpStatus(status, message),
        }
    }
}
