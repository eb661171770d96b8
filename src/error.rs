// Error handling module
// Defines the error taxonomy for the token store, the auth flow and the API client

use std::fmt;

use thiserror::Error;

/// Which token of a bundle an operation refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Access => f.write_str("access"),
            TokenKind::Refresh => f.write_str("refresh"),
        }
    }
}

/// Errors raised by the persistent token store
#[derive(Error, Debug)]
pub enum StoreError {
    /// Key is absent and the store runs in strict mode
    #[error("\"{0}\" does not exist inside the token cache")]
    KeyNotFound(String),

    /// Key is present, overwrite was disabled and the store runs in strict mode
    #[error("\"{0}\" already exists in the token cache and overwrite is disabled")]
    KeyExists(String),

    #[error("Token cache database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Token cache entry is not a valid token bundle: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Token cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Token cache connection lock is poisoned")]
    Poisoned,
}

/// Errors raised by the token lifecycle
#[derive(Error, Debug)]
pub enum AuthError {
    /// The carrier answered 401 to an exchange
    #[error("Received 401 Unauthorized; check the configured user id and key")]
    InvalidCredentials,

    /// The carrier answered a non-success status other than 401
    #[error("Authentication request failed: {status} - {body}")]
    AuthenticationFailed { status: u16, body: String },

    /// The exchange succeeded but the body is not a token bundle
    #[error("Authentication response is not a valid token bundle: {0}")]
    MalformedAuthResponse(String),

    /// A refresh exchange was requested without a usable refresh token
    #[error("Refresh unavailable: {0}")]
    RefreshUnavailable(&'static str),

    /// Expiration was checked before any bundle was loaded
    #[error("The {0} token expiration is not set; authenticate first")]
    MissingExpiration(TokenKind),

    /// Full authentication is required but no API key was configured
    #[error("An API key is required for full authentication")]
    MissingKey,

    #[error("Token store error: {0}")]
    Store(#[from] StoreError),

    #[error("Authentication transport error: {0:#}")]
    Transport(anyhow::Error),
}

/// Errors returned by the DHL Parcel client
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Token store error: {0}")]
    Store(#[from] StoreError),

    /// Error response from the DHL Parcel API
    #[error("DHL Parcel API error: {status} - {message}")]
    CarrierError { status: u16, message: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Request rejected before it was sent
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// HTTP status of a carrier error response, if this is one
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::CarrierError { status, .. } => Some(*status),
            ApiError::Auth(AuthError::AuthenticationFailed { status, .. }) => Some(*status),
            ApiError::Auth(AuthError::InvalidCredentials) => Some(401),
            _ => None,
        }
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ApiError>;
