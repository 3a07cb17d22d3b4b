//! Error types for the tracker.

use thiserror::Error;

/// Main error type for tracker operations.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Data directory is locked by another process")]
    Locked,

    #[error("Item not found: {0}")]
    ItemNotFound(String),

    #[error("Claimer required")]
    InvalidClaimer,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Password already exists")]
    PasswordExists,

    #[error("Password not found")]
    PasswordNotFound,

    #[error("Cannot remove the last password")]
    LastPassword,

    #[error("Invalid action: {0}")]
    InvalidAction(String),
}

/// Coarse category of a [`TrackerError`], used by the transport layer to
/// pick a response status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Backing medium unreadable or unwritable. Retryable.
    Storage,
    NotFound,
    BadRequest,
    Unauthorized,
    /// Request conflicts with the current secret set.
    Conflict,
}

impl ErrorKind {
    /// HTTP status the transport layer reports for this category.
    pub fn http_status(self) -> u16 {
        match self {
            ErrorKind::Storage => 500,
            ErrorKind::NotFound => 404,
            // The password endpoints answer conflicts with a plain 400.
            ErrorKind::BadRequest | ErrorKind::Conflict => 400,
            ErrorKind::Unauthorized => 401,
        }
    }
}

impl TrackerError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TrackerError::Io(_)
            | TrackerError::Serialization(_)
            | TrackerError::Deserialization(_)
            | TrackerError::StorageUnavailable(_)
            | TrackerError::Locked => ErrorKind::Storage,
            TrackerError::ItemNotFound(_) | TrackerError::PasswordNotFound => ErrorKind::NotFound,
            TrackerError::InvalidClaimer | TrackerError::InvalidAction(_) => ErrorKind::BadRequest,
            TrackerError::Unauthorized => ErrorKind::Unauthorized,
            TrackerError::PasswordExists | TrackerError::LastPassword => ErrorKind::Conflict,
        }
    }

    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            TrackerError::Io(_)
            | TrackerError::Serialization(_)
            | TrackerError::Deserialization(_)
            | TrackerError::StorageUnavailable(_)
            | TrackerError::Locked => "storage_unavailable",
            TrackerError::ItemNotFound(_) => "item_not_found",
            TrackerError::InvalidClaimer => "invalid_claimer",
            TrackerError::Unauthorized => "unauthorized",
            TrackerError::PasswordExists => "password_exists",
            TrackerError::PasswordNotFound => "password_not_found",
            TrackerError::LastPassword => "last_password",
            TrackerError::InvalidAction(_) => "invalid_action",
        }
    }

    /// Whether the caller may retry the same request unchanged.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Storage
    }

    /// JSON body for an error response, e.g. `{"error":"item_not_found","message":"..."}`.
    pub fn to_body(&self) -> serde_json::Value {
        serde_json::json!({
            "error": self.code(),
            "message": self.to_string(),
        })
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(e: serde_json::Error) -> Self {
        TrackerError::Serialization(e.to_string())
    }
}

/// Result type for tracker operations.
pub type Result<T> = std::result::Result<T, TrackerError>;
