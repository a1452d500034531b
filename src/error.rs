//! Error types for Agent Studio.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),

    #[error("Mail error: {0}")]
    Mail(#[from] MailError),

    #[error("Relay error: {0}")]
    Relay(#[from] RelayError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors from the backend REST API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Request to {path} failed: {reason}")]
    Network { path: String, reason: String },

    #[error("{path} returned {status}: {message}")]
    Status {
        path: String,
        status: u16,
        message: String,
    },

    #[error("Invalid response from {path}: {reason}")]
    InvalidResponse { path: String, reason: String },

    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Invalid file {name}: {reason}")]
    InvalidFile { name: String, reason: String },
}

impl ApiError {
    /// Message suitable for an inline error panel.
    ///
    /// Server-provided messages are passed through; transport failures are not.
    pub fn user_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } if !message.is_empty() => Some(message),
            _ => None,
        }
    }
}

/// Session and login errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Login rejected: {0}")]
    LoginRejected(String),

    #[error("Login request failed: {0}")]
    Api(#[from] ApiError),

    #[error("Session storage corrupted: {0}")]
    Corrupted(String),
}

/// Wizard state errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WizardError {
    #[error("Index {index} out of range for {len} staged files")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// Outbound email errors.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Invalid address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Failed to build email: {0}")]
    Build(String),

    #[error("SMTP send failed: {0}")]
    Send(String),
}

/// Chatbot relay errors.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Chat backend unreachable: {0}")]
    Unreachable(String),

    #[error("Chat backend returned {0}")]
    Status(u16),

    #[error("Invalid chat backend response: {0}")]
    InvalidResponse(String),
}

/// Result type alias for Agent Studio.
pub type Result<T> = std::result::Result<T, Error>;
