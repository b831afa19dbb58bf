//! Error types for the bot setup wizard.

/// Top-level error type for the wizard.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Form error: {0}")]
    Form(#[from] FormError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Local form validation errors. These never reach the network.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("{message}")]
    Required {
        field: &'static str,
        message: &'static str,
    },
}

impl FormError {
    /// Name of the offending form field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Required { field, .. } => field,
        }
    }
}

/// Remote API errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Request to {endpoint} failed: {reason}")]
    Transport { endpoint: String, reason: String },

    #[error("{endpoint} rejected the request (status {status})")]
    Rejected {
        endpoint: String,
        status: u16,
        detail: Option<String>,
    },

    #[error("Invalid response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },
}

impl ApiError {
    /// Server-provided detail for a rejection, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Rejected { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// Whether the server answered and said no, as opposed to the request
    /// never producing a usable answer.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// Wizard state machine errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("Cannot apply {event} while in step {step}")]
    InvalidTransition { step: u8, event: String },

    #[error("{operation} is already in progress")]
    Busy { operation: &'static str },

    #[error("No validated bot token is available")]
    MissingToken,
}

/// Result type alias for the wizard.
pub type Result<T> = std::result::Result<T, Error>;
