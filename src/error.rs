use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure categories reported on a capability `Outcome`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Capability received missing or malformed params.
    ValidationError,
    /// Capability's backing credentials are absent.
    NotConfigured,
    /// Network or API failure inside a capability.
    ExternalServiceError,
    CapabilityNotFound,
    CapabilityDisabled,
    /// Fault inside `execute`, wrapped by the agent.
    ExecutionError,
    /// Workflow step references an unknown agent.
    AgentNotFound,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ValidationError => "VALIDATION_ERROR",
            ErrorKind::NotConfigured => "NOT_CONFIGURED",
            ErrorKind::ExternalServiceError => "EXTERNAL_SERVICE_ERROR",
            ErrorKind::CapabilityNotFound => "CAPABILITY_NOT_FOUND",
            ErrorKind::CapabilityDisabled => "CAPABILITY_DISABLED",
            ErrorKind::ExecutionError => "EXECUTION_ERROR",
            ErrorKind::AgentNotFound => "AGENT_NOT_FOUND",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("No home directory")]
    NoHomeDir,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not configured: {0}")]
    NotConfigured(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Capability '{0}' not found")]
    CapabilityNotFound(String),

    #[error("Capability '{0}' is disabled")]
    CapabilityDisabled(String),

    #[error("Execution error: {0}")]
    Execution(String),

    #[error("Agent '{0}' not found")]
    AgentNotFound(String),

    #[error("Recipient '{0}' not found, message dropped")]
    RecipientNotFound(String),

    #[error("Workflow halted at step {step}: {message}")]
    WorkflowHalted { step: usize, message: String },
}

impl Error {
    /// The outcome error kind this error reports as, if it has a direct one.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Error::Validation(_) => Some(ErrorKind::ValidationError),
            Error::NotConfigured(_) => Some(ErrorKind::NotConfigured),
            Error::ExternalService(_) => Some(ErrorKind::ExternalServiceError),
            Error::CapabilityNotFound(_) => Some(ErrorKind::CapabilityNotFound),
            Error::CapabilityDisabled(_) => Some(ErrorKind::CapabilityDisabled),
            Error::Execution(_) => Some(ErrorKind::ExecutionError),
            Error::AgentNotFound(_) => Some(ErrorKind::AgentNotFound),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
