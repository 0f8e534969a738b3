use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    /// Any failure to obtain a completion: transport, non-success status or
    /// an unexpected response shape.
    #[error("Completion failure: {0}")]
    CompletionFailure(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn completion(msg: impl Into<String>) -> Self {
        Self::CompletionFailure(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn is_completion_failure(&self) -> bool {
        matches!(self, Self::CompletionFailure(_))
    }
}
