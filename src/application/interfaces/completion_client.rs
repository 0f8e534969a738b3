use async_trait::async_trait;

use crate::domain::DomainError;

/// Turns a single prompt into a completion by calling a text-generation
/// service.
///
/// Implementors encapsulate transport, serialization and vendor-specific API
/// details. The prompt is sent on its own: no conversation history and no
/// generation parameters, so the service defaults apply.
///
/// Every failure (unreachable host, non-success status, unexpected payload)
/// is reported as [`DomainError::CompletionFailure`]. Implementations do not
/// retry and keep no state between calls.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, DomainError>;
}
