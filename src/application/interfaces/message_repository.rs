use async_trait::async_trait;

use crate::domain::{DomainError, Message};

/// Append-only, ordered storage for the messages of one session.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Adds a message to the end of the sequence. The only mutator.
    async fn append(&self, message: Message) -> Result<(), DomainError>;

    /// Returns the messages in chronological order.
    async fn all(&self) -> Result<Vec<Message>, DomainError>;

    async fn len(&self) -> Result<usize, DomainError>;
}
