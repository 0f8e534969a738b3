use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::MessageRepository;
use crate::domain::{DomainError, Message};

/// Process-memory message store; lives as long as the session.
pub struct InMemoryMessageRepository {
    messages: Arc<Mutex<Vec<Message>>>,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self {
            messages: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl Default for InMemoryMessageRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn append(&self, message: Message) -> Result<(), DomainError> {
        let mut messages = self.messages.lock().await;
        debug!("Storing message {} at position {}", message.id(), messages.len());
        messages.push(message);
        Ok(())
    }

    async fn all(&self) -> Result<Vec<Message>, DomainError> {
        Ok(self.messages.lock().await.clone())
    }

    async fn len(&self) -> Result<usize, DomainError> {
        Ok(self.messages.lock().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MessageId;

    #[tokio::test]
    async fn test_append_preserves_order() {
        let repo = InMemoryMessageRepository::new();

        repo.append(Message::user(MessageId::new(1), "Hello"))
            .await
            .unwrap();
        repo.append(Message::bot(MessageId::new(2), "Hi there"))
            .await
            .unwrap();

        let all = repo.all().await.unwrap();
        assert_eq!(repo.len().await.unwrap(), 2);
        assert_eq!(all[0].text(), "Hello");
        assert_eq!(all[1].text(), "Hi there");
    }

    #[tokio::test]
    async fn test_empty_repository() {
        let repo = InMemoryMessageRepository::default();
        assert!(repo.all().await.unwrap().is_empty());
        assert_eq!(repo.len().await.unwrap(), 0);
    }
}
