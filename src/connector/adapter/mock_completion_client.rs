use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tracing::debug;

use crate::application::CompletionClient;
use crate::domain::DomainError;

/// Offline [`CompletionClient`].
///
/// Replays scripted results in order; once the script is exhausted (or when
/// built with [`MockCompletionClient::echo`]) it echoes the prompt back.
/// Every prompt it receives is recorded.
pub struct MockCompletionClient {
    script: Mutex<VecDeque<Result<String, DomainError>>>,
    prompts: Mutex<Vec<String>>,
}

impl MockCompletionClient {
    pub fn echo() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn scripted(responses: impl IntoIterator<Item = Result<String, DomainError>>) -> Self {
        Self {
            script: Mutex::new(responses.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn echo_text(prompt: &str) -> String {
        format!("You said:\n\n```text\n{prompt}\n```")
    }
}

impl Default for MockCompletionClient {
    fn default() -> Self {
        Self::echo()
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prompt.to_string());

        let scripted = self
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        match scripted {
            Some(result) => {
                debug!("MockCompletionClient: replaying scripted result");
                result
            }
            None => Ok(Self::echo_text(prompt)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_echo_includes_prompt() {
        let client = MockCompletionClient::echo();
        let reply = client.complete("ping").await.unwrap();
        assert!(reply.contains("ping"));
    }

    #[tokio::test]
    async fn test_script_replays_in_order_then_echoes() {
        let client = MockCompletionClient::scripted([
            Ok("first".to_string()),
            Err(DomainError::completion("second fails")),
        ]);

        assert_eq!(client.complete("a").await.unwrap(), "first");
        assert!(client.complete("b").await.unwrap_err().is_completion_failure());
        assert!(client.complete("c").await.unwrap().contains('c'));

        assert_eq!(client.prompts(), vec!["a", "b", "c"]);
    }
}
