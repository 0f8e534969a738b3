use anyhow::{bail, Result};

use crate::application::TurnOutcome;

use super::super::Container;

/// One question, one answer, no landing screen.
pub struct AskController<'a> {
    container: &'a Container,
}

impl<'a> AskController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn ask(&self, prompt: String) -> Result<String> {
        if prompt.trim().is_empty() {
            bail!("prompt must not be empty");
        }

        let session = self.container.new_session(false);
        let use_case = self.container.submit_use_case(session);

        match use_case.submit(&prompt).await? {
            Some(TurnOutcome::Answered(reply)) => Ok(reply.text().to_string()),
            Some(TurnOutcome::Failed(error)) => bail!(error),
            None => bail!("submission was not accepted"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::application::COMPLETION_FAILURE_MESSAGE;
    use crate::connector::adapter::MockCompletionClient;
    use crate::connector::api::ContainerConfig;
    use crate::domain::DomainError;

    fn container(client: MockCompletionClient) -> Container {
        Container::with_client(ContainerConfig::default(), Arc::new(client))
    }

    #[tokio::test]
    async fn ask_returns_completion_text() {
        let container = container(MockCompletionClient::scripted([Ok("Hi there".to_string())]));
        let answer = AskController::new(&container)
            .ask("Hello".to_string())
            .await
            .unwrap();
        assert_eq!(answer, "Hi there");
    }

    #[tokio::test]
    async fn ask_rejects_blank_prompt() {
        let container = container(MockCompletionClient::echo());
        assert!(AskController::new(&container)
            .ask("   ".to_string())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn ask_reports_user_facing_failure() {
        let container = container(MockCompletionClient::scripted([Err(
            DomainError::completion("API returned 500"),
        )]));
        let err = AskController::new(&container)
            .ask("test".to_string())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), COMPLETION_FAILURE_MESSAGE);
    }
}
