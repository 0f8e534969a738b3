use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::debug;

use crate::application::{
    ChatSession, CompletionClient, DismissLandingUseCase, SubmitMessageUseCase,
    DEFAULT_LANDING_DELAY,
};
use crate::connector::adapter::{
    GeminiClient, InMemoryMessageRepository, MockCompletionClient, API_KEY_ENV, DEFAULT_BASE_URL,
    DEFAULT_MODEL,
};
use crate::domain::DomainError;

pub struct ContainerConfig {
    /// Secret for the completion endpoint. Required unless `mock` is set.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    /// Answer locally with [`MockCompletionClient`] instead of calling Gemini.
    pub mock: bool,
    /// Per-request timeout. `None` waits as long as the service takes.
    pub timeout: Option<Duration>,
    pub landing_delay: Duration,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            mock: false,
            timeout: None,
            landing_delay: DEFAULT_LANDING_DELAY,
        }
    }
}

/// Wires the completion client into sessions and use cases.
pub struct Container {
    client: Arc<dyn CompletionClient>,
    config: ContainerConfig,
}

impl Container {
    pub fn new(config: ContainerConfig) -> Result<Self> {
        let client: Arc<dyn CompletionClient> = if config.mock {
            debug!("Using mock completion client");
            Arc::new(MockCompletionClient::echo())
        } else {
            let api_key = config
                .api_key
                .clone()
                .filter(|key| !key.trim().is_empty())
                .ok_or_else(|| {
                    DomainError::configuration(format!(
                        "no API key: pass --api-key or set {API_KEY_ENV}"
                    ))
                })?;

            debug!(
                "Using Gemini model {} at {}",
                config.model, config.base_url
            );
            let mut gemini = GeminiClient::new(api_key, &config.model, &config.base_url);
            if let Some(timeout) = config.timeout {
                gemini = gemini.with_timeout(timeout)?;
            }
            Arc::new(gemini)
        };

        Ok(Self { client, config })
    }

    /// Builds a container around an already constructed client.
    pub fn with_client(config: ContainerConfig, client: Arc<dyn CompletionClient>) -> Self {
        Self { client, config }
    }

    /// A fresh, empty session. Surfaces without an intro screen pass
    /// `landing = false`.
    pub fn new_session(&self, landing: bool) -> Arc<ChatSession> {
        let messages = Arc::new(InMemoryMessageRepository::new());
        if landing {
            Arc::new(ChatSession::new(messages))
        } else {
            Arc::new(ChatSession::without_landing(messages))
        }
    }

    pub fn submit_use_case(&self, session: Arc<ChatSession>) -> SubmitMessageUseCase {
        SubmitMessageUseCase::new(session, self.client.clone())
    }

    pub fn dismiss_landing_use_case(&self, session: Arc<ChatSession>) -> DismissLandingUseCase {
        DismissLandingUseCase::new(session).with_delay(self.config.landing_delay)
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub fn is_mock(&self) -> bool {
        self.config.mock
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_is_rejected() {
        let err = Container::new(ContainerConfig::default()).err().unwrap();
        assert!(err.to_string().contains(API_KEY_ENV));
    }

    #[test]
    fn blank_api_key_is_rejected() {
        let config = ContainerConfig {
            api_key: Some("  ".to_string()),
            ..ContainerConfig::default()
        };
        assert!(Container::new(config).is_err());
    }

    #[test]
    fn mock_mode_needs_no_key() {
        let container = Container::new(ContainerConfig {
            mock: true,
            ..ContainerConfig::default()
        })
        .unwrap();
        assert!(container.is_mock());
        assert_eq!(container.model(), DEFAULT_MODEL);
    }

    #[test]
    fn timeout_is_applied_to_gemini_client() {
        let container = Container::new(ContainerConfig {
            api_key: Some("key".to_string()),
            timeout: Some(Duration::from_secs(5)),
            ..ContainerConfig::default()
        })
        .unwrap();
        assert!(!container.is_mock());
    }

    #[tokio::test]
    async fn sessions_honour_landing_flag() {
        let container = Container::new(ContainerConfig {
            mock: true,
            landing_delay: Duration::from_millis(1),
            ..ContainerConfig::default()
        })
        .unwrap();

        assert!(container.new_session(true).state().is_landing_visible());
        assert!(!container.new_session(false).state().is_landing_visible());

        let session = container.new_session(true);
        let dismiss = container.dismiss_landing_use_case(session.clone());
        assert_eq!(dismiss.delay(), Duration::from_millis(1));
        dismiss.execute().await.unwrap();
        assert_eq!(session.messages().await.unwrap().len(), 1);
    }
}
