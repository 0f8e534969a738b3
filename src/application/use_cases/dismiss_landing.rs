use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::application::ChatSession;
use crate::domain::{DomainError, Message, Sender};

/// How long the landing screen takes to fade out.
pub const DEFAULT_LANDING_DELAY: Duration = Duration::from_millis(500);

/// First bot message, seeded when the landing screen goes away.
pub const INTRO_MESSAGE: &str = "Hello! I'm Gemini. I can help you with various tasks. \
Try asking me something! \n\nI can help with:\n- Writing and analysis\n\
- Code and technical questions\n- Math and calculations\n- General knowledge";

pub struct DismissLandingUseCase {
    session: Arc<ChatSession>,
    delay: Duration,
}

impl DismissLandingUseCase {
    pub fn new(session: Arc<ChatSession>) -> Self {
        Self {
            session,
            delay: DEFAULT_LANDING_DELAY,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Fades the landing screen out, then hides it and seeds the intro
    /// message. A no-op returning `None` if the landing screen is already
    /// gone or fading.
    pub async fn execute(&self) -> Result<Option<Message>, DomainError> {
        if !self.session.start_landing_fade() {
            debug!("Landing screen already dismissed");
            return Ok(None);
        }

        tokio::time::sleep(self.delay).await;

        self.session.hide_landing();
        let intro = self.session.append(Sender::Bot, INTRO_MESSAGE).await?;
        info!("Landing screen dismissed");

        Ok(Some(intro))
    }
}
