use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::application::{ChatSession, CompletionClient};
use crate::domain::{DomainError, Message, Sender};

/// The notice shown to the user when a turn fails, whatever the cause.
pub const COMPLETION_FAILURE_MESSAGE: &str =
    "Failed to get response from Gemini. Please try again.";

/// Sole owner of the in-flight claim. Dropping it is the only way the claim
/// is released, whether the turn succeeded, failed, panicked or was cancelled.
struct InFlightGuard {
    session: Arc<ChatSession>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.session.release_in_flight();
    }
}

/// A turn whose user message is stored and whose completion is still due.
pub struct PendingTurn {
    prompt: String,
    user_message: Message,
    _guard: InFlightGuard,
}

impl PendingTurn {
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn user_message(&self) -> &Message {
        &self.user_message
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Answered(Message),
    Failed(String),
}

impl TurnOutcome {
    pub fn is_answered(&self) -> bool {
        matches!(self, Self::Answered(_))
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Answered(_) => None,
            Self::Failed(error) => Some(error),
        }
    }
}

/// Runs one user turn: store the user message, ask the completion client,
/// store the bot reply or record the failure.
///
/// Only the latest prompt is sent; earlier turns are not replayed to the
/// service.
pub struct SubmitMessageUseCase {
    session: Arc<ChatSession>,
    client: Arc<dyn CompletionClient>,
}

impl SubmitMessageUseCase {
    pub fn new(session: Arc<ChatSession>, client: Arc<dyn CompletionClient>) -> Self {
        Self { session, client }
    }

    pub fn session(&self) -> &Arc<ChatSession> {
        &self.session
    }

    /// Starts a turn. Returns `None`, changing nothing, when the trimmed
    /// input is empty or another turn is still in flight.
    pub async fn begin(&self, input: &str) -> Result<Option<PendingTurn>, DomainError> {
        let prompt = input.trim();
        if prompt.is_empty() {
            debug!("Ignoring empty submission");
            return Ok(None);
        }

        if !self.session.try_start_submission() {
            debug!("A submission is already in flight; ignoring");
            return Ok(None);
        }
        let guard = InFlightGuard {
            session: Arc::clone(&self.session),
        };

        let user_message = self.session.append(Sender::User, prompt).await?;
        info!("Submitted message {} ({} chars)", user_message.id(), prompt.len());

        Ok(Some(PendingTurn {
            prompt: prompt.to_string(),
            user_message,
            _guard: guard,
        }))
    }

    /// Finishes a turn started by [`Self::begin`]. Completion failures are
    /// absorbed into [`TurnOutcome::Failed`]; only store errors propagate.
    pub async fn complete(&self, turn: PendingTurn) -> Result<TurnOutcome, DomainError> {
        let start_time = Instant::now();

        match self.client.complete(turn.prompt()).await {
            Ok(text) => {
                self.session.stop_typing();
                let reply = self.session.append(Sender::Bot, &text).await?;
                self.session.finish_submission(None);

                info!(
                    "Received reply {} in {:.2}s",
                    reply.id(),
                    start_time.elapsed().as_secs_f64()
                );
                Ok(TurnOutcome::Answered(reply))
            }
            Err(e) => {
                warn!(
                    "Turn for message {} failed after {:.2}s: {}",
                    turn.user_message().id(),
                    start_time.elapsed().as_secs_f64(),
                    e
                );
                self.session
                    .finish_submission(Some(COMPLETION_FAILURE_MESSAGE.to_string()));
                Ok(TurnOutcome::Failed(COMPLETION_FAILURE_MESSAGE.to_string()))
            }
        }
    }

    /// [`Self::begin`] followed by [`Self::complete`].
    pub async fn submit(&self, input: &str) -> Result<Option<TurnOutcome>, DomainError> {
        match self.begin(input).await? {
            Some(turn) => self.complete(turn).await.map(Some),
            None => Ok(None),
        }
    }
}
