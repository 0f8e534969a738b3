use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::debug;

use crate::application::MessageRepository;
use crate::domain::{DomainError, Message, MessageId, Sender, SessionSnapshot, SessionState};

/// The single owner of a conversation's mutable state.
///
/// Holds the message store, the session flags and the id counter, and
/// publishes a [`SessionSnapshot`] on a `watch` channel after every mutation.
/// Presentation surfaces call [`ChatSession::subscribe`] and redraw whenever
/// the receiver reports a change.
///
/// The repository handed to the constructor is expected to be empty.
pub struct ChatSession {
    messages: Arc<dyn MessageRepository>,
    state: Mutex<SessionState>,
    /// Serializes appends so ids and store order always agree.
    append_lock: tokio::sync::Mutex<()>,
    next_id: AtomicU64,
    publisher: watch::Sender<SessionSnapshot>,
}

impl ChatSession {
    pub fn new(messages: Arc<dyn MessageRepository>) -> Self {
        Self::with_state(messages, SessionState::new())
    }

    /// A session whose landing screen is already dismissed.
    pub fn without_landing(messages: Arc<dyn MessageRepository>) -> Self {
        Self::with_state(messages, SessionState::without_landing())
    }

    fn with_state(messages: Arc<dyn MessageRepository>, state: SessionState) -> Self {
        let (publisher, _) = watch::channel(SessionSnapshot {
            messages: Vec::new(),
            state: state.clone(),
            revision: 0,
        });

        Self {
            messages,
            state: Mutex::new(state),
            append_lock: tokio::sync::Mutex::new(()),
            next_id: AtomicU64::new(1),
            publisher,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.publisher.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.publisher.borrow().clone()
    }

    pub fn state(&self) -> SessionState {
        self.lock_state().clone()
    }

    pub async fn messages(&self) -> Result<Vec<Message>, DomainError> {
        self.messages.all().await
    }

    /// Assigns the next id, stores the message and publishes it.
    pub async fn append(&self, sender: Sender, text: &str) -> Result<Message, DomainError> {
        let _order = self.append_lock.lock().await;

        let id = MessageId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let message = Message::new(id, text, sender);
        self.messages.append(message.clone()).await?;

        debug!("Appended {} message {}", sender, id);
        self.publisher.send_modify(|snapshot| {
            snapshot.messages.push(message.clone());
            snapshot.revision += 1;
        });

        Ok(message)
    }

    /// Claims the in-flight guard. Returns `false` when a submission is
    /// already outstanding, leaving the state untouched.
    pub(crate) fn try_start_submission(&self) -> bool {
        self.update_state(|state| {
            if state.is_submitting() {
                false
            } else {
                state.start_submission();
                true
            }
        })
    }

    pub(crate) fn stop_typing(&self) {
        self.update_state(SessionState::stop_typing);
    }

    pub(crate) fn finish_submission(&self, error: Option<String>) {
        self.update_state(|state| state.finish_submission(error));
    }

    pub(crate) fn release_in_flight(&self) {
        self.update_state(SessionState::release_in_flight);
    }

    /// Returns `false` if the landing screen is gone or already fading.
    pub(crate) fn start_landing_fade(&self) -> bool {
        self.update_state(|state| {
            if !state.is_landing_visible() || state.is_landing_fading() {
                false
            } else {
                state.start_landing_fade();
                true
            }
        })
    }

    pub(crate) fn hide_landing(&self) {
        self.update_state(SessionState::hide_landing);
    }

    fn update_state<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let mut state = self.lock_state();
        let before = state.clone();
        let result = f(&mut state);

        if *state != before {
            let current = state.clone();
            self.publisher.send_modify(|snapshot| {
                snapshot.state = current;
                snapshot.revision += 1;
            });
        }

        result
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::adapter::InMemoryMessageRepository;

    fn session() -> ChatSession {
        ChatSession::without_landing(Arc::new(InMemoryMessageRepository::new()))
    }

    #[tokio::test]
    async fn test_append_assigns_increasing_ids() {
        let session = session();

        let first = session.append(Sender::Bot, "one").await.unwrap();
        let second = session.append(Sender::User, "two").await.unwrap();

        assert_eq!(first.id().value(), 1);
        assert_eq!(second.id().value(), 2);

        let stored = session.messages().await.unwrap();
        assert_eq!(stored, vec![first, second]);
    }

    #[tokio::test]
    async fn test_subscribers_see_appends() {
        let session = session();
        let mut rx = session.subscribe();

        session.append(Sender::User, "hello").await.unwrap();

        assert!(rx.has_changed().unwrap());
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.messages.len(), 1);
        assert_eq!(snapshot.messages[0].text(), "hello");
        assert_eq!(snapshot.revision, 1);
    }

    #[tokio::test]
    async fn test_guard_cannot_be_claimed_twice() {
        let session = session();

        assert!(session.try_start_submission());
        assert!(!session.try_start_submission());

        session.release_in_flight();
        assert!(session.try_start_submission());
    }

    #[tokio::test]
    async fn test_unchanged_state_does_not_publish() {
        let session = session();
        let mut rx = session.subscribe();
        rx.borrow_and_update();

        session.release_in_flight();

        assert!(!rx.has_changed().unwrap());
        assert_eq!(session.snapshot().revision, 0);
    }

    #[tokio::test]
    async fn test_landing_fade_starts_once() {
        let session = ChatSession::new(Arc::new(InMemoryMessageRepository::new()));

        assert!(session.start_landing_fade());
        assert!(!session.start_landing_fade());

        session.hide_landing();
        assert!(!session.state().is_landing_visible());
        assert!(!session.start_landing_fade());
    }
}
