use serde::Serialize;

use super::Message;

/// Transient UI flags of a chat session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionState {
    /// In-flight guard: true while a completion request is outstanding.
    submitting: bool,
    /// Typing indicator, mirrors `submitting` during a turn.
    typing: bool,
    last_error: Option<String>,
    landing_visible: bool,
    /// Between the start action and the landing swap.
    landing_fading: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            submitting: false,
            typing: false,
            last_error: None,
            landing_visible: true,
            landing_fading: false,
        }
    }

    /// State for surfaces that never show a landing screen.
    pub fn without_landing() -> Self {
        Self {
            landing_visible: false,
            ..Self::new()
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn is_typing(&self) -> bool {
        self.typing
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_landing_visible(&self) -> bool {
        self.landing_visible
    }

    pub fn is_landing_fading(&self) -> bool {
        self.landing_fading
    }

    pub(crate) fn start_submission(&mut self) {
        self.submitting = true;
        self.typing = true;
        self.last_error = None;
    }

    pub(crate) fn stop_typing(&mut self) {
        self.typing = false;
    }

    /// Ends the typing indicator and records a failure. The in-flight flag
    /// stays set; only [`Self::release_in_flight`] clears it.
    pub(crate) fn finish_submission(&mut self, error: Option<String>) {
        self.typing = false;
        if error.is_some() {
            self.last_error = error;
        }
    }

    pub(crate) fn release_in_flight(&mut self) {
        self.submitting = false;
        self.typing = false;
    }

    pub(crate) fn start_landing_fade(&mut self) {
        self.landing_fading = true;
    }

    pub(crate) fn hide_landing(&mut self) {
        self.landing_visible = false;
        self.landing_fading = false;
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

/// What subscribers receive after every mutation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionSnapshot {
    pub messages: Vec<Message>,
    pub state: SessionState,
    pub revision: u64,
}
