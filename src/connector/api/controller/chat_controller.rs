use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::connector::tui;

use super::super::Container;

/// Runs the interactive terminal chat on a fresh session.
pub struct ChatController<'a> {
    container: &'a Container,
}

impl<'a> ChatController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn chat(&self) -> Result<String> {
        let session = self.container.new_session(true);
        let submit = Arc::new(self.container.submit_use_case(session.clone()));
        let dismiss = Arc::new(self.container.dismiss_landing_use_case(session.clone()));

        let title = if self.container.is_mock() {
            format!("{} (mock)", self.container.model())
        } else {
            self.container.model().to_string()
        };

        tui::run_chat(submit, dismiss, title).await?;

        let turns = session
            .messages()
            .await?
            .iter()
            .filter(|m| m.is_from_user())
            .count();
        info!("Chat session ended after {} turns", turns);

        Ok(String::new())
    }
}
