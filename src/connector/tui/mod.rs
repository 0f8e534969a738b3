//! Terminal chat surface: landing screen, conversation, typing indicator
//! and entry field.

mod app;
mod input;
mod markdown;
mod view;

use std::sync::Arc;

use anyhow::Result;

use crate::application::{DismissLandingUseCase, SubmitMessageUseCase};

pub use app::App;
pub use input::InputField;
pub use markdown::{parse_blocks, Block, CodeHighlighter};

/// Takes over the terminal until the user quits, restoring it afterwards
/// even when the loop fails.
pub async fn run_chat(
    submit: Arc<SubmitMessageUseCase>,
    dismiss: Arc<DismissLandingUseCase>,
    title: impl Into<String>,
) -> Result<()> {
    let mut terminal = ratatui::try_init()?;
    let result = App::new(submit, dismiss, title).run(&mut terminal).await;
    ratatui::restore();
    result
}
