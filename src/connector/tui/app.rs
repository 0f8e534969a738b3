use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures_util::StreamExt;
use ratatui::DefaultTerminal;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::application::{DismissLandingUseCase, SubmitMessageUseCase};
use crate::domain::SessionSnapshot;

use super::input::InputField;
use super::markdown::CodeHighlighter;
use super::view::{self, RenderStats, ViewState};

/// Animation tick for the typing indicator and the landing fade.
const TICK: Duration = Duration::from_millis(100);
const SCROLL_STEP: usize = 3;

/// Terminal chat surface. Reads the session through snapshots and drives it
/// through the two use cases.
pub struct App {
    running: bool,
    title: String,
    submit: Arc<SubmitMessageUseCase>,
    dismiss: Arc<DismissLandingUseCase>,
    /// Last published session snapshot.
    snapshot: SessionSnapshot,
    input: InputField,
    scroll_offset: usize,
    stats: RenderStats,
    tick: u64,
    fade_started: Option<Instant>,
    highlighter: CodeHighlighter,
    /// Cancels background turns when the app exits.
    shutdown: CancellationToken,
}

impl App {
    pub fn new(
        submit: Arc<SubmitMessageUseCase>,
        dismiss: Arc<DismissLandingUseCase>,
        title: impl Into<String>,
    ) -> Self {
        let snapshot = submit.session().snapshot();
        Self {
            running: true,
            title: title.into(),
            submit,
            dismiss,
            snapshot,
            input: InputField::new(),
            scroll_offset: 0,
            stats: RenderStats::default(),
            tick: 0,
            fade_started: None,
            highlighter: CodeHighlighter::new(),
            shutdown: CancellationToken::new(),
        }
    }

    pub async fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let mut events = EventStream::new();
        let mut snapshots = self.submit.session().subscribe();
        let mut ticker = tokio::time::interval(TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        self.render(terminal)?;

        while self.running {
            tokio::select! {
                maybe_event = events.next() => match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        self.handle_key(key).await
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => warn!("Terminal event error: {e}"),
                    None => self.running = false,
                },

                changed = snapshots.changed() => {
                    if changed.is_err() {
                        self.running = false;
                    } else {
                        let snapshot = snapshots.borrow_and_update().clone();
                        self.apply_snapshot(snapshot);
                    }
                }

                _ = ticker.tick() => {
                    self.tick = self.tick.wrapping_add(1);
                }
            }

            self.render(terminal)?;
        }

        self.shutdown.cancel();
        Ok(())
    }

    fn render(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let view = ViewState {
            title: &self.title,
            snapshot: &self.snapshot,
            input: &self.input,
            scroll_offset: self.scroll_offset,
            tick: self.tick,
            landing_opacity: view::landing_opacity(
                self.fade_started,
                self.dismiss.delay(),
                Instant::now(),
            ),
            highlighter: &self.highlighter,
        };

        let mut stats = RenderStats::default();
        terminal.draw(|frame| stats = view::render(frame, &view))?;
        self.stats = stats;
        Ok(())
    }

    /// Any new message snaps the view back to the bottom.
    fn apply_snapshot(&mut self, snapshot: SessionSnapshot) {
        if snapshot.messages.len() != self.snapshot.messages.len() {
            self.scroll_offset = 0;
        }
        self.snapshot = snapshot;
    }

    async fn handle_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => self.running = false,
            KeyCode::Char('c') if ctrl => self.running = false,

            _ if self.submit.session().state().is_landing_visible() => {
                if key.code == KeyCode::Enter {
                    self.start_dismissal();
                }
            }

            KeyCode::Enter if !key.modifiers.contains(KeyModifiers::SHIFT) => self.submit().await,
            KeyCode::Enter => {}

            KeyCode::Char(c) if !ctrl => self.input.insert(c),
            KeyCode::Backspace => self.input.backspace(),
            KeyCode::Delete => self.input.delete(),
            KeyCode::Left => self.input.move_left(),
            KeyCode::Right => self.input.move_right(),
            KeyCode::Home => self.input.move_home(),
            KeyCode::End => self.input.move_end(),

            KeyCode::PageUp | KeyCode::Up => {
                let max = self
                    .stats
                    .conversation_lines
                    .saturating_sub(self.stats.viewport_height);
                let step = if key.code == KeyCode::PageUp {
                    (self.stats.viewport_height / 2).max(1)
                } else {
                    SCROLL_STEP
                };
                self.scroll_offset = (self.scroll_offset + step).min(max);
            }
            KeyCode::PageDown | KeyCode::Down => {
                let step = if key.code == KeyCode::PageDown {
                    (self.stats.viewport_height / 2).max(1)
                } else {
                    SCROLL_STEP
                };
                self.scroll_offset = self.scroll_offset.saturating_sub(step);
            }

            _ => {}
        }
    }

    async fn submit(&mut self) {
        if self.input.is_blank() {
            return;
        }
        match self.submit.begin(self.input.value()).await {
            Ok(Some(turn)) => {
                self.input.clear();
                self.scroll_offset = 0;

                let use_case = Arc::clone(&self.submit);
                let shutdown = self.shutdown.clone();
                tokio::spawn(async move {
                    tokio::select! {
                        _ = shutdown.cancelled() => debug!("Turn cancelled on shutdown"),
                        result = use_case.complete(turn) => {
                            if let Err(e) = result {
                                warn!("Turn could not be recorded: {e}");
                            }
                        }
                    }
                });
            }
            Ok(None) => {}
            Err(e) => warn!("Failed to start turn: {e}"),
        }
    }

    fn start_dismissal(&mut self) {
        if self.fade_started.is_some() {
            return;
        }
        self.fade_started = Some(Instant::now());

        let use_case = Arc::clone(&self.dismiss);
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = shutdown.cancelled() => {}
                result = use_case.execute() => {
                    if let Err(e) = result {
                        warn!("Failed to dismiss landing screen: {e}");
                    }
                }
            }
        });
    }
}
