//! Frame layout and widgets. Pure functions of [`ViewState`].

use std::time::{Duration, Instant};

use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::domain::{Message, SessionSnapshot};

use super::input::InputField;
use super::markdown::CodeHighlighter;

const USER_COLOR: Color = Color::Blue;
const BOT_COLOR: Color = Color::Gray;
const ERROR_COLOR: Color = Color::Red;
const PLACEHOLDER: &str = "Type your message...";
const TYPING_FRAMES: [&str; 3] = ["●○○", "○●○", "○○●"];

pub struct ViewState<'a> {
    pub title: &'a str,
    pub snapshot: &'a SessionSnapshot,
    pub input: &'a InputField,
    /// Lines scrolled up from the bottom; 0 follows the newest message.
    pub scroll_offset: usize,
    pub tick: u64,
    /// 1.0 fully visible, 0.0 faded out.
    pub landing_opacity: f32,
    pub highlighter: &'a CodeHighlighter,
}

/// Measurements the event loop needs to bound scrolling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub conversation_lines: usize,
    pub viewport_height: usize,
}

pub fn render(frame: &mut Frame, view: &ViewState) -> RenderStats {
    let [header, body, input] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(3),
    ])
    .areas(frame.area());

    render_header(frame, header, view);
    let stats = render_conversation(frame, body, view);
    render_input(frame, input, view);

    if view.snapshot.state.is_landing_visible() {
        render_landing(frame, frame.area(), view.title, view.landing_opacity);
    }

    stats
}

fn render_header(frame: &mut Frame, area: Rect, view: &ViewState) {
    let line = Line::from(vec![
        Span::styled(" Gemini Chat ", Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(view.title, Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_conversation(frame: &mut Frame, area: Rect, view: &ViewState) -> RenderStats {
    let block = Block::bordered();
    let inner = block.inner(area);

    let mut lines = Vec::new();
    for message in &view.snapshot.messages {
        lines.extend(message_lines(message, view.highlighter));
        lines.push(Line::default());
    }

    if view.snapshot.state.is_typing() {
        let frame_index = (view.tick as usize) % TYPING_FRAMES.len();
        lines.push(Line::from(vec![
            Span::styled("Gemini ", Style::default().fg(BOT_COLOR).add_modifier(Modifier::BOLD)),
            Span::styled(TYPING_FRAMES[frame_index], Style::default().fg(Color::DarkGray)),
        ]));
    }

    if let Some(error) = view.snapshot.state.last_error() {
        lines.push(
            Line::from(Span::styled(error.to_string(), Style::default().fg(ERROR_COLOR)))
                .alignment(Alignment::Center),
        );
    }

    let paragraph = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false });
    let total = wrapped_height(&paragraph, inner.width);
    let viewport = inner.height as usize;
    let top = scroll_top(total, viewport, view.scroll_offset);

    let paragraph = paragraph
        .block(block)
        .scroll((top.min(u16::MAX as usize) as u16, 0));
    frame.render_widget(paragraph, area);

    RenderStats {
        conversation_lines: total,
        viewport_height: viewport,
    }
}

fn message_lines(message: &Message, highlighter: &CodeHighlighter) -> Vec<Line<'static>> {
    if message.is_from_user() {
        let style = Style::default().fg(USER_COLOR);
        let mut lines = vec![Line::from(Span::styled(
            "You",
            style.add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Right)];
        lines.extend(
            message
                .text()
                .lines()
                .map(|l| Line::from(Span::styled(l.to_string(), style)).alignment(Alignment::Right)),
        );
        lines
    } else {
        let mut lines = vec![Line::from(Span::styled(
            "Gemini",
            Style::default().fg(BOT_COLOR).add_modifier(Modifier::BOLD),
        ))];
        lines.extend(highlighter.render(message.text()));
        lines
    }
}

fn render_input(frame: &mut Frame, area: Rect, view: &ViewState) {
    let title = if view.snapshot.state.is_submitting() {
        " Message (waiting for Gemini) "
    } else {
        " Message "
    };
    let block = Block::bordered().title(title);
    let inner = block.inner(area);

    let cursor_col = Span::raw(view.input.before_cursor()).width();
    let width = inner.width.max(1) as usize;
    let h_scroll = cursor_col.saturating_sub(width.saturating_sub(1));

    let content = if view.input.value().is_empty() {
        Line::from(Span::styled(PLACEHOLDER, Style::default().fg(Color::DarkGray)))
    } else {
        Line::from(view.input.value().to_string())
    };

    frame.render_widget(
        Paragraph::new(content)
            .block(block)
            .scroll((0, h_scroll.min(u16::MAX as usize) as u16)),
        area,
    );

    if !view.snapshot.state.is_landing_visible() {
        let x = inner.x + (cursor_col - h_scroll) as u16;
        frame.set_cursor_position((x, inner.y));
    }
}

fn render_landing(frame: &mut Frame, area: Rect, title: &str, opacity: f32) {
    let fg = fade_color(opacity);
    let height = 9.min(area.height);
    let width = 52.min(area.width);
    let card = Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    );

    let text = Text::from(vec![
        Line::default(),
        Line::from(Span::styled(
            "Gemini Chat",
            Style::default().fg(fg).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(title.to_string(), Style::default().fg(fg))),
        Line::default(),
        Line::from(Span::styled(
            "Ask anything, get answers from Gemini.",
            Style::default().fg(fg),
        )),
        Line::default(),
        Line::from(Span::styled(
            "Press Enter to start · Esc to quit",
            Style::default().fg(fg).add_modifier(Modifier::ITALIC),
        )),
    ]);

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(Block::bordered().border_style(Style::default().fg(fg))),
        card,
    );
}

/// Rows a borderless `paragraph` occupies at `width`, using the same word
/// wrapping it renders with.
pub fn wrapped_height(paragraph: &Paragraph, width: u16) -> usize {
    paragraph.line_count(width.max(1))
}

/// First visible row so that the view sits `offset` rows above the bottom.
pub fn scroll_top(total: usize, viewport: usize, offset: usize) -> usize {
    total.saturating_sub(viewport).saturating_sub(offset)
}

/// Linear fade over `delay` starting at `started`.
pub fn landing_opacity(started: Option<Instant>, delay: Duration, now: Instant) -> f32 {
    match started {
        None => 1.0,
        Some(_) if delay.is_zero() => 0.0,
        Some(start) => {
            let elapsed = now.saturating_duration_since(start).as_secs_f32();
            (1.0 - elapsed / delay.as_secs_f32()).clamp(0.0, 1.0)
        }
    }
}

/// Foreground for the landing card: white at full opacity, near-black at zero.
pub fn fade_color(opacity: f32) -> Color {
    const FLOOR: f32 = 30.0;
    let level = (FLOOR + (255.0 - FLOOR) * opacity.clamp(0.0, 1.0)).round() as u8;
    Color::Rgb(level, level, level)
}
