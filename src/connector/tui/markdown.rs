//! Turns message text into styled terminal lines. Only fenced code blocks
//! get real treatment (syntect highlighting); the rest is light touch-up.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;
use tracing::debug;

const THEME_NAME: &str = "base16-ocean.dark";
const FENCE: &str = "```";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Text(Vec<String>),
    Code {
        lang: Option<String>,
        lines: Vec<String>,
    },
}

/// Splits text on ``` fences. An unterminated fence runs to the end.
pub fn parse_blocks(text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut text_lines: Vec<String> = Vec::new();
    let mut code: Option<(Option<String>, Vec<String>)> = None;

    for line in text.lines() {
        let trimmed = line.trim_start();
        match code.take() {
            Some((lang, lines)) if trimmed.starts_with(FENCE) => {
                blocks.push(Block::Code { lang, lines });
            }
            Some((lang, mut lines)) => {
                lines.push(line.to_string());
                code = Some((lang, lines));
            }
            None if trimmed.starts_with(FENCE) => {
                if !text_lines.is_empty() {
                    blocks.push(Block::Text(std::mem::take(&mut text_lines)));
                }
                let lang = trimmed[FENCE.len()..].trim();
                let lang = (!lang.is_empty()).then(|| lang.to_string());
                code = Some((lang, Vec::new()));
            }
            None => text_lines.push(line.to_string()),
        }
    }

    if let Some((lang, lines)) = code {
        blocks.push(Block::Code { lang, lines });
    }
    if !text_lines.is_empty() {
        blocks.push(Block::Text(text_lines));
    }

    blocks
}

pub struct CodeHighlighter {
    syntaxes: SyntaxSet,
    theme: Theme,
}

impl CodeHighlighter {
    pub fn new() -> Self {
        let mut themes = ThemeSet::load_defaults();
        Self {
            syntaxes: SyntaxSet::load_defaults_nonewlines(),
            theme: themes.themes.remove(THEME_NAME).unwrap_or_default(),
        }
    }

    pub fn highlight(&self, lang: Option<&str>, code: &[String]) -> Vec<Line<'static>> {
        let syntax = lang
            .and_then(|token| self.syntaxes.find_syntax_by_token(token))
            .unwrap_or_else(|| self.syntaxes.find_syntax_plain_text());
        let mut highlighter = HighlightLines::new(syntax, &self.theme);

        code.iter()
            .map(|line| {
                let mut spans = vec![gutter()];
                match highlighter.highlight_line(line, &self.syntaxes) {
                    Ok(ranges) => spans.extend(ranges.into_iter().map(|(style, text)| {
                        let fg = style.foreground;
                        Span::styled(text.to_string(), Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b)))
                    })),
                    Err(e) => {
                        debug!("Highlighting failed, rendering plain: {e}");
                        spans.push(Span::styled(line.clone(), Style::default().fg(Color::Gray)));
                    }
                }
                Line::from(spans)
            })
            .collect()
    }

    /// Lines for a bot message.
    pub fn render(&self, text: &str) -> Vec<Line<'static>> {
        let mut lines = Vec::new();

        for block in parse_blocks(text) {
            match block {
                Block::Text(text_lines) => lines.extend(text_lines.iter().map(|l| text_line(l))),
                Block::Code { lang, lines: code } => {
                    let label = lang.as_deref().unwrap_or("code");
                    lines.push(Line::from(Span::styled(
                        format!("┌ {label}"),
                        Style::default().fg(Color::DarkGray),
                    )));
                    lines.extend(self.highlight(lang.as_deref(), &code));
                }
            }
        }

        lines
    }
}

impl Default for CodeHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

fn gutter() -> Span<'static> {
    Span::styled("│ ", Style::default().fg(Color::DarkGray))
}

fn text_line(line: &str) -> Line<'static> {
    let trimmed = line.trim_start();
    if let Some(heading) = trimmed.strip_prefix('#') {
        let heading = heading.trim_start_matches('#').trim();
        return Line::from(Span::styled(
            heading.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ));
    }
    if let Some(item) = trimmed.strip_prefix("- ").or_else(|| trimmed.strip_prefix("* ")) {
        let indent = line.len() - trimmed.len();
        return Line::from(format!("{}• {}", " ".repeat(indent), item));
    }
    Line::from(line.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn parse_blocks_splits_code_fences() {
        let text = "Here you go:\n```rust\nfn main() {}\n```\nDone.";
        let blocks = parse_blocks(text);

        assert_eq!(
            blocks,
            vec![
                Block::Text(vec!["Here you go:".to_string()]),
                Block::Code {
                    lang: Some("rust".to_string()),
                    lines: vec!["fn main() {}".to_string()],
                },
                Block::Text(vec!["Done.".to_string()]),
            ]
        );
    }

    #[test]
    fn parse_blocks_handles_unterminated_fence() {
        let blocks = parse_blocks("```\nprint(1)");
        assert_eq!(
            blocks,
            vec![Block::Code {
                lang: None,
                lines: vec!["print(1)".to_string()],
            }]
        );
    }

    #[test]
    fn parse_blocks_plain_text_only() {
        let blocks = parse_blocks("one\n\ntwo");
        assert_eq!(
            blocks,
            vec![Block::Text(vec![
                "one".to_string(),
                String::new(),
                "two".to_string()
            ])]
        );
    }

    #[test]
    fn render_keeps_code_text() {
        let highlighter = CodeHighlighter::new();
        let lines = highlighter.render("```rust\nlet x = 1;\n```");

        assert_eq!(lines.len(), 2);
        assert_eq!(plain(&lines[0]), "┌ rust");
        assert_eq!(plain(&lines[1]), "│ let x = 1;");
    }

    #[test]
    fn render_unknown_language_falls_back_to_plain_text() {
        let highlighter = CodeHighlighter::new();
        let lines = highlighter.render("```nosuchlang\nsome code\n```");
        assert_eq!(plain(&lines[1]), "│ some code");
    }

    #[test]
    fn render_turns_dashes_into_bullets() {
        let highlighter = CodeHighlighter::new();
        let lines = highlighter.render("I can help with:\n- Writing and analysis");
        assert_eq!(plain(&lines[1]), "• Writing and analysis");
    }
}
