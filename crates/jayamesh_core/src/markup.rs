//! Lightweight note markup: line blocks plus bold/italic/link inlines.
//!
//! # Responsibility
//! - Turn raw note text into renderer-independent directives.
//! - Provide a plain-text renderer for terminal output.
//!
//! # Invariants
//! - Pure: no I/O, never fails; unmatched delimiters stay literal text.
//! - Bold is resolved before italic, italic before URL linking.
//! - URLs are only linked in plain text, never inside bold or italic.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static BOLD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid bold regex"));
static ITALIC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"_(.*?)_").expect("valid italic regex"));
static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").expect("valid url regex"));

/// Inline run inside one block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Inline {
    Text { text: String },
    Bold { text: String },
    Italic { text: String },
    BoldItalic { text: String },
    Link { href: String, text: String },
}

impl Inline {
    /// Visible text of the run.
    pub fn text(&self) -> &str {
        match self {
            Self::Text { text }
            | Self::Bold { text }
            | Self::Italic { text }
            | Self::BoldItalic { text }
            | Self::Link { text, .. } => text,
        }
    }
}

/// One rendered line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "inlines", rename_all = "camelCase")]
pub enum NoteBlock {
    /// Blank input line.
    Spacer,
    Paragraph(Vec<Inline>),
    /// Line starting with `- `.
    Bullet(Vec<Inline>),
    /// Line starting with `> `.
    Quote(Vec<Inline>),
}

/// Formats note text into one block per input line.
pub fn format_note(text: &str) -> Vec<NoteBlock> {
    text.split('\n').map(format_line).collect()
}

fn format_line(line: &str) -> NoteBlock {
    let line = line.strip_suffix('\r').unwrap_or(line);
    if line.trim().is_empty() {
        return NoteBlock::Spacer;
    }
    let trimmed = line.trim_start();
    if let Some(rest) = trimmed.strip_prefix("- ") {
        return NoteBlock::Bullet(format_inlines(rest));
    }
    if let Some(rest) = trimmed.strip_prefix("> ") {
        return NoteBlock::Quote(format_inlines(rest));
    }
    NoteBlock::Paragraph(format_inlines(line))
}

/// Splits one line into inline runs.
pub fn format_inlines(line: &str) -> Vec<Inline> {
    let mut inlines = Vec::new();
    let mut cursor = 0;
    for caps in BOLD_RE.captures_iter(line) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        push_italics(&mut inlines, &line[cursor..whole.start()], false);
        push_italics(&mut inlines, inner.as_str(), true);
        cursor = whole.end();
    }
    push_italics(&mut inlines, &line[cursor..], false);
    inlines
}

fn push_italics(out: &mut Vec<Inline>, segment: &str, bold: bool) {
    let mut cursor = 0;
    for caps in ITALIC_RE.captures_iter(segment) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        push_plain(out, &segment[cursor..whole.start()], bold);
        if !inner.as_str().is_empty() {
            let text = inner.as_str().to_string();
            out.push(if bold {
                Inline::BoldItalic { text }
            } else {
                Inline::Italic { text }
            });
        }
        cursor = whole.end();
    }
    push_plain(out, &segment[cursor..], bold);
}

fn push_plain(out: &mut Vec<Inline>, segment: &str, bold: bool) {
    if segment.is_empty() {
        return;
    }
    if bold {
        out.push(Inline::Bold {
            text: segment.to_string(),
        });
        return;
    }

    let mut cursor = 0;
    for url in URL_RE.find_iter(segment) {
        if url.start() > cursor {
            out.push(Inline::Text {
                text: segment[cursor..url.start()].to_string(),
            });
        }
        out.push(Inline::Link {
            href: url.as_str().to_string(),
            text: url.as_str().to_string(),
        });
        cursor = url.end();
    }
    if cursor < segment.len() {
        out.push(Inline::Text {
            text: segment[cursor..].to_string(),
        });
    }
}

/// Renders blocks as terminal text: bullets as `•`, quotes behind `│`.
pub fn render_text(blocks: &[NoteBlock]) -> String {
    let lines: Vec<String> = blocks
        .iter()
        .map(|block| match block {
            NoteBlock::Spacer => String::new(),
            NoteBlock::Paragraph(inlines) => join_inlines(inlines),
            NoteBlock::Bullet(inlines) => format!("• {}", join_inlines(inlines)),
            NoteBlock::Quote(inlines) => format!("│ {}", join_inlines(inlines)),
        })
        .collect();
    lines.join("\n")
}

fn join_inlines(inlines: &[Inline]) -> String {
    inlines.iter().map(Inline::text).collect()
}

#[cfg(test)]
mod tests {
    use super::{format_inlines, format_note, render_text, Inline, NoteBlock};

    fn text(value: &str) -> Inline {
        Inline::Text {
            text: value.to_string(),
        }
    }

    #[test]
    fn dash_line_becomes_bullet() {
        assert_eq!(format_note("- a"), vec![NoteBlock::Bullet(vec![text("a")])]);
        assert_eq!(
            format_note("   > quoted"),
            vec![NoteBlock::Quote(vec![text("quoted")])]
        );
    }

    #[test]
    fn blank_lines_become_spacers() {
        let blocks = format_note("one\n\n  \ntwo");
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[1], NoteBlock::Spacer);
        assert_eq!(blocks[2], NoteBlock::Spacer);
    }

    #[test]
    fn bold_then_italic_inside_bold() {
        assert_eq!(
            format_inlines("**b**"),
            vec![Inline::Bold {
                text: "b".to_string()
            }]
        );
        assert_eq!(
            format_inlines("**very _fast_ ball**"),
            vec![
                Inline::Bold {
                    text: "very ".to_string()
                },
                Inline::BoldItalic {
                    text: "fast".to_string()
                },
                Inline::Bold {
                    text: " ball".to_string()
                },
            ]
        );
    }

    #[test]
    fn bare_url_links_to_itself() {
        let inlines = format_inlines("see https://example.com/docs now");
        assert_eq!(
            inlines,
            vec![
                text("see "),
                Inline::Link {
                    href: "https://example.com/docs".to_string(),
                    text: "https://example.com/docs".to_string(),
                },
                text(" now"),
            ]
        );
    }

    #[test]
    fn urls_inside_bold_are_not_linked() {
        assert_eq!(
            format_inlines("**http://a.io**"),
            vec![Inline::Bold {
                text: "http://a.io".to_string()
            }]
        );
    }

    #[test]
    fn unmatched_delimiters_stay_literal() {
        assert_eq!(format_inlines("**open"), vec![text("**open")]);
        assert_eq!(format_inlines("snake_case"), vec![text("snake_case")]);
    }

    #[test]
    fn plain_renderer_uses_bullet_and_bar() {
        let blocks = format_note("Title\n- **one**\n> two\n\nend");
        assert_eq!(render_text(&blocks), "Title\n• one\n│ two\n\nend");
    }
}
