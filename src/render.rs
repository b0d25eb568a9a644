use anyhow::{Context, Result};
use serde::Serialize;

use crate::annotate::AnnotatedToken;
use crate::session::{DisplayRow, RequestState, Session, SessionDisplay};

const MIN_COLUMN_WIDTH: usize = 8;
const SEPARATOR: &str = " | ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub column_width: usize,
    pub annotate: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            column_width: 40,
            annotate: true,
        }
    }
}

/// Renders every row as two columns, source on the left.
pub fn render_display(display: &SessionDisplay, options: &RenderOptions) -> String {
    let width = options.column_width.max(MIN_COLUMN_WIDTH);
    let mut lines = header(display, width);
    for row in &display.rows {
        lines.push(format_row(
            &source_cell(&row.source, options.annotate),
            &row.target,
            width,
        ));
    }
    lines.join("\n")
}

/// Renders `height` rows with each column starting at its own pane offset.
pub fn render_window(
    display: &SessionDisplay,
    source_offset: usize,
    target_offset: usize,
    height: usize,
    options: &RenderOptions,
) -> String {
    let width = options.column_width.max(MIN_COLUMN_WIDTH);
    let mut lines = header(display, width);
    for step in 0..height {
        let source = display.rows.get(source_offset + step);
        let target = display.rows.get(target_offset + step);
        if source.is_none() && target.is_none() {
            break;
        }
        let source = source
            .map(|row| source_cell(&row.source, options.annotate))
            .unwrap_or_default();
        let target = target.map(|row| row.target.as_str()).unwrap_or_default();
        lines.push(format_row(&source, target, width));
    }
    lines.join("\n")
}

/// One-line summary of the request state.
pub fn render_status(session: &Session) -> String {
    match session.state() {
        RequestState::Idle => "idle".to_string(),
        RequestState::Loading(ticket) => format!("loading #{} ({:?})", ticket.seq, ticket.kind),
        RequestState::Success => match session.display() {
            Some(display) => format!(
                "ready #{} ({} rows)",
                display.generation,
                display.rows.len()
            ),
            None => "ready".to_string(),
        },
        RequestState::Error(message) => format!("Error: {}", message),
    }
}

#[derive(Serialize)]
struct JsonView<'a> {
    generation: u64,
    source_language: &'a str,
    target_language: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    audio_preview_url: Option<&'a str>,
    rows: &'a [DisplayRow],
}

pub fn render_json(display: &SessionDisplay) -> Result<String> {
    let view = JsonView {
        generation: display.generation,
        source_language: &display.payload.source.language,
        target_language: &display.payload.target.language,
        audio_preview_url: display.payload.audio_preview_url.as_deref(),
        rows: &display.rows,
    };
    serde_json::to_string_pretty(&view).with_context(|| "failed to serialize display")
}

fn header(display: &SessionDisplay, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(url) = display.payload.audio_preview_url.as_deref() {
        lines.push(format!("audio: {}", url));
    }
    lines.push(format_row(
        &display.payload.source.language,
        &display.payload.target.language,
        width,
    ));
    lines.push(format!("{}-+-{}", "-".repeat(width), "-".repeat(width)));
    lines
}

fn source_cell(tokens: &[AnnotatedToken], annotate: bool) -> String {
    let mut cell = String::new();
    for token in tokens {
        cell.push_str(&token.text);
        if annotate && let Some(translation) = token.translation.as_deref() {
            cell.push('[');
            cell.push_str(translation);
            cell.push(']');
        }
    }
    cell
}

fn format_row(source: &str, target: &str, width: usize) -> String {
    let line = format!("{}{}{}", fit(source, width), SEPARATOR, target);
    line.trim_end().to_string()
}

fn fit(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count > width {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    } else {
        format!("{}{}", text, " ".repeat(width - count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::WordTranslationEntry;
    use crate::service::TranslationPayload;
    use crate::text::LyricsText;

    fn display() -> SessionDisplay {
        let payload = TranslationPayload::new(
            LyricsText::parse("El Sol Brilla\nla luna\n\nya", "es"),
            LyricsText::parse("The sun shines\nthe moon", "en"),
        )
        .with_word_translations(vec![WordTranslationEntry::new(0, "sol", "sun")]);
        SessionDisplay::build(3, payload)
    }

    fn options(annotate: bool) -> RenderOptions {
        RenderOptions {
            column_width: 20,
            annotate,
        }
    }

    #[test]
    fn rows_are_padded_and_annotated() {
        let output = render_display(&display(), &options(true));
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], format!("es{} | en", " ".repeat(18)));
        assert_eq!(lines[2], "El Sol[sun] Brilla   | The sun shines");
        assert_eq!(lines[4], format!("{} |", " ".repeat(20)));
        assert_eq!(lines[5], format!("ya{} |", " ".repeat(18)));
    }

    #[test]
    fn annotations_can_be_hidden() {
        let output = render_display(&display(), &options(false));
        assert!(output.contains("El Sol Brilla        | The sun shines"));
        assert!(!output.contains("[sun]"));
    }

    #[test]
    fn long_cells_are_truncated() {
        assert_eq!(fit("abcdefghij", 8), "abcdefg…");
        assert_eq!(fit("abc", 5), "abc  ");
    }

    #[test]
    fn window_uses_independent_offsets() {
        let output = render_window(&display(), 1, 0, 2, &options(true));
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[2], format!("la luna{} | The sun shines", " ".repeat(13)));
        assert_eq!(lines[3], format!("{} | the moon", " ".repeat(20)));
    }

    #[test]
    fn json_view_skips_absent_translations() {
        let json = render_json(&display()).expect("json");
        let value: serde_json::Value = serde_json::from_str(&json).expect("parse");
        assert_eq!(value["generation"], 3);
        assert_eq!(value["rows"][0]["source"][2]["translation"], "sun");
        assert!(value["rows"][0]["source"][0].get("translation").is_none());
        assert!(value.get("audio_preview_url").is_none());
    }

    #[test]
    fn status_reports_errors_with_prefix() {
        let mut session = Session::new();
        assert_eq!(render_status(&session), "idle");
        let _ = session.begin(&crate::service::TranslateRequest::text("", "es", "en"));
        assert_eq!(render_status(&session), "Error: Please paste some lyrics");
    }
}
