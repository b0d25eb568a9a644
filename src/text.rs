use serde::{Deserialize, Serialize};

/// Lyrics in one language, one entry per display line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LyricsText {
    pub language: String,
    pub lines: Vec<String>,
}

impl LyricsText {
    /// Splits `raw` on line breaks. Blank lines are kept; an empty input
    /// yields a single empty line.
    pub fn parse(raw: &str, language: impl Into<String>) -> Self {
        let lines = raw
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
            .collect();
        Self {
            language: language.into(),
            lines,
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    pub fn to_raw(&self) -> String {
        self.lines.join("\n")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub is_whitespace: bool,
}

/// Splits a line into maximal runs of whitespace and non-whitespace.
/// Concatenating the token texts reproduces `line` exactly.
pub fn tokenize(line: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut current: Option<bool> = None;
    for (idx, ch) in line.char_indices() {
        let is_whitespace = ch.is_whitespace();
        match current {
            Some(kind) if kind == is_whitespace => {}
            Some(kind) => {
                tokens.push(Token {
                    text: &line[start..idx],
                    is_whitespace: kind,
                });
                start = idx;
                current = Some(is_whitespace);
            }
            None => current = Some(is_whitespace),
        }
    }
    if let Some(kind) = current {
        tokens.push(Token {
            text: &line[start..],
            is_whitespace: kind,
        });
    }
    tokens
}

/// Lookup key for a token: lowercased, keeping only letters, digits and `_`.
pub fn normalize_word(token: &str) -> String {
    token
        .to_lowercase()
        .chars()
        .filter(|ch| ch.is_alphanumeric() || *ch == '_')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined(line: &str) -> String {
        tokenize(line).iter().map(|token| token.text).collect()
    }

    #[test]
    fn parse_keeps_blank_lines() {
        let text = LyricsText::parse("uno\n\ndos\n", "es");
        assert_eq!(text.lines, vec!["uno", "", "dos", ""]);
        assert_eq!(text.language, "es");
    }

    #[test]
    fn parse_strips_carriage_returns() {
        let text = LyricsText::parse("uno\r\ndos", "es");
        assert_eq!(text.lines, vec!["uno", "dos"]);
        assert_eq!(text.to_raw(), "uno\ndos");
    }

    #[test]
    fn parse_empty_input_is_one_blank_line() {
        let text = LyricsText::parse("", "es");
        assert_eq!(text.len(), 1);
        assert_eq!(text.line(0), Some(""));
    }

    #[test]
    fn tokenize_alternates_runs() {
        let tokens = tokenize("  El Sol\tBrilla ");
        let texts: Vec<_> = tokens.iter().map(|token| token.text).collect();
        assert_eq!(texts, vec!["  ", "El", " ", "Sol", "\t", "Brilla", " "]);
        assert!(tokens[0].is_whitespace);
        assert!(!tokens[1].is_whitespace);
    }

    #[test]
    fn tokenize_round_trips() {
        for line in [
            "",
            "   ",
            "\t \u{3000}",
            "El Sol Brilla",
            "  ¿Dónde   estás?  ",
            "a",
            "canción\u{a0}de amor",
        ] {
            assert_eq!(joined(line), line);
        }
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn normalize_lowercases_and_strips_punctuation() {
        assert_eq!(normalize_word("Sol"), "sol");
        assert_eq!(normalize_word("¡Corazón!"), "corazón");
        assert_eq!(normalize_word("don't"), "dont");
        assert_eq!(normalize_word("snake_case"), "snake_case");
        assert_eq!(normalize_word("..."), "");
    }
}
