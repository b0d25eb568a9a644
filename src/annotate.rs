use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::alignment::LinePair;
use crate::text::{LyricsText, Token, normalize_word, tokenize};

/// A translation for one normalized word, scoped to a single source line.
/// Entries whose `line_index` points past the source text never match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordTranslationEntry {
    pub line_index: usize,
    pub normalized_word: String,
    pub translation: String,
}

impl WordTranslationEntry {
    pub fn new(
        line_index: usize,
        normalized_word: impl Into<String>,
        translation: impl Into<String>,
    ) -> Self {
        Self {
            line_index,
            normalized_word: normalized_word.into(),
            translation: translation.into(),
        }
    }
}

/// A line-agnostic `word -> translation` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyItem {
    pub word: String,
    pub translation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotatedToken {
    pub text: String,
    pub is_whitespace: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
}

pub fn annotate_line(
    line: &str,
    line_index: usize,
    entries: &[WordTranslationEntry],
) -> Vec<AnnotatedToken> {
    annotate_tokens(&tokenize(line), line_index, entries)
}

/// Attaches translations to the word tokens of line `line_index`.
///
/// Only entries scoped to that line are considered. When several entries on
/// the line share a normalized word, the first one in `entries` wins; the
/// choice is arbitrary but stable.
pub fn annotate_tokens(
    tokens: &[Token<'_>],
    line_index: usize,
    entries: &[WordTranslationEntry],
) -> Vec<AnnotatedToken> {
    let scoped: Vec<&WordTranslationEntry> = entries
        .iter()
        .filter(|entry| entry.line_index == line_index)
        .collect();

    tokens
        .iter()
        .map(|token| {
            let translation = if token.is_whitespace || scoped.is_empty() {
                None
            } else {
                lookup(&scoped, &normalize_word(token.text)).map(str::to_string)
            };
            AnnotatedToken {
                text: token.text.to_string(),
                is_whitespace: token.is_whitespace,
                translation,
            }
        })
        .collect()
}

fn lookup<'e>(scoped: &[&'e WordTranslationEntry], normalized: &str) -> Option<&'e str> {
    if normalized.is_empty() {
        return None;
    }
    scoped
        .iter()
        .find(|entry| entry.normalized_word == normalized)
        .map(|entry| entry.translation.as_str())
}

/// Turns a line-agnostic vocabulary into line-scoped entries: one entry per
/// source line and vocabulary word occurring on it. Vocabulary order is kept,
/// so the first-match rule still picks the earliest vocabulary item.
pub fn expand_vocabulary(
    source: &LyricsText,
    vocabulary: &[VocabularyItem],
) -> Vec<WordTranslationEntry> {
    expand_lines(
        source
            .lines
            .iter()
            .enumerate()
            .map(|(index, line)| (index, line.as_str())),
        vocabulary,
    )
}

/// Same as [`expand_vocabulary`], but scoped to explicit pairs: each entry
/// takes the `index` of the pair whose source line contains the word, so it
/// lands on the row built from that pair.
pub fn expand_vocabulary_for_pairs(
    pairs: &[LinePair],
    vocabulary: &[VocabularyItem],
) -> Vec<WordTranslationEntry> {
    expand_lines(
        pairs
            .iter()
            .map(|pair| (pair.index, pair.source_line.as_str())),
        vocabulary,
    )
}

fn expand_lines<'l>(
    lines: impl Iterator<Item = (usize, &'l str)>,
    vocabulary: &[VocabularyItem],
) -> Vec<WordTranslationEntry> {
    let normalized: Vec<(String, &str)> = vocabulary
        .iter()
        .map(|item| (normalize_word(&item.word), item.translation.as_str()))
        .filter(|(word, _)| !word.is_empty())
        .collect();

    let mut entries = Vec::new();
    for (line_index, line) in lines {
        let words: HashSet<String> = tokenize(line)
            .iter()
            .filter(|token| !token.is_whitespace)
            .map(|token| normalize_word(token.text))
            .collect();
        let mut seen = HashSet::new();
        for (word, translation) in &normalized {
            if words.contains(word) && seen.insert(word.as_str()) {
                entries.push(WordTranslationEntry::new(line_index, word.clone(), *translation));
            }
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translations(tokens: &[AnnotatedToken]) -> Vec<(&str, Option<&str>)> {
        tokens
            .iter()
            .filter(|token| !token.is_whitespace)
            .map(|token| (token.text.as_str(), token.translation.as_deref()))
            .collect()
    }

    #[test]
    fn matches_case_insensitively() {
        let entries = vec![WordTranslationEntry::new(0, "sol", "sun")];
        let tokens = annotate_line("El Sol Brilla", 0, &entries);
        assert_eq!(
            translations(&tokens),
            vec![("El", None), ("Sol", Some("sun")), ("Brilla", None)]
        );
    }

    #[test]
    fn entries_are_scoped_to_their_line() {
        let entries = vec![WordTranslationEntry::new(1, "sol", "sun")];
        let tokens = annotate_line("El Sol Brilla", 0, &entries);
        assert!(tokens.iter().all(|token| token.translation.is_none()));

        let tokens = annotate_line("Sol de noche", 1, &entries);
        assert_eq!(tokens[0].translation.as_deref(), Some("sun"));
    }

    #[test]
    fn out_of_range_entry_is_inert() {
        let entries = vec![WordTranslationEntry::new(99, "sol", "sun")];
        let tokens = annotate_line("Sol", 0, &entries);
        assert_eq!(tokens[0].translation, None);
    }

    #[test]
    fn first_entry_wins_and_repeats_share_it() {
        let entries = vec![
            WordTranslationEntry::new(0, "sol", "sun"),
            WordTranslationEntry::new(0, "sol", "sunshine"),
        ];
        let tokens = annotate_line("sol, sol!", 0, &entries);
        assert_eq!(
            translations(&tokens),
            vec![("sol,", Some("sun")), ("sol!", Some("sun"))]
        );
    }

    #[test]
    fn whitespace_and_punctuation_stay_unannotated() {
        let entries = vec![WordTranslationEntry::new(0, "", "nothing")];
        let tokens = annotate_line("  ...  ", 0, &entries);
        assert!(tokens.iter().all(|token| token.translation.is_none()));
    }

    #[test]
    fn annotation_round_trips_text() {
        let entries = vec![WordTranslationEntry::new(0, "corazón", "heart")];
        for line in ["", "   ", "Mi  ¡Corazón!\t", "sin nada"] {
            let joined: String = annotate_line(line, 0, &entries)
                .into_iter()
                .map(|token| token.text)
                .collect();
            assert_eq!(joined, line);
        }
    }

    #[test]
    fn vocabulary_expands_per_line() {
        let source = LyricsText::parse("La luna y el Sol\n\nsol sol\nnada", "es");
        let vocabulary = vec![
            VocabularyItem {
                word: "Sol".to_string(),
                translation: "sun".to_string(),
            },
            VocabularyItem {
                word: "luna".to_string(),
                translation: "moon".to_string(),
            },
            VocabularyItem {
                word: "!!".to_string(),
                translation: "ignored".to_string(),
            },
        ];
        let entries = expand_vocabulary(&source, &vocabulary);
        assert_eq!(
            entries,
            vec![
                WordTranslationEntry::new(0, "sol", "sun"),
                WordTranslationEntry::new(0, "luna", "moon"),
                WordTranslationEntry::new(2, "sol", "sun"),
            ]
        );
    }

    #[test]
    fn vocabulary_follows_explicit_pair_indices() {
        let pairs = vec![
            LinePair::new(0, "uno sol", "one sun"),
            LinePair::new(1, "sol dos", "sun two"),
        ];
        let vocabulary = vec![VocabularyItem {
            word: "sol".to_string(),
            translation: "sun".to_string(),
        }];
        let entries = expand_vocabulary_for_pairs(&pairs, &vocabulary);
        assert_eq!(
            entries,
            vec![
                WordTranslationEntry::new(0, "sol", "sun"),
                WordTranslationEntry::new(1, "sol", "sun"),
            ]
        );
        let row = annotate_line(&pairs[1].source_line, pairs[1].index, &entries);
        assert_eq!(translations(&row)[0], ("sol", Some("sun")));
    }
}
