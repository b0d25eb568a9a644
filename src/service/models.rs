use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::alignment::LinePair;
use crate::annotate::{
    VocabularyItem, WordTranslationEntry, expand_vocabulary, expand_vocabulary_for_pairs,
};
use crate::error::LyricsError;
use crate::session::RequestKind;
use crate::text::{LyricsText, normalize_word};

use super::TranslationPayload;

#[derive(Debug, Serialize)]
pub(crate) struct SearchBody<'a> {
    pub(crate) artist: &'a str,
    pub(crate) title: &'a str,
    pub(crate) source_language: &'a str,
    pub(crate) target_language: &'a str,
}

/// Raw-text request body. Older backends only read `spanish_text`, newer
/// ones `text`; both carry the same lyrics.
#[derive(Debug, Serialize)]
pub(crate) struct TextBody<'a> {
    pub(crate) text: &'a str,
    pub(crate) spanish_text: &'a str,
    pub(crate) source_language: &'a str,
    pub(crate) target_language: &'a str,
}

/// Response body of both endpoints. Older backends used the field names
/// given as aliases.
#[derive(Debug, Deserialize)]
pub(crate) struct WireResponse {
    #[serde(alias = "spanish_lyrics")]
    pub(crate) source_lyrics: Option<String>,
    #[serde(alias = "english_lyrics")]
    pub(crate) target_lyrics: Option<String>,
    #[serde(alias = "word_pairs")]
    pub(crate) line_pairs: Option<Vec<WireLinePair>>,
    pub(crate) word_translations: Option<Vec<WireWordTranslation>>,
    pub(crate) vocabulary: Option<Vec<WireVocabularyItem>>,
    #[serde(alias = "audio_url")]
    pub(crate) audio_preview_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireLinePair {
    pub(crate) index: Option<usize>,
    #[serde(alias = "spanish")]
    pub(crate) source: String,
    #[serde(alias = "english")]
    pub(crate) target: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireWordTranslation {
    pub(crate) line_index: usize,
    #[serde(alias = "word")]
    pub(crate) normalized_word: String,
    pub(crate) translation: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireVocabularyItem {
    #[serde(alias = "spanish")]
    pub(crate) word: String,
    #[serde(alias = "english")]
    pub(crate) translation: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct WireError {
    pub(crate) detail: Option<Value>,
    pub(crate) error: Option<String>,
}

impl WireResponse {
    pub(crate) fn into_payload(
        self,
        kind: RequestKind,
        source_language: &str,
        target_language: &str,
    ) -> Result<TranslationPayload, LyricsError> {
        let source_raw = self
            .source_lyrics
            .ok_or_else(|| LyricsError::collaborator(kind, "response is missing source_lyrics"))?;
        let target_raw = self
            .target_lyrics
            .ok_or_else(|| LyricsError::collaborator(kind, "response is missing target_lyrics"))?;

        let source = LyricsText::parse(&source_raw, source_language);
        let target = LyricsText::parse(&target_raw, target_language);

        let line_pairs = self
            .line_pairs
            .filter(|pairs| !pairs.is_empty())
            .map(|pairs| {
                pairs
                    .into_iter()
                    .enumerate()
                    .map(|(position, pair)| {
                        LinePair::new(pair.index.unwrap_or(position), pair.source, pair.target)
                    })
                    .collect::<Vec<_>>()
            });

        let word_translations = match self.word_translations {
            Some(entries) if !entries.is_empty() => entries
                .into_iter()
                .map(|entry| {
                    WordTranslationEntry::new(
                        entry.line_index,
                        normalize_word(&entry.normalized_word),
                        entry.translation,
                    )
                })
                .collect(),
            _ => {
                let vocabulary: Vec<VocabularyItem> = self
                    .vocabulary
                    .unwrap_or_default()
                    .into_iter()
                    .map(|item| VocabularyItem {
                        word: item.word,
                        translation: item.translation,
                    })
                    .collect();
                match line_pairs.as_deref() {
                    Some(pairs) => expand_vocabulary_for_pairs(pairs, &vocabulary),
                    None => expand_vocabulary(&source, &vocabulary),
                }
            }
        };

        let audio_preview_url = match kind {
            RequestKind::Search => self
                .audio_preview_url
                .filter(|url| !url.trim().is_empty()),
            RequestKind::Text => None,
        };

        Ok(TranslationPayload {
            source,
            target,
            line_pairs,
            word_translations,
            audio_preview_url,
        })
    }
}

impl WireError {
    /// Picks the collaborator's message: a string `detail` (or the `msg` of
    /// the first structured detail), then `error`.
    pub(crate) fn message(self) -> Option<String> {
        let detail = match self.detail {
            Some(Value::String(text)) => Some(text),
            Some(Value::Array(items)) => items
                .first()
                .and_then(|item| item.get("msg"))
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        };
        detail
            .or(self.error)
            .filter(|message| !message.trim().is_empty())
    }
}
