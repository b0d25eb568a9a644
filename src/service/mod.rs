use serde::Serialize;
use std::future::Future;
use std::pin::Pin;

use crate::alignment::LinePair;
use crate::annotate::WordTranslationEntry;
use crate::error::LyricsError;
use crate::session::RequestKind;
use crate::text::LyricsText;

mod http;
mod models;

pub use http::HttpLyricsService;
pub(crate) use http::DEFAULT_BASE_URL;

/// Look up a work by artist and title, then translate its lyrics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub artist: String,
    pub title: String,
    pub source_language: String,
    pub target_language: String,
}

/// Translate lyrics supplied by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextQuery {
    pub text: String,
    pub source_language: String,
    pub target_language: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslateRequest {
    Search(SearchQuery),
    Text(TextQuery),
}

impl TranslateRequest {
    pub fn search(
        artist: impl Into<String>,
        title: impl Into<String>,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
    ) -> Self {
        TranslateRequest::Search(SearchQuery {
            artist: artist.into(),
            title: title.into(),
            source_language: source_language.into(),
            target_language: target_language.into(),
        })
    }

    pub fn text(
        text: impl Into<String>,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
    ) -> Self {
        TranslateRequest::Text(TextQuery {
            text: text.into(),
            source_language: source_language.into(),
            target_language: target_language.into(),
        })
    }

    pub fn kind(&self) -> RequestKind {
        match self {
            TranslateRequest::Search(_) => RequestKind::Search,
            TranslateRequest::Text(_) => RequestKind::Text,
        }
    }

    pub fn languages(&self) -> (&str, &str) {
        match self {
            TranslateRequest::Search(query) => (&query.source_language, &query.target_language),
            TranslateRequest::Text(query) => (&query.source_language, &query.target_language),
        }
    }

    /// Checks the identifying fields locally. Language codes are opaque and
    /// only need to be present.
    pub fn validate(&self) -> Result<(), LyricsError> {
        match self {
            TranslateRequest::Search(query) => {
                if query.artist.trim().is_empty() || query.title.trim().is_empty() {
                    return Err(LyricsError::validation(
                        "Please enter both artist and song title",
                    ));
                }
            }
            TranslateRequest::Text(query) => {
                if query.text.trim().is_empty() {
                    return Err(LyricsError::validation("Please paste some lyrics"));
                }
            }
        }
        let (source, target) = self.languages();
        if source.trim().is_empty() || target.trim().is_empty() {
            return Err(LyricsError::validation(
                "source and target language are both required",
            ));
        }
        Ok(())
    }
}

/// Validated result of either request kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationPayload {
    pub source: LyricsText,
    pub target: LyricsText,
    pub line_pairs: Option<Vec<LinePair>>,
    pub word_translations: Vec<WordTranslationEntry>,
    pub audio_preview_url: Option<String>,
}

impl TranslationPayload {
    pub fn new(source: LyricsText, target: LyricsText) -> Self {
        Self {
            source,
            target,
            line_pairs: None,
            word_translations: Vec::new(),
            audio_preview_url: None,
        }
    }

    pub fn with_line_pairs(mut self, pairs: Vec<LinePair>) -> Self {
        self.line_pairs = Some(pairs);
        self
    }

    pub fn with_word_translations(mut self, entries: Vec<WordTranslationEntry>) -> Self {
        self.word_translations = entries;
        self
    }

    pub fn with_audio_preview_url(mut self, url: impl Into<String>) -> Self {
        self.audio_preview_url = Some(url.into());
        self
    }
}

pub type ServiceFuture =
    Pin<Box<dyn Future<Output = Result<TranslationPayload, LyricsError>> + Send>>;

/// The external collaborator that retrieves and translates lyrics.
pub trait LyricsService {
    fn translate_by_search(&self, query: SearchQuery) -> ServiceFuture;
    fn translate_by_text(&self, query: TextQuery) -> ServiceFuture;

    fn translate(&self, request: TranslateRequest) -> ServiceFuture {
        match request {
            TranslateRequest::Search(query) => self.translate_by_search(query),
            TranslateRequest::Text(query) => self.translate_by_text(query),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_requires_artist_and_title() {
        let request = TranslateRequest::search("  ", "La Camisa Negra", "es", "en");
        assert_eq!(
            request.validate(),
            Err(LyricsError::Validation(
                "Please enter both artist and song title".to_string()
            ))
        );
        let request = TranslateRequest::search("Juanes", "\t", "es", "en");
        assert!(request.validate().is_err());
        let request = TranslateRequest::search("Juanes", "La Camisa Negra", "es", "en");
        assert_eq!(request.validate(), Ok(()));
    }

    #[test]
    fn text_requires_content() {
        let request = TranslateRequest::text(" \n \n", "es", "en");
        assert!(matches!(request.validate(), Err(LyricsError::Validation(_))));
        assert_eq!(request.kind(), RequestKind::Text);
    }

    #[test]
    fn languages_must_be_present_but_are_not_checked() {
        let request = TranslateRequest::text("hola", "es", " ");
        assert!(request.validate().is_err());
        let request = TranslateRequest::text("hola", "xx-made-up", "yy");
        assert_eq!(request.validate(), Ok(()));
    }
}
