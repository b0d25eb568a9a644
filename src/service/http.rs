use anyhow::{Context, Result};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::LyricsError;
use crate::session::RequestKind;

use super::models::{SearchBody, TextBody, WireError, WireResponse};
use super::{LyricsService, SearchQuery, ServiceFuture, TextQuery, TranslationPayload};

pub(crate) const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const SEARCH_PATH: &str = "/translate-song";
const TEXT_PATH: &str = "/translate-text";

/// Talks to the lyrics backend over JSON/HTTP.
#[derive(Debug, Clone)]
pub struct HttpLyricsService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpLyricsService {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .with_context(|| "failed to build HTTP client")?;
        let base_url = base_url.into();
        let base_url = if base_url.trim().is_empty() {
            DEFAULT_BASE_URL.to_string()
        } else {
            base_url.trim().trim_end_matches('/').to_string()
        };
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl LyricsService for HttpLyricsService {
    fn translate_by_search(&self, query: SearchQuery) -> ServiceFuture {
        let client = self.client.clone();
        let url = self.url(SEARCH_PATH);
        Box::pin(async move {
            let body = SearchBody {
                artist: query.artist.trim(),
                title: query.title.trim(),
                source_language: &query.source_language,
                target_language: &query.target_language,
            };
            post_translation(
                &client,
                &url,
                &body,
                RequestKind::Search,
                &query.source_language,
                &query.target_language,
            )
            .await
        })
    }

    fn translate_by_text(&self, query: TextQuery) -> ServiceFuture {
        let client = self.client.clone();
        let url = self.url(TEXT_PATH);
        Box::pin(async move {
            let body = TextBody {
                text: &query.text,
                spanish_text: &query.text,
                source_language: &query.source_language,
                target_language: &query.target_language,
            };
            post_translation(
                &client,
                &url,
                &body,
                RequestKind::Text,
                &query.source_language,
                &query.target_language,
            )
            .await
        })
    }
}

async fn post_translation<B: Serialize>(
    client: &reqwest::Client,
    url: &str,
    body: &B,
    kind: RequestKind,
    source_language: &str,
    target_language: &str,
) -> Result<TranslationPayload, LyricsError> {
    debug!(url, ?kind, "sending translation request");
    let response = client
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(|err| LyricsError::collaborator(kind, err.to_string()))?;

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|err| LyricsError::collaborator(kind, err.to_string()))?;

    if !status.is_success() {
        let message = extract_error_message(&text).unwrap_or_else(|| generic_message(kind).to_string());
        warn!(url, %status, "lyrics backend returned an error: {}", message);
        return Err(LyricsError::collaborator(kind, message));
    }

    let wire: WireResponse = serde_json::from_str(&text).map_err(|err| {
        LyricsError::collaborator(kind, format!("malformed response from lyrics backend: {}", err))
    })?;
    wire.into_payload(kind, source_language, target_language)
}

fn extract_error_message(text: &str) -> Option<String> {
    serde_json::from_str::<WireError>(text)
        .ok()
        .and_then(WireError::message)
}

fn generic_message(kind: RequestKind) -> &'static str {
    match kind {
        RequestKind::Search => "Failed to fetch song",
        RequestKind::Text => "Translation failed",
    }
}
