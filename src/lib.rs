use anyhow::{Result, anyhow};
use std::path::Path;
use std::time::Duration;

pub mod alignment;
pub mod annotate;
pub mod error;
pub mod interactive;
pub mod logging;
pub mod render;
pub mod scroll;
pub mod service;
pub mod session;
pub mod settings;
pub mod text;
mod test_util;

pub use alignment::{LinePair, build_line_pairs};
pub use annotate::{AnnotatedToken, VocabularyItem, WordTranslationEntry, annotate_line};
pub use error::LyricsError;
pub use render::RenderOptions;
pub use scroll::{PaneSide, ScrollCoupling, ScrollPane, ScrollSynchronizer, SyncOutcome};
pub use service::{HttpLyricsService, LyricsService, TranslateRequest, TranslationPayload};
pub use session::{RequestKind, RequestState, Session, SessionDisplay};
pub use text::LyricsText;

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub artist: Option<String>,
    pub title: Option<String>,
    pub source_lang: Option<String>,
    pub lang: Option<String>,
    pub api_url: Option<String>,
    pub settings_path: Option<String>,
    pub json: bool,
    pub no_annotate: bool,
    pub width: Option<usize>,
}

/// Translates one song or one block of text and renders the result.
pub async fn run(config: Config, input: Option<String>) -> Result<String> {
    let settings = resolve_settings(&config)?;
    let request = build_request(&config, input, &settings);
    let service = build_service(&settings)?;
    let options = render_options(&config, &settings);
    translate_once(&service, request, &options, config.json).await
}

/// Loads settings and applies the command-line overrides on top.
pub fn resolve_settings(config: &Config) -> Result<settings::Settings> {
    let settings_path = config.settings_path.as_deref().map(Path::new);
    let mut settings = settings::load_settings(settings_path)?;
    if let Some(url) = non_blank(config.api_url.as_deref()) {
        settings.api_base_url = url.to_string();
    }
    if let Some(source) = non_blank(config.source_lang.as_deref()) {
        settings.source_language = source.to_string();
    }
    if let Some(target) = non_blank(config.lang.as_deref()) {
        settings.target_language = target.to_string();
    }
    if let Some(width) = config.width
        && width > 0
    {
        settings.column_width = width;
    }
    if config.no_annotate {
        settings.annotate = false;
    }
    Ok(settings)
}

pub fn build_service(settings: &settings::Settings) -> Result<HttpLyricsService> {
    HttpLyricsService::new(
        settings.api_base_url.clone(),
        Duration::from_secs(settings.request_timeout_secs),
    )
}

pub fn render_options(config: &Config, settings: &settings::Settings) -> RenderOptions {
    RenderOptions {
        column_width: config.width.unwrap_or(settings.column_width),
        annotate: settings.annotate && !config.no_annotate,
    }
}

/// A search when artist or title is given, otherwise a text translation of
/// `input`. Missing fields are left for request validation to report.
pub fn build_request(
    config: &Config,
    input: Option<String>,
    settings: &settings::Settings,
) -> TranslateRequest {
    let source = settings.source_language.clone();
    let target = settings.target_language.clone();
    if config.artist.is_some() || config.title.is_some() {
        TranslateRequest::search(
            config.artist.clone().unwrap_or_default(),
            config.title.clone().unwrap_or_default(),
            source,
            target,
        )
    } else {
        TranslateRequest::text(input.unwrap_or_default(), source, target)
    }
}

pub async fn translate_once<S: LyricsService>(
    service: &S,
    request: TranslateRequest,
    options: &RenderOptions,
    json: bool,
) -> Result<String> {
    let mut session = Session::new();
    let ticket = session.begin(&request)?;
    let result = service.translate(request).await;
    session.complete(ticket, result)?;

    if let Some(message) = session.error_message() {
        return Err(anyhow!("Error: {}", message));
    }
    let display = session
        .display()
        .ok_or_else(|| anyhow!("no translation result"))?;
    if json {
        render::render_json(display)
    } else {
        Ok(render::render_display(display, options))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
