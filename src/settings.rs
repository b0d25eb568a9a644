use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::service::DEFAULT_BASE_URL;

const DEFAULT_SETTINGS_TOML: &str = include_str!("../settings.toml");
pub const API_URL_ENV: &str = "LYRICS_API_URL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub source_language: String,
    pub target_language: String,
    pub column_width: usize,
    pub annotate: bool,
    pub viewport_rows: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 10,
            source_language: "es".to_string(),
            target_language: "en".to_string(),
            column_width: 40,
            annotate: true,
            viewport_rows: 12,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    api: Option<ApiSettings>,
    languages: Option<LanguageSettings>,
    display: Option<DisplaySettings>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiSettings {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LanguageSettings {
    source: Option<String>,
    target: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DisplaySettings {
    column_width: Option<usize>,
    annotate: Option<bool>,
    viewport_rows: Option<usize>,
}

/// Loads defaults, then every settings file that exists, in order:
/// `./settings.toml`, `./settings.local.toml`, the same two under
/// `~/.lyrics-translator-rust`, and finally `extra_path`. The
/// `LYRICS_API_URL` environment variable wins over all files.
pub fn load_settings(extra_path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();
    ensure_home_settings_file()?;

    let mut ordered_paths = Vec::new();
    ordered_paths.push(PathBuf::from("settings.toml"));
    ordered_paths.push(PathBuf::from("settings.local.toml"));

    if let Some(home) = home_dir() {
        ordered_paths.push(home.join("settings.toml"));
        ordered_paths.push(home.join("settings.local.toml"));
    }

    if let Some(extra) = extra_path {
        if !extra.exists() {
            return Err(anyhow!("settings file not found: {}", extra.display()));
        }
        ordered_paths.push(extra.to_path_buf());
    }

    for path in ordered_paths {
        if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read settings: {}", path.display()))?;
            let parsed: SettingsFile = toml::from_str(&content)
                .with_context(|| format!("failed to parse settings: {}", path.display()))?;
            settings.merge(parsed);
        }
    }

    settings.apply_api_url_override(std::env::var(API_URL_ENV).ok());
    Ok(settings)
}

impl Settings {
    fn merge(&mut self, incoming: SettingsFile) {
        if let Some(api) = incoming.api {
            if let Some(url) = api.base_url
                && !url.trim().is_empty()
            {
                self.api_base_url = url.trim().to_string();
            }
            if let Some(secs) = api.timeout_secs
                && secs > 0
            {
                self.request_timeout_secs = secs;
            }
        }
        if let Some(languages) = incoming.languages {
            if let Some(source) = languages.source
                && !source.trim().is_empty()
            {
                self.source_language = source.trim().to_string();
            }
            if let Some(target) = languages.target
                && !target.trim().is_empty()
            {
                self.target_language = target.trim().to_string();
            }
        }
        if let Some(display) = incoming.display {
            if let Some(width) = display.column_width
                && width > 0
            {
                self.column_width = width;
            }
            if let Some(annotate) = display.annotate {
                self.annotate = annotate;
            }
            if let Some(rows) = display.viewport_rows
                && rows > 0
            {
                self.viewport_rows = rows;
            }
        }
    }

    fn apply_api_url_override(&mut self, value: Option<String>) {
        if let Some(url) = value
            && !url.trim().is_empty()
        {
            self.api_base_url = url.trim().to_string();
        }
    }
}

fn ensure_home_settings_file() -> Result<()> {
    let Some(home) = home_dir() else {
        return Ok(());
    };
    fs::create_dir_all(&home)
        .with_context(|| format!("failed to create settings directory: {}", home.display()))?;
    let path = home.join("settings.toml");
    if !path.exists() {
        fs::write(&path, DEFAULT_SETTINGS_TOML)
            .with_context(|| format!("failed to write settings: {}", path.display()))?;
    }
    Ok(())
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().and_then(|home| {
        let home = home.trim();
        if home.is_empty() {
            None
        } else {
            Some(Path::new(home).join(".lyrics-translator-rust"))
        }
    })
}
