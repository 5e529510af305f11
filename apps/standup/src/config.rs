use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use serde::Deserialize;
use shared::domain::RoundLimit;
use text_generation::{Locale, DEFAULT_GEMINI_MODEL};
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub database_url: String,
    pub spin_delay_ms: u64,
    pub default_round_limit: RoundLimit,
    pub locale: Locale,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: "sqlite://./data/standup.db".into(),
            spin_delay_ms: 4000,
            default_round_limit: RoundLimit::Unbounded,
            locale: Locale::PtBr,
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    database_url: Option<String>,
    spin_delay_ms: Option<u64>,
    round_limit: Option<String>,
    locale: Option<String>,
    gemini_api_key: Option<String>,
    gemini_model: Option<String>,
}

impl Settings {
    pub fn spin_delay(&self) -> Duration {
        Duration::from_millis(self.spin_delay_ms)
    }

    /// Applies a `standup.toml` body. Unreadable files and bad values are
    /// logged and skipped.
    pub fn apply_file(&mut self, raw: &str) {
        let file_cfg = match toml::from_str::<FileSettings>(raw) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!(error = %err, "ignoring malformed settings file");
                return;
            }
        };

        if let Some(v) = file_cfg.database_url {
            self.database_url = v;
        }
        if let Some(v) = file_cfg.spin_delay_ms {
            self.spin_delay_ms = v;
        }
        if let Some(v) = file_cfg.round_limit {
            self.set_round_limit(&v);
        }
        if let Some(v) = file_cfg.locale {
            self.set_locale(&v);
        }
        if let Some(v) = file_cfg.gemini_api_key {
            self.gemini_api_key = Some(v).filter(|k| !k.trim().is_empty());
        }
        if let Some(v) = file_cfg.gemini_model {
            self.gemini_model = v;
        }
    }

    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(v) = var("DATABASE_URL") {
            self.database_url = v;
        }
        if let Some(v) = var("STANDUP__DATABASE_URL") {
            self.database_url = v;
        }

        if let Some(v) = var("STANDUP__SPIN_DELAY_MS") {
            match v.trim().parse::<u64>() {
                Ok(parsed) => self.spin_delay_ms = parsed,
                Err(_) => warn!(value = %v, "ignoring invalid STANDUP__SPIN_DELAY_MS"),
            }
        }

        if let Some(v) = var("STANDUP__ROUND_LIMIT") {
            self.set_round_limit(&v);
        }
        if let Some(v) = var("STANDUP__LOCALE") {
            self.set_locale(&v);
        }

        if let Some(v) = var("API_KEY") {
            self.gemini_api_key = Some(v);
        }
        if let Some(v) = var("GEMINI_API_KEY") {
            self.gemini_api_key = Some(v);
        }
        if let Some(v) = var("STANDUP__GEMINI_MODEL") {
            self.gemini_model = v;
        }
        self.gemini_api_key = self.gemini_api_key.take().filter(|k| !k.trim().is_empty());
    }

    fn set_round_limit(&mut self, raw: &str) {
        match raw.parse::<RoundLimit>() {
            Ok(limit) => self.default_round_limit = limit,
            Err(err) => warn!(error = %err, "ignoring round limit setting"),
        }
    }

    fn set_locale(&mut self, raw: &str) {
        match raw.parse::<Locale>() {
            Ok(locale) => self.locale = locale,
            Err(err) => warn!(error = %err, "ignoring locale setting"),
        }
    }
}

/// Defaults, then the settings file if present, then the environment.
pub fn load_settings(path: &Path) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        settings.apply_file(&raw);
    }
    settings.apply_env(|key| std::env::var(key).ok());

    settings
}

pub fn prepare_database_url(raw_database_url: &str) -> anyhow::Result<String> {
    let database_url = normalize_database_url(raw_database_url);
    ensure_parent_dir_exists(&database_url)?;
    Ok(database_url)
}

fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite::memory:")
        || raw_database_url.starts_with("sqlite://")
        || raw_database_url.contains("://")
    {
        return raw_database_url.to_string();
    }

    if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        let path = path.replace('\\', "/");
        return format!("sqlite://{path}");
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}

fn ensure_parent_dir_exists(database_url: &str) -> anyhow::Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
