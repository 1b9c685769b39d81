use std::{collections::HashMap, fs, path::PathBuf};

use anyhow::Context;
use url::Url;

pub const DEFAULT_GATEWAY_URL: &str = match option_env!("FRED_GATEWAY_URL") {
    Some(url) => url,
    None => "http://localhost:8000",
};
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 250;
const SETTINGS_FILE: &str = "explorer.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub gateway_url: String,
    pub search_debounce_ms: u64,
    pub preferences_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gateway_url: DEFAULT_GATEWAY_URL.into(),
            search_debounce_ms: DEFAULT_SEARCH_DEBOUNCE_MS,
            preferences_path: None,
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(SETTINGS_FILE) {
        apply_file(&mut settings, &raw);
    }
    apply_env(&mut settings, |key| std::env::var(key).ok());

    settings
}

fn apply_file(settings: &mut Settings, raw: &str) {
    let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) else {
        tracing::warn!(file = SETTINGS_FILE, "ignoring unparseable settings file");
        return;
    };
    if let Some(v) = file_cfg.get("gateway_url") {
        settings.gateway_url = v.clone();
    }
    if let Some(v) = file_cfg.get("search_debounce_ms") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.search_debounce_ms = parsed;
        }
    }
    if let Some(v) = file_cfg.get("preferences_path") {
        settings.preferences_path = Some(PathBuf::from(v));
    }
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("FRED_GATEWAY_URL") {
        settings.gateway_url = v;
    }
    if let Some(v) = lookup("APP__GATEWAY_URL") {
        settings.gateway_url = v;
    }

    if let Some(v) = lookup("APP__SEARCH_DEBOUNCE_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.search_debounce_ms = parsed;
        }
    }

    if let Some(v) = lookup("APP__PREFERENCES_PATH") {
        settings.preferences_path = Some(PathBuf::from(v));
    }
}

pub fn prepare_gateway_url(raw_gateway_url: &str) -> anyhow::Result<String> {
    let gateway_url = normalize_gateway_url(raw_gateway_url);
    let parsed = Url::parse(&gateway_url)
        .with_context(|| format!("invalid gateway url '{gateway_url}'"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("gateway url '{gateway_url}' must use http or https");
    }
    Ok(gateway_url)
}

fn normalize_gateway_url(raw_gateway_url: &str) -> String {
    let trimmed = raw_gateway_url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Settings::default().gateway_url;
    }
    trimmed.to_string()
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
