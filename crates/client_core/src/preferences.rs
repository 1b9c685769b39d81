//! Persisted layout preferences (panel and section visibility).

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::warn;

const PREFERENCES_FILE_NAME: &str = "preferences.json";
const APP_DIR_NAME: &str = "fred_explorer";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceKey {
    NavigatorOpen,
    SummaryExpanded,
    ChartExpanded,
}

impl PreferenceKey {
    pub const ALL: [PreferenceKey; 3] = [
        PreferenceKey::NavigatorOpen,
        PreferenceKey::SummaryExpanded,
        PreferenceKey::ChartExpanded,
    ];

    pub fn default_value(self) -> bool {
        match self {
            PreferenceKey::NavigatorOpen => true,
            PreferenceKey::SummaryExpanded => true,
            PreferenceKey::ChartExpanded => true,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PreferenceKey::NavigatorOpen => "navigator_open",
            PreferenceKey::SummaryExpanded => "summary_expanded",
            PreferenceKey::ChartExpanded => "chart_expanded",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|key| key.as_str() == raw)
    }
}

pub trait PreferenceStore {
    fn get(&self, key: PreferenceKey) -> bool;
    fn set(&mut self, key: PreferenceKey, value: bool) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryPreferences {
    values: BTreeMap<PreferenceKey, bool>,
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: PreferenceKey) -> bool {
        self.values
            .get(&key)
            .copied()
            .unwrap_or_else(|| key.default_value())
    }

    fn set(&mut self, key: PreferenceKey, value: bool) -> anyhow::Result<()> {
        self.values.insert(key, value);
        Ok(())
    }
}

/// JSON-file backed store; every `set` rewrites the file.
#[derive(Debug, Clone)]
pub struct JsonFilePreferences {
    path: PathBuf,
    values: BTreeMap<PreferenceKey, bool>,
}

pub fn default_preferences_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(PREFERENCES_FILE_NAME))
}

impl JsonFilePreferences {
    /// Opens `path`, falling back to defaults when the file is missing or
    /// unreadable.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!(path = %path.display(), %err, "preferences: ignoring corrupt file");
                BTreeMap::new()
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                warn!(path = %path.display(), %err, "preferences: unreadable file, using defaults");
                BTreeMap::new()
            }
        };
        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!(
                    "failed to create preferences directory '{}'",
                    parent.display()
                )
            })?;
        }
        let raw = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, raw).with_context(|| {
            format!("failed to write preferences '{}'", self.path.display())
        })
    }
}

impl PreferenceStore for JsonFilePreferences {
    fn get(&self, key: PreferenceKey) -> bool {
        self.values
            .get(&key)
            .copied()
            .unwrap_or_else(|| key.default_value())
    }

    fn set(&mut self, key: PreferenceKey, value: bool) -> anyhow::Result<()> {
        self.values.insert(key, value);
        self.save()
    }
}
