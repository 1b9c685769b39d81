use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest series code the gateway accepts, in characters.
pub const MAX_SERIES_ID_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidSeriesId {
    #[error("series id must not be empty")]
    Empty,
    #[error("series id is {len} characters, at most {MAX_SERIES_ID_LEN} allowed")]
    TooLong { len: usize },
}

/// Series code as accepted by the gateway: trimmed and uppercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeriesId(String);

impl SeriesId {
    pub fn parse(raw: &str) -> Result<Self, InvalidSeriesId> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InvalidSeriesId::Empty);
        }
        let len = trimmed.chars().count();
        if len > MAX_SERIES_ID_LEN {
            return Err(InvalidSeriesId::TooLong { len });
        }
        Ok(Self(trimmed.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    /// `None` means the provider did not report a value for this date.
    #[serde(default)]
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesInfo {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seasonal_adjustment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesData {
    pub series_id: String,
    pub series_info: SeriesInfo,
    pub observations: Vec<Observation>,
    pub observation_count: usize,
}

impl SeriesData {
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub series_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesListItem {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seasonal_adjustment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySeriesPage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    pub category_name: String,
    pub total_count: usize,
    pub series: Vec<SeriesListItem>,
}

impl CategorySeriesPage {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
