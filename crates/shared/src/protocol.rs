use serde::{Deserialize, Serialize};

use crate::domain::{Category, SeriesData, SeriesId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchSeriesRequest {
    pub series_id: SeriesId,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummarizeRequest<'a> {
    pub data: &'a SeriesData,
}

/// The summarize endpoint answers either `{"summary": "..."}` or a bare string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SummaryResponse {
    Wrapped { summary: String },
    Bare(String),
}

impl SummaryResponse {
    pub fn into_text(self) -> String {
        match self {
            Self::Wrapped { summary } => summary,
            Self::Bare(summary) => summary,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoriesResponse {
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayHealth {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
}
