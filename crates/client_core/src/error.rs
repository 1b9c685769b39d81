//! Typed failures for the gateway client and the components built on it.

use shared::domain::{InvalidSeriesId, MAX_SERIES_ID_LEN};
use thiserror::Error;

pub const MALFORMED_RESPONSE_MESSAGE: &str = "Unexpected response from the data gateway";
pub const EMPTY_SERIES_ID_MESSAGE: &str = "Please enter a series ID";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("gateway returned {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("failed to reach gateway: {0}")]
    Transport(String),
    #[error("malformed gateway response: {0}")]
    MalformedResponse(String),
}

impl GatewayError {
    pub fn status(status: u16, detail: impl Into<String>) -> Self {
        Self::Status {
            status,
            detail: detail.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }

    /// Message suitable for inline display next to the control that failed.
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { detail, .. } => detail.clone(),
            Self::Transport(message) => format!("Could not reach the data gateway: {message}"),
            Self::MalformedResponse(_) => MALFORMED_RESPONSE_MESSAGE.to_string(),
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::MalformedResponse(value.to_string())
        } else {
            Self::Transport(value.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrchestratorError {
    #[error("invalid series id: {0}")]
    Input(#[from] InvalidSeriesId),
    #[error("series fetch failed: {0}")]
    Fetch(GatewayError),
    #[error("summary generation failed: {0}")]
    Summarize(GatewayError),
}

impl OrchestratorError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Input(InvalidSeriesId::Empty) => EMPTY_SERIES_ID_MESSAGE.to_string(),
            Self::Input(InvalidSeriesId::TooLong { .. }) => {
                format!("Series ID must be at most {MAX_SERIES_ID_LEN} characters")
            }
            Self::Fetch(err) | Self::Summarize(err) => err.user_message(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigatorError {
    #[error("category list failed: {0}")]
    CategoryList(GatewayError),
    #[error("category detail failed: {0}")]
    CategoryDetail(GatewayError),
}

impl NavigatorError {
    pub fn user_message(&self) -> String {
        match self {
            Self::CategoryList(err) | Self::CategoryDetail(err) => err.user_message(),
        }
    }
}
