use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error body returned by the gateway on non-2xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub detail: Value,
}

impl ApiError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: Value::String(detail.into()),
        }
    }

    /// Plain detail strings are returned as-is; structured details (such as
    /// validation error lists) are rendered as compact JSON.
    pub fn message(&self) -> String {
        match &self.detail {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}
