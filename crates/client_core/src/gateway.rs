use anyhow::{anyhow, Context};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Category, CategorySeriesPage, SeriesData, SeriesId},
    error::ApiError,
    protocol::{
        CategoriesResponse, FetchSeriesRequest, GatewayHealth, SummarizeRequest, SummaryResponse,
    },
};
use tracing::{debug, warn};
use url::Url;

use crate::error::GatewayError;

/// Remote data gateway brokering the series provider and the summarizer.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn fetch_series(&self, series_id: &SeriesId) -> Result<SeriesData, GatewayError>;
    async fn summarize(&self, data: &SeriesData) -> Result<String, GatewayError>;
    async fn list_categories(&self) -> Result<Vec<Category>, GatewayError>;
    async fn category_series(
        &self,
        category_id: &str,
        term: Option<&str>,
    ) -> Result<CategorySeriesPage, GatewayError>;
    async fn health(&self) -> Result<GatewayHealth, GatewayError>;
}

/// Blank search terms mean "no filter" and are never sent.
pub fn normalize_term(term: Option<&str>) -> Option<&str> {
    term.map(str::trim).filter(|term| !term.is_empty())
}

pub struct HttpGateway {
    http: Client,
    base_url: Url,
}

impl HttpGateway {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url.trim())
            .with_context(|| format!("invalid gateway url '{base_url}'"))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("gateway url '{base_url}' cannot be used as a base"));
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
    let status = response.status();
    let body = response.bytes().await?;
    if !status.is_success() {
        let detail = serde_json::from_slice::<ApiError>(&body)
            .map(|err| err.message())
            .unwrap_or_else(|_| format!("Request failed with status {}", status.as_u16()));
        warn!(status = status.as_u16(), %detail, "gateway: request rejected");
        return Err(GatewayError::status(status.as_u16(), detail));
    }
    serde_json::from_slice(&body).map_err(|err| {
        warn!(%err, "gateway: response did not match the expected shape");
        GatewayError::MalformedResponse(err.to_string())
    })
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn fetch_series(&self, series_id: &SeriesId) -> Result<SeriesData, GatewayError> {
        debug!(series_id = %series_id, "gateway: fetch series");
        let response = self
            .http
            .post(self.endpoint(["api", "fred", "fetch"]))
            .json(&FetchSeriesRequest {
                series_id: series_id.clone(),
            })
            .send()
            .await?;
        decode(response).await
    }

    async fn summarize(&self, data: &SeriesData) -> Result<String, GatewayError> {
        debug!(series_id = %data.series_id, "gateway: summarize");
        let response = self
            .http
            .post(self.endpoint(["api", "summarize"]))
            .json(&SummarizeRequest { data })
            .send()
            .await?;
        let summary: SummaryResponse = decode(response).await?;
        Ok(summary.into_text())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, GatewayError> {
        let response = self
            .http
            .get(self.endpoint(["api", "categories"]))
            .send()
            .await?;
        let body: CategoriesResponse = decode(response).await?;
        Ok(body.categories)
    }

    async fn category_series(
        &self,
        category_id: &str,
        term: Option<&str>,
    ) -> Result<CategorySeriesPage, GatewayError> {
        let mut request = self
            .http
            .get(self.endpoint(["api", "categories", category_id]));
        if let Some(term) = normalize_term(term) {
            request = request.query(&[("q", term)]);
        }
        debug!(category_id, term = ?term, "gateway: category series");
        decode(request.send().await?).await
    }

    async fn health(&self) -> Result<GatewayHealth, GatewayError> {
        let response = self.http.get(self.endpoint(["health"])).send().await?;
        decode(response).await
    }
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
