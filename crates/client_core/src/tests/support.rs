//! Scripted in-memory gateway and fixture builders shared by the unit tests.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use shared::{
    domain::{
        Category, CategorySeriesPage, Observation, SeriesData, SeriesId, SeriesInfo,
        SeriesListItem,
    },
    protocol::GatewayHealth,
};
use tokio::sync::oneshot;

use crate::{
    error::GatewayError,
    gateway::{normalize_term, Gateway},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    FetchSeries(String),
    Summarize(String),
    ListCategories,
    CategorySeries {
        category_id: String,
        term: Option<String>,
    },
    Health,
}

type PageKey = (String, Option<String>);

#[derive(Default)]
pub struct FakeGateway {
    calls: Mutex<Vec<GatewayCall>>,
    series: Mutex<HashMap<String, Result<SeriesData, GatewayError>>>,
    summary: Mutex<Option<Result<String, GatewayError>>>,
    categories: Mutex<Option<Result<Vec<Category>, GatewayError>>>,
    pages: Mutex<HashMap<PageKey, Result<CategorySeriesPage, GatewayError>>>,
    page_delays: Mutex<HashMap<Option<String>, Duration>>,
    fetch_gate: Mutex<Option<oneshot::Receiver<()>>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn with_series(self, data: SeriesData) -> Self {
        self.series
            .lock()
            .expect("lock")
            .insert(data.series_id.to_uppercase(), Ok(data));
        self
    }

    pub fn with_fetch_error(self, series_id: &str, err: GatewayError) -> Self {
        self.series
            .lock()
            .expect("lock")
            .insert(series_id.to_uppercase(), Err(err));
        self
    }

    pub fn with_summary(self, result: Result<String, GatewayError>) -> Self {
        *self.summary.lock().expect("lock") = Some(result);
        self
    }

    pub fn with_categories(self, result: Result<Vec<Category>, GatewayError>) -> Self {
        *self.categories.lock().expect("lock") = Some(result);
        self
    }

    pub fn with_page(
        self,
        category_id: &str,
        term: Option<&str>,
        result: Result<CategorySeriesPage, GatewayError>,
    ) -> Self {
        let key = (
            category_id.to_string(),
            normalize_term(term).map(str::to_string),
        );
        self.pages.lock().expect("lock").insert(key, result);
        self
    }

    pub fn with_page_delay(self, term: Option<&str>, delay: Duration) -> Self {
        self.page_delays
            .lock()
            .expect("lock")
            .insert(normalize_term(term).map(str::to_string), delay);
        self
    }

    /// Holds the next `fetch_series` call until the returned sender fires.
    pub fn gate_next_fetch(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.fetch_gate.lock().expect("lock") = Some(rx);
        tx
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().expect("lock").clone()
    }

    pub fn page_calls(&self) -> Vec<PageKey> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::CategorySeries { category_id, term } => Some((category_id, term)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: GatewayCall) {
        self.calls.lock().expect("lock").push(call);
    }
}

#[async_trait]
impl Gateway for FakeGateway {
    async fn fetch_series(&self, series_id: &SeriesId) -> Result<SeriesData, GatewayError> {
        self.record(GatewayCall::FetchSeries(series_id.to_string()));
        let gate = self.fetch_gate.lock().expect("lock").take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.series
            .lock()
            .expect("lock")
            .get(series_id.as_str())
            .cloned()
            .unwrap_or_else(|| {
                Err(GatewayError::status(
                    404,
                    format!("Series ID '{series_id}' not found"),
                ))
            })
    }

    async fn summarize(&self, data: &SeriesData) -> Result<String, GatewayError> {
        self.record(GatewayCall::Summarize(data.series_id.clone()));
        self.summary
            .lock()
            .expect("lock")
            .clone()
            .unwrap_or_else(|| Ok(format!("Summary of {}", data.series_id)))
    }

    async fn list_categories(&self) -> Result<Vec<Category>, GatewayError> {
        self.record(GatewayCall::ListCategories);
        self.categories
            .lock()
            .expect("lock")
            .clone()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn category_series(
        &self,
        category_id: &str,
        term: Option<&str>,
    ) -> Result<CategorySeriesPage, GatewayError> {
        let term = normalize_term(term).map(str::to_string);
        self.record(GatewayCall::CategorySeries {
            category_id: category_id.to_string(),
            term: term.clone(),
        });
        let delay = self.page_delays.lock().expect("lock").get(&term).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.pages
            .lock()
            .expect("lock")
            .get(&(category_id.to_string(), term))
            .cloned()
            .unwrap_or_else(|| {
                Err(GatewayError::status(
                    404,
                    format!("Category '{category_id}' not found"),
                ))
            })
    }

    async fn health(&self) -> Result<GatewayHealth, GatewayError> {
        self.record(GatewayCall::Health);
        Ok(GatewayHealth {
            status: "healthy".to_string(),
            service: None,
        })
    }
}

pub fn observation(date: &str, value: Option<f64>) -> Observation {
    Observation {
        date: date.parse().expect("date"),
        value,
    }
}

pub fn series_data(series_id: &str, units: Option<&str>, observations: Vec<Observation>) -> SeriesData {
    SeriesData {
        series_id: series_id.to_string(),
        series_info: SeriesInfo {
            id: series_id.to_string(),
            title: format!("{series_id} title"),
            units: units.map(str::to_string),
            frequency: None,
            seasonal_adjustment: None,
        },
        observation_count: observations.len(),
        observations,
    }
}

pub fn category(id: &str, name: &str, series_count: usize) -> Category {
    Category {
        id: id.to_string(),
        name: name.to_string(),
        icon: String::new(),
        description: None,
        series_count,
    }
}

pub fn page(category_name: &str, series_ids: &[&str]) -> CategorySeriesPage {
    CategorySeriesPage {
        category_id: None,
        category_name: category_name.to_string(),
        total_count: series_ids.len(),
        series: series_ids
            .iter()
            .map(|id| SeriesListItem {
                id: id.to_string(),
                title: id.to_string(),
                units: None,
                frequency: None,
                seasonal_adjustment: None,
            })
            .collect(),
    }
}
