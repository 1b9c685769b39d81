//! Two-stage fetch-then-summarize pipeline for the single active series.

use std::sync::Arc;

use shared::domain::{SeriesData, SeriesId};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::{
    error::OrchestratorError,
    gateway::Gateway,
    selection::SelectionSubscriber,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitPhase {
    #[default]
    Idle,
    Loading,
    Succeeded,
    PartiallySucceeded,
    Failed,
}

#[derive(Debug, Clone, Default)]
pub struct OrchestratorState {
    pub pending_input: String,
    pub phase: SubmitPhase,
    pub loading: bool,
    pub error: Option<String>,
    pub series: Option<Arc<SeriesData>>,
    pub summary: Option<String>,
}

/// How a submission that produced series data ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Complete,
    /// The chart is available but the summary stage failed.
    SummaryFailed(OrchestratorError),
}

impl SubmitOutcome {
    pub fn summary_error(&self) -> Option<&OrchestratorError> {
        match self {
            Self::Complete => None,
            Self::SummaryFailed(err) => Some(err),
        }
    }
}

/// Clears `loading` if a submission is abandoned before it settles.
struct LoadingGuard<'a> {
    state: &'a watch::Sender<OrchestratorState>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state.send_if_modified(|state| {
            if !state.loading {
                return false;
            }
            state.loading = false;
            state.phase = SubmitPhase::Failed;
            true
        });
    }
}

pub struct Orchestrator {
    gateway: Arc<dyn Gateway>,
    state: watch::Sender<OrchestratorState>,
    selections: Option<SelectionSubscriber>,
}

impl Orchestrator {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        let (state, _) = watch::channel(OrchestratorState::default());
        Self {
            gateway,
            state,
            selections: None,
        }
    }

    pub fn with_selections(gateway: Arc<dyn Gateway>, selections: SelectionSubscriber) -> Self {
        let mut orchestrator = Self::new(gateway);
        orchestrator.selections = Some(selections);
        orchestrator
    }

    pub fn state(&self) -> OrchestratorState {
        self.state.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<OrchestratorState> {
        self.state.subscribe()
    }

    pub fn can_submit(&self) -> bool {
        !self.state.borrow().loading
    }

    pub fn set_pending_input(&mut self, input: impl Into<String>) {
        let input = input.into();
        self.state.send_modify(|state| state.pending_input = input);
    }

    /// Copies a picked series into the pending input. Never submits.
    pub fn on_series_selected(&mut self, series_id: &str) {
        info!(series_id, "orchestrator: pending input set from selection");
        self.set_pending_input(series_id);
    }

    /// Applies queued selection events; the newest pick wins.
    pub fn apply_selections(&mut self) -> Option<String> {
        let latest = self.selections.as_mut()?.drain().pop()?;
        self.on_series_selected(&latest.series_id);
        Some(latest.series_id)
    }

    pub async fn submit_pending(&mut self) -> Result<SubmitOutcome, OrchestratorError> {
        let input = self.state.borrow().pending_input.clone();
        self.submit(&input).await
    }

    pub async fn submit(&mut self, raw_id: &str) -> Result<SubmitOutcome, OrchestratorError> {
        let series_id = match SeriesId::parse(raw_id) {
            Ok(series_id) => series_id,
            Err(err) => {
                let err = OrchestratorError::from(err);
                self.state
                    .send_modify(|state| state.error = Some(err.user_message()));
                return Err(err);
            }
        };

        self.state.send_modify(|state| {
            state.phase = SubmitPhase::Loading;
            state.loading = true;
            state.error = None;
            state.series = None;
            state.summary = None;
        });
        let _guard = LoadingGuard { state: &self.state };
        info!(series_id = %series_id, "orchestrator: submission started");

        let data = match self.gateway.fetch_series(&series_id).await {
            Ok(data) => Arc::new(data),
            Err(err) => {
                warn!(series_id = %series_id, error = %err, "orchestrator: fetch failed");
                let err = OrchestratorError::Fetch(err);
                self.state.send_modify(|state| {
                    state.phase = SubmitPhase::Failed;
                    state.loading = false;
                    state.error = Some(err.user_message());
                });
                return Err(err);
            }
        };

        info!(
            series_id = %series_id,
            observations = data.observation_count,
            "orchestrator: series fetched"
        );
        self.state
            .send_modify(|state| state.series = Some(Arc::clone(&data)));

        match self.gateway.summarize(&data).await {
            Ok(summary) => {
                self.state.send_modify(|state| {
                    state.phase = SubmitPhase::Succeeded;
                    state.loading = false;
                    state.summary = Some(summary);
                });
                info!(series_id = %series_id, "orchestrator: summary ready");
                Ok(SubmitOutcome::Complete)
            }
            Err(err) => {
                warn!(series_id = %series_id, error = %err, "orchestrator: summarize failed");
                let err = OrchestratorError::Summarize(err);
                self.state.send_modify(|state| {
                    state.phase = SubmitPhase::PartiallySucceeded;
                    state.loading = false;
                    state.error = Some(err.user_message());
                });
                Ok(SubmitOutcome::SummaryFailed(err))
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/orchestrator_tests.rs"]
mod tests;
