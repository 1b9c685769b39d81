//! Composition of orchestrator, navigator, selection bridge and preferences.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use shared::domain::{CategorySeriesPage, SeriesData};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, warn};

use crate::{
    chart::{to_chart_series, ChartSeries},
    error::{NavigatorError, OrchestratorError},
    gateway::Gateway,
    navigator::{
        CategoryList, CategoryNavigator, DetailPage, NavigatorView, PageApply, PageRequest,
        PageResponse,
    },
    orchestrator::{Orchestrator, SubmitOutcome},
    preferences::{PreferenceKey, PreferenceStore},
    selection::selection_channel,
};

pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(250);
pub const NO_DATA_MESSAGE: &str = "No data available for this series";
pub const NO_SERIES_FOUND_MESSAGE: &str = "No series found";

#[derive(Debug, Clone, Copy)]
pub struct ShellOptions {
    pub search_debounce: Duration,
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self {
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartView {
    NoData,
    Series(ChartSeries),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailContent {
    Loading,
    Empty,
    Page(CategorySeriesPage),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    pub category_id: String,
    pub display_name: String,
    pub search_term: String,
    pub content: DetailContent,
}

/// Read-only snapshot of everything a front end renders.
#[derive(Debug, Clone)]
pub struct ShellView {
    pub input: String,
    pub loading: bool,
    pub can_submit: bool,
    pub error: Option<String>,
    pub series: Option<Arc<SeriesData>>,
    pub chart: Option<ChartView>,
    pub summary: Option<String>,
    pub navigator: NavigatorView,
    pub categories: CategoryList,
    pub detail: Option<DetailView>,
    pub navigator_open: bool,
    pub summary_expanded: bool,
    pub chart_expanded: bool,
}

pub struct ViewShell<P: PreferenceStore> {
    gateway: Arc<dyn Gateway>,
    orchestrator: Orchestrator,
    navigator: CategoryNavigator,
    preferences: P,
    options: ShellOptions,
    pages_tx: mpsc::UnboundedSender<PageResponse>,
    pages_rx: mpsc::UnboundedReceiver<PageResponse>,
    latest_page_seq: Arc<AtomicU64>,
    page_tasks: Vec<JoinHandle<()>>,
}

impl<P: PreferenceStore> ViewShell<P> {
    pub fn new(gateway: Arc<dyn Gateway>, preferences: P, options: ShellOptions) -> Self {
        let (publisher, subscriber) = selection_channel();
        let (pages_tx, pages_rx) = mpsc::unbounded_channel();
        Self {
            orchestrator: Orchestrator::with_selections(Arc::clone(&gateway), subscriber),
            navigator: CategoryNavigator::new(Arc::clone(&gateway), publisher),
            gateway,
            preferences,
            options,
            pages_tx,
            pages_rx,
            latest_page_seq: Arc::new(AtomicU64::new(0)),
            page_tasks: Vec::new(),
        }
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn navigator(&self) -> &CategoryNavigator {
        &self.navigator
    }

    pub fn preferences(&self) -> &P {
        &self.preferences
    }

    pub async fn activate(&mut self) -> Result<(), NavigatorError> {
        self.navigator.list_categories().await
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.orchestrator.set_pending_input(input);
    }

    /// Submits the pending input, after folding in any series picked since
    /// the last submission.
    pub async fn submit(&mut self) -> Result<SubmitOutcome, OrchestratorError> {
        self.orchestrator.apply_selections();
        self.submit_pending().await
    }

    /// Submits `series_id` as typed. Picks still queued on the bridge are
    /// applied first so they cannot replace it.
    pub async fn submit_series(
        &mut self,
        series_id: &str,
    ) -> Result<SubmitOutcome, OrchestratorError> {
        self.orchestrator.apply_selections();
        self.set_input(series_id);
        self.submit_pending().await
    }

    /// Any submission that produced series data (complete or summary-less)
    /// sends the navigator back to a clean grid.
    async fn submit_pending(&mut self) -> Result<SubmitOutcome, OrchestratorError> {
        let outcome = self.orchestrator.submit_pending().await?;
        self.reset_navigator();
        Ok(outcome)
    }

    pub fn reset_navigator(&mut self) {
        self.navigator.reset();
        self.sync_latest_page_seq();
        self.abort_page_tasks();
    }

    /// Opens `category_id` and waits for its first page. The fetch runs on a
    /// spawned task, so dropping this future leaves the page to a later
    /// [`ViewShell::settle`] or [`ViewShell::poll_pages`].
    pub async fn select_category(&mut self, category_id: &str) -> Result<(), NavigatorError> {
        let request = self.navigator.begin_select(category_id);
        self.sync_latest_page_seq();
        self.abort_page_tasks();
        self.spawn_page(request, Duration::ZERO);
        self.settle().await
    }

    pub fn back(&mut self) -> bool {
        let changed = self.navigator.back();
        if changed {
            self.sync_latest_page_seq();
            self.abort_page_tasks();
        }
        changed
    }

    /// Schedules a search after the settling delay. Must be called inside a
    /// tokio runtime.
    pub fn search(&mut self, term: &str) {
        let Some(request) = self.navigator.begin_search(term) else {
            return;
        };
        self.sync_latest_page_seq();
        self.spawn_page(request, self.options.search_debounce);
    }

    /// Runs `request` on its own task after `delay`, unless a newer request
    /// was issued in the meantime. The response arrives on `pages_rx`.
    fn spawn_page(&mut self, request: PageRequest, delay: Duration) {
        self.page_tasks.retain(|task| !task.is_finished());

        let gateway = Arc::clone(&self.gateway);
        let latest = Arc::clone(&self.latest_page_seq);
        let pages_tx = self.pages_tx.clone();
        self.page_tasks.push(tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if latest.load(Ordering::SeqCst) != request.seq {
                debug!(seq = request.seq, "shell: page request superseded before dispatch");
                return;
            }
            let response = request.execute(gateway.as_ref()).await;
            // The shell owns the receiver; a failed send means it is gone.
            let _ = pages_tx.send(response);
        }));
    }

    /// Waits until the latest page request has been applied.
    pub async fn settle(&mut self) -> Result<(), NavigatorError> {
        while self.navigator.is_awaiting_page() {
            let Some(response) = self.pages_rx.recv().await else {
                break;
            };
            self.apply(response)?;
        }
        Ok(())
    }

    /// Applies page responses that already arrived without waiting.
    pub fn poll_pages(&mut self) -> Vec<PageApply> {
        let mut applied = Vec::new();
        while let Ok(response) = self.pages_rx.try_recv() {
            let failure = response.result.clone().err();
            let outcome = self.navigator.apply_page(response);
            if let (PageApply::Applied, Some(err)) = (outcome, failure) {
                warn!(error = %err, "shell: search failed");
            }
            applied.push(outcome);
        }
        applied
    }

    /// Routes a picked series through the bridge into the pending input.
    pub fn select_series(&mut self, series_id: &str) {
        self.navigator.select_series(series_id);
        self.orchestrator.apply_selections();
    }

    pub fn toggle(&mut self, key: PreferenceKey) -> anyhow::Result<bool> {
        let value = !self.preferences.get(key);
        self.preferences.set(key, value)?;
        Ok(value)
    }

    pub fn view(&self) -> ShellView {
        let state = self.orchestrator.state();
        let chart = state.series.as_ref().map(|series| {
            to_chart_series(series).map_or(ChartView::NoData, ChartView::Series)
        });
        let detail = self.navigator.active_category().map(|category_id| DetailView {
            category_id: category_id.to_string(),
            display_name: self.navigator.display_name().unwrap_or(category_id).to_string(),
            search_term: self.navigator.search_term().to_string(),
            content: match self.navigator.detail_page() {
                Some(DetailPage::Loaded(page)) if page.is_empty() => DetailContent::Empty,
                Some(DetailPage::Loaded(page)) => DetailContent::Page(page.clone()),
                Some(DetailPage::Failed(message)) => DetailContent::Failed(message.clone()),
                Some(DetailPage::Loading) | None => DetailContent::Loading,
            },
        });

        ShellView {
            input: state.pending_input,
            loading: state.loading,
            can_submit: !state.loading,
            error: state.error,
            chart,
            series: state.series,
            summary: state.summary,
            navigator: self.navigator.view(),
            categories: self.navigator.categories().clone(),
            detail,
            navigator_open: self.preferences.get(PreferenceKey::NavigatorOpen),
            summary_expanded: self.preferences.get(PreferenceKey::SummaryExpanded),
            chart_expanded: self.preferences.get(PreferenceKey::ChartExpanded),
        }
    }

    fn apply(&mut self, response: PageResponse) -> Result<(), NavigatorError> {
        let failure = response.result.clone().err();
        match (self.navigator.apply_page(response), failure) {
            (PageApply::Applied, Some(err)) => Err(NavigatorError::CategoryDetail(err)),
            _ => Ok(()),
        }
    }

    fn sync_latest_page_seq(&self) {
        let seq = self.navigator.awaiting_seq().unwrap_or(0);
        self.latest_page_seq.store(seq, Ordering::SeqCst);
    }

    /// Cancels outstanding page tasks; their pages could no longer be applied.
    fn abort_page_tasks(&mut self) {
        for task in self.page_tasks.drain(..) {
            task.abort();
        }
    }
}

impl<P: PreferenceStore> Drop for ViewShell<P> {
    fn drop(&mut self) {
        self.abort_page_tasks();
    }
}

#[cfg(test)]
#[path = "tests/shell_tests.rs"]
mod tests;
