//! Category grid/detail browsing with per-category series search.
//!
//! Page fetches are split into an issue step that hands out a sequence-numbered
//! [`PageRequest`] and an [`CategoryNavigator::apply_page`] completion step.
//! Only the most recently issued request may update the page, so a slow
//! response to an older search cannot overwrite a newer one.

use std::sync::Arc;

use shared::domain::{Category, CategorySeriesPage};
use tracing::{debug, info, warn};

use crate::{
    error::{GatewayError, NavigatorError},
    gateway::{normalize_term, Gateway},
    selection::SelectionPublisher,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigatorView {
    Grid,
    Detail,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryList {
    #[default]
    NotLoaded,
    Loading,
    Loaded(Vec<Category>),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailPage {
    Loading,
    Loaded(CategorySeriesPage),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub seq: u64,
    pub category_id: String,
    pub term: Option<String>,
}

impl PageRequest {
    pub async fn execute(self, gateway: &dyn Gateway) -> PageResponse {
        let result = gateway
            .category_series(&self.category_id, self.term.as_deref())
            .await;
        PageResponse {
            seq: self.seq,
            result,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PageResponse {
    pub seq: u64,
    pub result: Result<CategorySeriesPage, GatewayError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageApply {
    Applied,
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct DetailState {
    category_id: String,
    display_name: String,
    term: String,
    page: DetailPage,
}

pub struct CategoryNavigator {
    gateway: Arc<dyn Gateway>,
    selections: SelectionPublisher,
    categories: CategoryList,
    detail: Option<DetailState>,
    issued_seq: u64,
    awaiting: Option<u64>,
}

impl CategoryNavigator {
    pub fn new(gateway: Arc<dyn Gateway>, selections: SelectionPublisher) -> Self {
        Self {
            gateway,
            selections,
            categories: CategoryList::NotLoaded,
            detail: None,
            issued_seq: 0,
            awaiting: None,
        }
    }

    pub fn view(&self) -> NavigatorView {
        if self.detail.is_some() {
            NavigatorView::Detail
        } else {
            NavigatorView::Grid
        }
    }

    pub fn categories(&self) -> &CategoryList {
        &self.categories
    }

    pub fn active_category(&self) -> Option<&str> {
        self.detail.as_ref().map(|detail| detail.category_id.as_str())
    }

    pub fn display_name(&self) -> Option<&str> {
        self.detail.as_ref().map(|detail| detail.display_name.as_str())
    }

    pub fn search_term(&self) -> &str {
        self.detail
            .as_ref()
            .map(|detail| detail.term.as_str())
            .unwrap_or_default()
    }

    pub fn detail_page(&self) -> Option<&DetailPage> {
        self.detail.as_ref().map(|detail| &detail.page)
    }

    pub fn is_awaiting_page(&self) -> bool {
        self.awaiting.is_some()
    }

    /// Sequence number of the only page response that will still be applied.
    pub fn awaiting_seq(&self) -> Option<u64> {
        self.awaiting
    }

    /// Loads the category cards. Runs once per activation; later calls keep
    /// whatever the first one produced, including a failure.
    pub async fn list_categories(&mut self) -> Result<(), NavigatorError> {
        if self.categories != CategoryList::NotLoaded {
            debug!("navigator: categories already requested for this activation");
            return Ok(());
        }

        self.categories = CategoryList::Loading;
        match self.gateway.list_categories().await {
            Ok(categories) => {
                info!(count = categories.len(), "navigator: categories loaded");
                self.categories = CategoryList::Loaded(categories);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "navigator: category list failed");
                let err = NavigatorError::CategoryList(err);
                self.categories = CategoryList::Failed(err.user_message());
                Err(err)
            }
        }
    }

    fn next_request(&mut self, category_id: String, term: Option<String>) -> PageRequest {
        self.issued_seq += 1;
        self.awaiting = Some(self.issued_seq);
        PageRequest {
            seq: self.issued_seq,
            category_id,
            term,
        }
    }

    /// Enters the detail view for `category_id` with no search filter.
    pub fn begin_select(&mut self, category_id: &str) -> PageRequest {
        let display_name = match &self.categories {
            CategoryList::Loaded(categories) => categories
                .iter()
                .find(|category| category.id == category_id)
                .map(|category| category.name.clone()),
            _ => None,
        }
        .unwrap_or_else(|| category_id.to_string());

        info!(category_id, "navigator: entering detail");
        self.detail = Some(DetailState {
            category_id: category_id.to_string(),
            display_name,
            term: String::new(),
            page: DetailPage::Loading,
        });
        self.next_request(category_id.to_string(), None)
    }

    /// Updates the search term. Ignored outside the detail view.
    pub fn begin_search(&mut self, term: &str) -> Option<PageRequest> {
        let Some(detail) = self.detail.as_mut() else {
            debug!(term, "navigator: search ignored in grid view");
            return None;
        };
        detail.term = term.to_string();
        detail.page = DetailPage::Loading;
        let category_id = detail.category_id.clone();
        let filter = normalize_term(Some(term)).map(str::to_string);
        Some(self.next_request(category_id, filter))
    }

    pub fn apply_page(&mut self, response: PageResponse) -> PageApply {
        if self.awaiting != Some(response.seq) {
            debug!(
                seq = response.seq,
                latest = self.issued_seq,
                "navigator: discarded stale page response"
            );
            return PageApply::Stale;
        }
        let Some(detail) = self.detail.as_mut() else {
            return PageApply::Stale;
        };
        self.awaiting = None;
        detail.page = match response.result {
            Ok(page) => {
                debug!(
                    category_id = %detail.category_id,
                    total = page.total_count,
                    "navigator: page loaded"
                );
                DetailPage::Loaded(page)
            }
            Err(err) => {
                warn!(category_id = %detail.category_id, error = %err, "navigator: page failed");
                DetailPage::Failed(NavigatorError::CategoryDetail(err).user_message())
            }
        };
        PageApply::Applied
    }

    pub async fn select_category(&mut self, category_id: &str) -> Result<(), NavigatorError> {
        let request = self.begin_select(category_id);
        self.run(request).await
    }

    pub async fn search(&mut self, term: &str) -> Result<(), NavigatorError> {
        match self.begin_search(term) {
            Some(request) => self.run(request).await,
            None => Ok(()),
        }
    }

    async fn run(&mut self, request: PageRequest) -> Result<(), NavigatorError> {
        let response = request.execute(self.gateway.as_ref()).await;
        let failure = response.result.clone().err();
        match (self.apply_page(response), failure) {
            (PageApply::Applied, Some(err)) => Err(NavigatorError::CategoryDetail(err)),
            _ => Ok(()),
        }
    }

    /// Returns to the grid. Returns `false` (and does nothing) when already there.
    pub fn back(&mut self) -> bool {
        if self.detail.take().is_none() {
            return false;
        }
        self.awaiting = None;
        info!("navigator: back to grid");
        true
    }

    /// Reinitializes to the grid with no category or search term. A loaded
    /// category list survives; a failed one is cleared so the next
    /// activation retries.
    pub fn reset(&mut self) {
        self.detail = None;
        self.awaiting = None;
        if matches!(self.categories, CategoryList::Failed(_)) {
            self.categories = CategoryList::NotLoaded;
        }
        debug!("navigator: reset");
    }

    pub fn select_series(&self, series_id: &str) {
        info!(series_id, "navigator: series selected");
        self.selections.publish(series_id);
    }
}

#[cfg(test)]
#[path = "tests/navigator_tests.rs"]
mod tests;
