//! Client-side orchestration for browsing, fetching and summarizing economic
//! time series through the remote data gateway.

pub mod chart;
pub mod error;
pub mod gateway;
pub mod navigator;
pub mod orchestrator;
pub mod preferences;
pub mod selection;
pub mod shell;

pub use chart::{format_value, to_chart_series, ChartSeries};
pub use error::{GatewayError, NavigatorError, OrchestratorError};
pub use gateway::{Gateway, HttpGateway};
pub use navigator::{CategoryList, CategoryNavigator, DetailPage, NavigatorView};
pub use orchestrator::{Orchestrator, OrchestratorState, SubmitOutcome, SubmitPhase};
pub use preferences::{JsonFilePreferences, MemoryPreferences, PreferenceKey, PreferenceStore};
pub use selection::{selection_channel, SelectionPublisher, SelectionSubscriber, SeriesSelected};
pub use shell::{ChartView, DetailContent, DetailView, ShellOptions, ShellView, ViewShell};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
