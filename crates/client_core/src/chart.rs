//! Observation to plot-series transform.
//!
//! Absent observations stay absent: a `None` in [`ChartSeries::values`] is a
//! gap in the line, never a zero.

use shared::domain::{Observation, SeriesData};

pub const NOT_AVAILABLE: &str = "Not available";

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<Option<f64>>,
    pub units: Option<String>,
}

/// Returns `None` for a series without observations; callers show a
/// "no data" state instead of an empty chart.
pub fn to_chart_series(data: &SeriesData) -> Option<ChartSeries> {
    if data.observations.is_empty() {
        return None;
    }

    let mut observations: Vec<&Observation> = data.observations.iter().collect();
    observations.sort_by_key(|observation| observation.date);

    let labels = observations
        .iter()
        .map(|observation| observation.date.format("%Y-%m-%d").to_string())
        .collect();
    let values = observations
        .iter()
        .map(|observation| observation.value)
        .collect();

    Some(ChartSeries {
        labels,
        values,
        units: data.series_info.units.clone(),
    })
}

pub fn format_value(value: Option<f64>, units: Option<&str>) -> String {
    match (value, units.map(str::trim).filter(|units| !units.is_empty())) {
        (None, _) => NOT_AVAILABLE.to_string(),
        (Some(value), Some(units)) => format!("{value:.2} {units}"),
        (Some(value), None) => format!("{value:.2}"),
    }
}

impl ChartSeries {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (&str, Option<f64>)> + '_ {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    pub fn tooltip(&self, index: usize) -> Option<String> {
        let value = *self.values.get(index)?;
        Some(format_value(value, self.units.as_deref()))
    }

    /// Min and max over reported values; `None` when every value is absent.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.values.iter().flatten().fold(None, |range, &value| {
            Some(match range {
                None => (value, value),
                Some((min, max)) => (f64::min(min, value), f64::max(max, value)),
            })
        })
    }
}

#[cfg(test)]
#[path = "tests/chart_tests.rs"]
mod tests;
