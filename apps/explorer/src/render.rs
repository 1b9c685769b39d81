//! Plain-text rendering of a [`ShellView`] snapshot.

use std::fmt::{self, Write};

use client_core::{
    chart::{format_value, ChartSeries},
    shell::{NO_DATA_MESSAGE, NO_SERIES_FOUND_MESSAGE},
    CategoryList, ChartView, DetailContent, NavigatorView, ShellView,
};

/// Most recent observations listed under the chart summary line.
pub const CHART_ROWS: usize = 12;

pub fn render_view(view: &ShellView) -> String {
    let mut out = render_series(view);
    out.push('\n');
    out.push_str(&render_navigator(view));
    out
}

pub fn render_series(view: &ShellView) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_series(&mut out, view);
    out
}

pub fn render_navigator(view: &ShellView) -> String {
    let mut out = String::new();
    let _ = write_navigator(&mut out, view);
    out
}

fn write_series(out: &mut String, view: &ShellView) -> fmt::Result {
    if view.loading {
        writeln!(out, "Loading...")?;
    }
    if let Some(error) = &view.error {
        writeln!(out, "Error: {error}")?;
    }
    let Some(series) = &view.series else {
        if view.error.is_none() && !view.loading {
            writeln!(out, "No series loaded. Enter a series ID to begin.")?;
        }
        return Ok(());
    };

    let info = &series.series_info;
    writeln!(out, "{} ({})", info.title, info.id)?;
    let details: Vec<String> = [
        info.units.as_deref().map(|units| format!("Units: {units}")),
        info.frequency.as_deref().map(|freq| format!("Frequency: {freq}")),
        info.seasonal_adjustment
            .as_deref()
            .map(|sa| format!("Seasonal adjustment: {sa}")),
        Some(format!("Observations: {}", series.observation_count)),
    ]
    .into_iter()
    .flatten()
    .collect();
    writeln!(out, "  {}", details.join(" | "))?;

    if view.summary_expanded {
        if let Some(summary) = &view.summary {
            writeln!(out)?;
            writeln!(out, "Summary")?;
            for line in summary.lines() {
                writeln!(out, "  {line}")?;
            }
        }
    } else if view.summary.is_some() {
        writeln!(out, "Summary hidden (toggle summary_expanded)")?;
    }

    if !view.chart_expanded {
        return writeln!(out, "Chart hidden (toggle chart_expanded)");
    }
    writeln!(out)?;
    match &view.chart {
        Some(ChartView::Series(chart)) => write_chart(out, chart),
        Some(ChartView::NoData) | None => writeln!(out, "{NO_DATA_MESSAGE}"),
    }
}

fn write_chart(out: &mut String, chart: &ChartSeries) -> fmt::Result {
    let units = chart.units.as_deref();
    let (first, last) = match (chart.labels.first(), chart.labels.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return writeln!(out, "{NO_DATA_MESSAGE}"),
    };
    writeln!(out, "Chart: {} points, {first} to {last}", chart.len())?;
    if let Some((min, max)) = chart.value_range() {
        writeln!(
            out,
            "  range {} .. {}",
            format_value(Some(min), units),
            format_value(Some(max), units)
        )?;
    }

    let skipped = chart.len().saturating_sub(CHART_ROWS);
    if skipped > 0 {
        writeln!(out, "  ... {skipped} earlier observations")?;
    }
    for (label, value) in chart.points().skip(skipped) {
        writeln!(out, "  {label}  {}", format_value(value, units))?;
    }
    Ok(())
}

fn write_navigator(out: &mut String, view: &ShellView) -> fmt::Result {
    if !view.navigator_open {
        return writeln!(out, "Navigator hidden (toggle navigator_open)");
    }

    match (view.navigator, &view.detail) {
        (NavigatorView::Detail, Some(detail)) => {
            writeln!(out, "{} [{}]", detail.display_name, detail.category_id)?;
            if !detail.search_term.is_empty() {
                writeln!(out, "  search: {}", detail.search_term)?;
            }
            match &detail.content {
                DetailContent::Loading => writeln!(out, "  Loading series..."),
                DetailContent::Empty => writeln!(out, "  {NO_SERIES_FOUND_MESSAGE}"),
                DetailContent::Failed(message) => writeln!(out, "  Error: {message}"),
                DetailContent::Page(page) => {
                    writeln!(out, "  {} series", page.total_count)?;
                    for (index, item) in page.series.iter().enumerate() {
                        write!(out, "  {:>3}. {:<12} {}", index + 1, item.id, item.title)?;
                        match item.units.as_deref() {
                            Some(units) => writeln!(out, " [{units}]")?,
                            None => writeln!(out)?,
                        }
                    }
                    Ok(())
                }
            }
        }
        _ => match &view.categories {
            CategoryList::Loaded(categories) if categories.is_empty() => {
                writeln!(out, "No categories available")
            }
            CategoryList::Loaded(categories) => {
                writeln!(out, "Categories")?;
                for category in categories {
                    writeln!(
                        out,
                        "  {:<20} {} ({} series)",
                        category.id, category.name, category.series_count
                    )?;
                }
                Ok(())
            }
            CategoryList::Failed(message) => {
                writeln!(out, "Failed to load categories: {message}")
            }
            CategoryList::NotLoaded | CategoryList::Loading => {
                writeln!(out, "Loading categories...")
            }
        },
    }
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
