mod config;
mod render;
mod session;

use std::{
    io::{self, Write},
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    preferences::default_preferences_path, DetailContent, Gateway, HttpGateway,
    JsonFilePreferences, OrchestratorError, PreferenceStore, ShellOptions, ShellView, ViewShell,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    config::{load_settings, prepare_gateway_url},
    render::{render_navigator, render_series, render_view},
    session::{parse_command, SessionCommand, HELP},
};

const FALLBACK_PREFERENCES_FILE: &str = "preferences.json";

#[derive(Parser, Debug)]
#[command(name = "explorer", about = "Browse, chart and summarize FRED economic series")]
struct Cli {
    /// Base URL of the data gateway.
    #[arg(long, global = true)]
    gateway_url: Option<String>,
    /// Where layout preferences are stored.
    #[arg(long, global = true)]
    preferences: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch a series, summarize it and print a text chart.
    Fetch { series_id: String },
    /// List the category grid.
    Categories,
    /// Open a category, optionally filter it and fetch one of its series.
    Browse {
        category: String,
        #[arg(long)]
        search: Option<String>,
        /// 1-based position of the series to fetch.
        #[arg(long)]
        pick: Option<usize>,
    },
    /// Line-oriented session over stdin.
    Interactive,
    /// Check that the gateway is up.
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings();
    if let Some(url) = cli.gateway_url {
        settings.gateway_url = url;
    }
    if let Some(path) = cli.preferences {
        settings.preferences_path = Some(path);
    }

    let gateway_url = prepare_gateway_url(&settings.gateway_url)?;
    let gateway: Arc<dyn Gateway> = Arc::new(HttpGateway::new(&gateway_url)?);
    let preferences_path = settings
        .preferences_path
        .or_else(default_preferences_path)
        .unwrap_or_else(|| PathBuf::from(FALLBACK_PREFERENCES_FILE));
    info!(%gateway_url, preferences = %preferences_path.display(), "explorer starting");

    let options = ShellOptions {
        search_debounce: Duration::from_millis(settings.search_debounce_ms),
    };
    let mut shell = ViewShell::new(
        Arc::clone(&gateway),
        JsonFilePreferences::open(preferences_path),
        options,
    );

    match cli.command {
        Command::Fetch { series_id } => fetch(&mut shell, &series_id).await,
        Command::Categories => {
            let listed = shell.activate().await;
            print!("{}", render_navigator(&shell.view()));
            listed.context("failed to load categories")
        }
        Command::Browse {
            category,
            search,
            pick,
        } => browse(&mut shell, &category, search.as_deref(), pick).await,
        Command::Interactive => interactive(&mut shell).await,
        Command::Health => {
            let health = gateway.health().await.context("gateway health check failed")?;
            match health.service {
                Some(service) => println!("{service}: {}", health.status),
                None => println!("{}", health.status),
            }
            Ok(())
        }
    }
}

async fn fetch<P: PreferenceStore>(shell: &mut ViewShell<P>, series_id: &str) -> Result<()> {
    let outcome = shell.submit_series(series_id).await;
    print!("{}", render_series(&shell.view()));
    submission_result(outcome)
}

fn submission_result<T>(outcome: Result<T, OrchestratorError>) -> Result<()> {
    match outcome {
        Ok(_) => Ok(()),
        Err(err) => Err(err).context("submission failed"),
    }
}

async fn browse<P: PreferenceStore>(
    shell: &mut ViewShell<P>,
    category: &str,
    search: Option<&str>,
    pick: Option<usize>,
) -> Result<()> {
    if let Err(err) = shell.activate().await {
        warn!(error = %err, "category names unavailable, using raw id");
    }
    shell
        .select_category(category)
        .await
        .with_context(|| format!("failed to open category '{category}'"))?;
    if let Some(term) = search {
        shell.search(term);
        shell.settle().await.context("search failed")?;
    }
    print!("{}", render_navigator(&shell.view()));

    let Some(position) = pick else {
        return Ok(());
    };
    let series_id = picked_series(&shell.view(), position)
        .with_context(|| format!("no series at position {position}"))?;
    shell.select_series(&series_id);
    let outcome = shell.submit().await;
    println!();
    print!("{}", render_series(&shell.view()));
    submission_result(outcome)
}

/// Series id listed at 1-based `position` in the open category.
fn picked_series(view: &ShellView, position: usize) -> Option<String> {
    let DetailContent::Page(page) = &view.detail.as_ref()?.content else {
        return None;
    };
    page.series
        .get(position.checked_sub(1)?)
        .map(|item| item.id.clone())
}

/// Loads the category grid if this activation has not tried yet. A failure
/// is kept in the view and rendered with the grid.
async fn refresh_categories<P: PreferenceStore>(shell: &mut ViewShell<P>) {
    if let Err(err) = shell.activate().await {
        debug!(error = %err, "category list unavailable");
    }
}

async fn interactive<P: PreferenceStore>(shell: &mut ViewShell<P>) -> Result<()> {
    refresh_categories(shell).await;
    println!("{}", render_view(&shell.view()));
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };

        match command {
            SessionCommand::Quit => break,
            SessionCommand::Help => println!("{HELP}"),
            SessionCommand::Show => {
                refresh_categories(shell).await;
                println!("{}", render_view(&shell.view()));
            }
            SessionCommand::Fetch(series_id) => {
                if let Err(err) = shell.submit_series(&series_id).await {
                    debug!(error = %err, "interactive fetch failed");
                }
                refresh_categories(shell).await;
                println!("{}", render_view(&shell.view()));
            }
            SessionCommand::Submit => {
                if let Err(err) = shell.submit().await {
                    debug!(error = %err, "interactive submit failed");
                }
                refresh_categories(shell).await;
                println!("{}", render_view(&shell.view()));
            }
            SessionCommand::Open(category) => {
                if let Err(err) = shell.select_category(&category).await {
                    debug!(error = %err, "interactive open failed");
                }
                print!("{}", render_navigator(&shell.view()));
            }
            SessionCommand::Search(term) => {
                shell.search(&term);
                if let Err(err) = shell.settle().await {
                    debug!(error = %err, "interactive search failed");
                }
                print!("{}", render_navigator(&shell.view()));
            }
            SessionCommand::Back => {
                if !shell.back() {
                    println!("Already at the category grid");
                }
                refresh_categories(shell).await;
                print!("{}", render_navigator(&shell.view()));
            }
            SessionCommand::Pick(position) => match picked_series(&shell.view(), position) {
                Some(series_id) => {
                    shell.select_series(&series_id);
                    println!("Selected {series_id}; 'submit' to fetch it");
                }
                None => println!("No series at position {position}"),
            },
            SessionCommand::Toggle(key) => match shell.toggle(key) {
                Ok(value) => println!("{} = {value}", key.as_str()),
                Err(err) => println!("Could not save preference: {err:#}"),
            },
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
