//! `sitewatch-tui` — Terminal dashboard for monitored site availability.
//!
//! Built on [ratatui](https://ratatui.rs) over the state layer in
//! `sitewatch-core`. Each monitored site renders as a card showing its
//! current status; expanding a card (Enter/Space or mouse click) reveals
//! its recent check history with an availability rate.
//!
//! Logs are written to a file (default `/tmp/sitewatch-tui.log`) to avoid
//! corrupting the terminal UI. The actual probing happens server-side; this
//! binary only talks to the backend's site-availability endpoints.
//!
//! Entry point: CLI argument parsing, config loading, tracing setup, panic
//! hooks, and app launch.

mod action;
mod app;
mod config;
mod event;
mod theme;
mod tui;
mod ui;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use sitewatch_core::{ApiClient, HistoryCache, Monitor};

use crate::app::App;
use crate::config::Config;

/// Terminal dashboard for monitored site availability.
#[derive(Parser, Debug)]
#[command(name = "sitewatch-tui", version, about)]
struct Cli {
    /// Backend base URL (e.g. http://127.0.0.1:8080)
    #[arg(short = 'u', long)]
    url: Option<String>,

    /// Config file path (defaults to the platform config directory)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// HTTP request timeout in seconds
    #[arg(short = 't', long)]
    timeout: Option<u64>,

    /// Log file path (overrides the configured location)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Set up file-based tracing. We MUST NOT log to stdout/stderr — that would
/// corrupt the TUI output. Returns a guard that must be held for the
/// lifetime of the application to ensure logs are flushed.
fn setup_tracing(log_file: &std::path::Path, verbose: u8) -> WorkerGuard {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "sitewatch_tui={log_level},sitewatch_core={log_level},sitewatch_api={log_level}"
        ))
    });

    let log_dir = log_file.parent().unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("sitewatch-tui.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    guard
}

/// Merge CLI overrides into the loaded configuration.
fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut cfg = config::load(cli.config.as_deref())?;
    if let Some(url) = &cli.url {
        cfg.url = Some(url.clone());
    }
    if let Some(timeout) = cli.timeout {
        cfg.timeout_secs = timeout;
    }
    if let Some(log_file) = &cli.log_file {
        cfg.log_file = log_file.clone();
    }
    Ok(cfg)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Install panic/error hooks BEFORE entering the terminal
    tui::install_hooks()?;

    let cfg = resolve_config(&cli)?;

    // Tracing to file — hold the guard so logs flush on exit
    let _log_guard = setup_tracing(&cfg.log_file, cli.verbose);

    let Some(url) = &cfg.url else {
        return Err(eyre!(
            "no backend URL configured; pass --url, set SITEWATCH_URL, or add `url` to the config file"
        ));
    };

    let api = ApiClient::new(url.parse()?, Duration::from_secs(cfg.timeout_secs))?;
    info!(url = %api.base_url(), timeout_secs = cfg.timeout_secs, "starting sitewatch-tui");

    let monitor = Monitor::new(api.clone());
    let history = HistoryCache::new(api);

    let mut app = App::new(monitor, history);
    app.run().await?;

    Ok(())
}
