//! Prysm CLI - score a stock snapshot, chart its price history and manage
//! custom metrics.
//!
//! Every command prints a JSON `ApiResponse` envelope on stdout; logs go to
//! stderr.

use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand};
use prysm_core::{
    compute_score,
    series::{parse_feed, ChartSession, FeedClient, TimeRange},
    summarize, ApiResponse, Config, MetricStore, StockSnapshot,
};
use serde::Serialize;
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "prysm")]
#[command(about = "Prysm stock view - score, chart and custom metrics")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a snapshot document
    Score {
        /// Path to the snapshot JSON
        #[arg(short, long)]
        snapshot: PathBuf,
    },
    /// Window the historical price feed for a symbol
    Chart {
        /// Stock symbol (defaults to the configured symbol)
        #[arg(short, long)]
        symbol: Option<String>,
        /// Time range: 1M, 3M, 6M, 1Y or 2Y
        #[arg(short, long)]
        range: Option<TimeRange>,
        /// Read a saved feed instead of fetching
        #[arg(short, long)]
        feed: Option<PathBuf>,
    },
    /// Custom metric commands
    Metrics {
        #[command(subcommand)]
        action: MetricsAction,
    },
    /// Show the effective configuration
    Config,
}

#[derive(Subcommand)]
enum MetricsAction {
    /// List all metrics
    List,
    /// Add a metric with sample values
    Add,
    /// Remove a metric by id
    Remove {
        /// Metric id
        #[arg(short, long)]
        id: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    let output = match cli.command {
        Commands::Score { snapshot } => handle_score(snapshot),
        Commands::Chart {
            symbol,
            range,
            feed,
        } => handle_chart(&config, symbol, range, feed).await,
        Commands::Metrics { action } => handle_metrics(&config, action),
        Commands::Config => render(ApiResponse::ok(masked(&config))),
    };

    println!("{}", output);
    Ok(())
}

fn render<T: Serialize>(response: ApiResponse<T>) -> String {
    serde_json::to_string_pretty(&response)
        .unwrap_or_else(|e| format!(r#"{{"ok":false,"error":"{}"}}"#, e))
}

fn error(message: impl Into<String>) -> String {
    render(ApiResponse::<()>::err(message))
}

fn masked(config: &Config) -> Config {
    let mut shown = config.clone();
    if !shown.api_key.is_empty() {
        shown.api_key = "****".to_string();
    }
    shown
}

fn handle_score(path: PathBuf) -> String {
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) => return error(format!("Cannot read {}: {}", path.display(), e)),
    };
    let snapshot: StockSnapshot = match serde_json::from_str(&content) {
        Ok(snapshot) => snapshot,
        Err(e) => return error(format!("Invalid snapshot: {}", e)),
    };

    render(ApiResponse::ok(json!({
        "summary": summarize(&snapshot),
        "score": compute_score(&snapshot),
    })))
}

async fn handle_chart(
    config: &Config,
    symbol: Option<String>,
    range: Option<TimeRange>,
    feed: Option<PathBuf>,
) -> String {
    let symbol = symbol.unwrap_or_else(|| config.default_symbol.clone());
    let range = range.unwrap_or(config.default_range);

    let mut session = ChartSession::new(&symbol, range);
    let ticket = session.refresh();

    let result = match feed {
        Some(path) => match fs::read_to_string(&path) {
            Ok(body) => parse_feed(session.symbol(), &body),
            Err(e) => return error(format!("Cannot read {}: {}", path.display(), e)),
        },
        None => {
            if config.api_key.is_empty() {
                tracing::warn!("No API key configured; set PRYSM_API_KEY");
            }
            FeedClient::new(&config.feed_url)
                .fetch_raw_feed(session.symbol(), &config.api_key)
                .await
        }
    };

    session.resolve(&ticket, result, Local::now().date_naive());

    let state = session.state();
    if state.is_failed() {
        tracing::info!("Retry with: prysm chart --symbol {} --range {}", symbol, range);
    }
    render(ApiResponse::ok(json!({
        "symbol": session.symbol(),
        "range": range,
        "chart": state,
    })))
}

fn handle_metrics(config: &Config, action: MetricsAction) -> String {
    let mut store = match &config.metrics_file {
        Some(path) => MetricStore::with_path(path.clone()),
        None => MetricStore::new(),
    };

    match action {
        MetricsAction::List => render(ApiResponse::ok(json!({
            "metrics": store.metrics(),
        }))),
        MetricsAction::Add => match store.add() {
            Ok(metric) => render(ApiResponse::ok(json!({
                "added": metric,
                "count": store.len(),
            }))),
            Err(e) => error(e.to_string()),
        },
        MetricsAction::Remove { id } => match store.remove(id) {
            Ok(removed) => render(ApiResponse::ok(json!({
                "removed": removed,
                "count": store.len(),
            }))),
            Err(e) => error(e.to_string()),
        },
    }
}
