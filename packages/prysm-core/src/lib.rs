//! Prysm Core - Stock scoring and price-series library.
//!
//! This crate provides the computation behind the Prysm stock view:
//!
//! - **Scoring**: Composite 0-100 score and per-metric ratings from a snapshot
//! - **Series**: Date-windowed price history with period aggregates
//! - **Snapshot summary**: Day change and 52-week range figures
//! - **Custom metrics**: User-defined rows persisted to JSON
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use prysm_core::series::{build_view, TimeRange};
//! use prysm_core::PricePoint;
//!
//! let today = NaiveDate::from_ymd_opt(2025, 6, 13).unwrap();
//! let feed = vec![
//!     PricePoint::flat("AAPL", today, 110.0, 1_000_000.0),
//!     PricePoint::flat("AAPL", today.pred_opt().unwrap(), 100.0, 1_000_000.0),
//! ];
//!
//! let view = build_view(&feed, TimeRange::OneMonth, today);
//! assert_eq!(view.current_price, 110.0);
//! assert_eq!(view.overall_change.change, 10.0);
//! ```

pub mod config;
pub mod metrics;
pub mod score;
pub mod series;
pub mod snapshot;
pub mod types;

// Re-export commonly used types
pub use types::{ApiResponse, CustomMetric, Measure, PricePoint, StockSnapshot};

// Re-export main functionality
pub use config::Config;
pub use metrics::MetricStore;
pub use score::{compute_score, MetricRating, Rating, ScoreResult, ScoreTier};
pub use series::{
    build_view, ChartSession, ChartState, FeedClient, FetchError, SeriesView, TimeRange,
};
pub use snapshot::{summarize, SnapshotSummary};

/// Error types for prysm-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Result type for prysm-core operations.
pub type Result<T> = std::result::Result<T, Error>;
