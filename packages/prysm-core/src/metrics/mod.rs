//! User-defined custom metrics.
//!
//! Metrics are created with sample values, removed by id, and the whole
//! collection is written to JSON after every change.

mod store;

pub use store::{seed_metrics, MetricStore};
