//! Custom metric storage and persistence.

use crate::types::CustomMetric;
use crate::Result;
use chrono::Utc;
use rand::Rng;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Rows shown before the user has added or removed anything.
pub fn seed_metrics() -> Vec<CustomMetric> {
    vec![
        CustomMetric {
            id: 1,
            name: "Metric 1".to_string(),
            pe: 24.5,
            peg: 1.2,
            rsi: 56,
        },
        CustomMetric {
            id: 2,
            name: "Metric 2".to_string(),
            pe: 18.3,
            peg: 0.9,
            rsi: 43,
        },
        CustomMetric {
            id: 3,
            name: "Metric 3".to_string(),
            pe: 31.7,
            peg: 2.1,
            rsi: 68,
        },
    ]
}

/// Custom metric store that persists the full collection to JSON.
#[derive(Debug)]
pub struct MetricStore {
    /// Path to the metrics JSON file; empty for in-memory stores
    path: PathBuf,
    metrics: Vec<CustomMetric>,
    /// Highest id handed out or loaded, so new ids never collide
    last_id: i64,
}

impl MetricStore {
    /// Open the store at the default path.
    ///
    /// Default path: `~/.prysm/custom_metrics.json`
    /// Can be overridden with `PRYSM_METRICS_FILE` environment variable.
    pub fn new() -> Self {
        Self::with_path(Self::default_path())
    }

    /// Open the store at a custom path, rehydrating or seeding it.
    pub fn with_path(path: PathBuf) -> Self {
        let metrics = match Self::load_from_path(&path) {
            Ok(Some(metrics)) => metrics,
            Ok(None) => seed_metrics(),
            Err(e) => {
                tracing::warn!(path = %path.display(), "Unreadable metrics file, using seed set: {}", e);
                seed_metrics()
            }
        };
        Self::from_metrics(path, metrics)
    }

    /// Create an in-memory store seeded with the default rows (no persistence).
    pub fn in_memory() -> Self {
        Self::from_metrics(PathBuf::new(), seed_metrics())
    }

    fn from_metrics(path: PathBuf, metrics: Vec<CustomMetric>) -> Self {
        let last_id = metrics.iter().map(|m| m.id).max().unwrap_or(0);
        Self {
            path,
            metrics,
            last_id,
        }
    }

    /// Get the default metrics file path.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var("PRYSM_METRICS_FILE") {
            return PathBuf::from(path);
        }

        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".prysm/custom_metrics.json"))
            .unwrap_or_else(|| PathBuf::from("custom_metrics.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read persisted metrics. `None` when nothing has been persisted yet.
    fn load_from_path(path: &Path) -> Result<Option<Vec<CustomMetric>>> {
        if path.as_os_str().is_empty() || !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Write the full collection to disk.
    pub fn save(&self) -> Result<()> {
        self.persist(&self.metrics)
    }

    fn persist(&self, metrics: &[CustomMetric]) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(metrics)?;
        fs::write(&self.path, content)?;
        tracing::debug!(path = %self.path.display(), count = metrics.len(), "Saved custom metrics");
        Ok(())
    }

    /// Reload the collection from disk.
    pub fn reload(&mut self) -> Result<()> {
        let metrics = Self::load_from_path(&self.path)?.unwrap_or_else(seed_metrics);
        self.last_id = self
            .last_id
            .max(metrics.iter().map(|m| m.id).max().unwrap_or(0));
        self.metrics = metrics;
        Ok(())
    }

    /// All metrics in insertion order.
    pub fn metrics(&self) -> &[CustomMetric] {
        &self.metrics
    }

    pub fn find(&self, id: i64) -> Option<&CustomMetric> {
        self.metrics.iter().find(|m| m.id == id)
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Next id: the wall-clock millisecond, bumped past anything already used.
    fn next_id(&self, now_ms: i64) -> i64 {
        now_ms.max(self.last_id + 1)
    }

    /// Append a metric with sample values and persist.
    pub fn add(&mut self) -> Result<CustomMetric> {
        let now_ms = Utc::now().timestamp_millis();
        self.add_with(&mut rand::thread_rng(), now_ms)
    }

    /// Append a metric using the given generator and clock, then persist.
    ///
    /// - `pe` in [0, 60] and `peg` in [0, 3], rounded to two decimals
    /// - `rsi` an integer in [0, 100)
    ///
    /// The store is left unchanged when the save fails.
    pub fn add_with<R: Rng>(&mut self, rng: &mut R, now_ms: i64) -> Result<CustomMetric> {
        let metric = CustomMetric {
            id: self.next_id(now_ms),
            name: format!("Metric {}", self.metrics.len() + 1),
            pe: round2(rng.gen_range(0.0..60.0)),
            peg: round2(rng.gen_range(0.0..3.0)),
            rsi: rng.gen_range(0..100),
        };

        let mut next = self.metrics.clone();
        next.push(metric.clone());
        self.persist(&next)?;

        self.metrics = next;
        self.last_id = metric.id;
        Ok(metric)
    }

    /// Remove a metric by id and persist.
    ///
    /// An unknown id is a no-op and returns `None`. The store is left
    /// unchanged when the save fails.
    pub fn remove(&mut self, id: i64) -> Result<Option<CustomMetric>> {
        let mut next = self.metrics.clone();
        let removed = next
            .iter()
            .position(|m| m.id == id)
            .map(|idx| next.remove(idx));

        self.persist(&next)?;
        self.metrics = next;
        Ok(removed)
    }
}

impl Default for MetricStore {
    fn default() -> Self {
        Self::new()
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
