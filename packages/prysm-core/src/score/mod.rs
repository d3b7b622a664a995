//! Composite "Prysm Score" and per-metric ratings.
//!
//! The composite score starts at 50 and each factor in [`SCORE_FACTORS`]
//! adds or subtracts a fixed amount according to its first matching band.
//! The total is clamped to 0-100. Scoring is total: absent or non-finite
//! inputs fall through every band instead of failing.

mod bands;
mod ratings;

pub use bands::{
    FactorContribution, ScoreBand, ScoreFactor, BASE_SCORE, DEBT_TO_EQUITY_FACTOR, PE_FACTOR,
    ROE_FACTOR, RSI_FACTOR, SCORE_FACTORS,
};
pub use ratings::{
    classify, metric_ratings, profit_growth, sales_growth, MetricRating, Rating, Thresholds,
    GROWTH_THRESHOLDS, PB_THRESHOLDS, PE_THRESHOLDS, RSI_THRESHOLDS,
};

use crate::types::StockSnapshot;
use serde::{Deserialize, Serialize};

/// Gauge band for a composite score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScoreTier {
    Strong,
    Moderate,
    Weak,
    Critical,
}

impl ScoreTier {
    pub fn from_score(score: u8) -> Self {
        match score {
            75.. => ScoreTier::Strong,
            50.. => ScoreTier::Moderate,
            25.. => ScoreTier::Weak,
            _ => ScoreTier::Critical,
        }
    }
}

/// Output of [`compute_score`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreResult {
    /// Composite score, 0-100
    pub score: u8,
    pub tier: ScoreTier,
    /// Per-factor breakdown of the composite score
    pub factors: Vec<FactorContribution>,
    /// Ordered metric table
    pub metrics: Vec<MetricRating>,
}

/// Composite score alone, clamped to 0-100.
pub fn composite_score(snapshot: &StockSnapshot) -> u8 {
    let total: i32 = BASE_SCORE
        + SCORE_FACTORS
            .iter()
            .map(|factor| factor.delta(snapshot))
            .sum::<i32>();
    total.clamp(0, 100) as u8
}

/// Score a snapshot and rate its individual metrics.
///
/// # Example
///
/// ```rust
/// use prysm_core::{score::compute_score, StockSnapshot};
///
/// let mut snapshot = StockSnapshot::default();
/// snapshot.technical_indicators.rsi_14 = Some(55.0);
/// snapshot.fundamentals.pe_ratio = Some(12.0);
/// snapshot.fundamentals.roe = Some(18.0);
/// snapshot.fundamentals.debt_to_equity = Some(0.4);
///
/// let result = compute_score(&snapshot);
/// assert_eq!(result.score, 100);
/// ```
pub fn compute_score(snapshot: &StockSnapshot) -> ScoreResult {
    let score = composite_score(snapshot);
    ScoreResult {
        score,
        tier: ScoreTier::from_score(score),
        factors: SCORE_FACTORS
            .iter()
            .map(|factor| factor.contribution(snapshot))
            .collect(),
        metrics: metric_ratings(snapshot),
    }
}
