//! Composite score factors expressed as ordered threshold bands.

use crate::types::StockSnapshot;
use serde::{Deserialize, Serialize};

/// Starting point before any factor adjusts the score.
pub const BASE_SCORE: i32 = 50;

/// One `(predicate, delta)` pair of a factor.
#[derive(Debug, Clone, Copy)]
pub struct ScoreBand {
    /// Human-readable description of the band
    pub label: &'static str,
    /// Whether a finite value falls in this band
    pub matches: fn(f64) -> bool,
    /// Score adjustment applied when the band matches
    pub delta: i32,
}

/// A single input to the composite score.
///
/// Bands are evaluated in declaration order and the first match wins. They
/// must never be re-sorted: boundary values (PE exactly 10, RSI exactly 20)
/// resolve by position in the list.
#[derive(Debug, Clone, Copy)]
pub struct ScoreFactor {
    pub name: &'static str,
    /// Reads the factor's input from the snapshot
    pub read: fn(&StockSnapshot) -> Option<f64>,
    pub bands: &'static [ScoreBand],
    /// Applied when no band matches, including absent or non-finite input
    pub fallback: i32,
}

/// How one factor moved the score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FactorContribution {
    pub factor: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    /// Label of the matching band, `None` when the fallback applied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub band: Option<String>,
    pub delta: i32,
}

impl ScoreFactor {
    /// Find the first matching band for this factor's input.
    pub fn matching_band(&self, snapshot: &StockSnapshot) -> Option<&'static ScoreBand> {
        let value = (self.read)(snapshot).filter(|v| v.is_finite())?;
        self.bands.iter().find(|band| (band.matches)(value))
    }

    /// Score adjustment contributed by this factor.
    pub fn delta(&self, snapshot: &StockSnapshot) -> i32 {
        self.matching_band(snapshot)
            .map(|band| band.delta)
            .unwrap_or(self.fallback)
    }

    pub fn contribution(&self, snapshot: &StockSnapshot) -> FactorContribution {
        let band = self.matching_band(snapshot);
        FactorContribution {
            factor: self.name.to_string(),
            value: (self.read)(snapshot).filter(|v| v.is_finite()),
            band: band.map(|b| b.label.to_string()),
            delta: band.map(|b| b.delta).unwrap_or(self.fallback),
        }
    }
}

const RSI_BANDS: &[ScoreBand] = &[
    ScoreBand {
        label: "30 to 70",
        matches: |v| (30.0..=70.0).contains(&v),
        delta: 10,
    },
    ScoreBand {
        label: "below 20 or above 80",
        matches: |v| v < 20.0 || v > 80.0,
        delta: -15,
    },
];

const PE_BANDS: &[ScoreBand] = &[
    ScoreBand {
        label: "10 to 20",
        matches: |v| (10.0..=20.0).contains(&v),
        delta: 15,
    },
    ScoreBand {
        label: "5 to 10",
        matches: |v| (5.0..10.0).contains(&v),
        delta: 10,
    },
    ScoreBand {
        label: "below 5",
        matches: |v| v < 5.0,
        delta: -10,
    },
    ScoreBand {
        label: "above 30",
        matches: |v| v > 30.0,
        delta: -15,
    },
];

const ROE_BANDS: &[ScoreBand] = &[
    ScoreBand {
        label: "15 or more",
        matches: |v| v >= 15.0,
        delta: 15,
    },
    ScoreBand {
        label: "10 or more",
        matches: |v| v >= 10.0,
        delta: 10,
    },
    ScoreBand {
        label: "5 or more",
        matches: |v| v >= 5.0,
        delta: 5,
    },
];

const DEBT_TO_EQUITY_BANDS: &[ScoreBand] = &[
    ScoreBand {
        label: "0.5 or less",
        matches: |v| v <= 0.5,
        delta: 10,
    },
    ScoreBand {
        label: "1 or less",
        matches: |v| v <= 1.0,
        delta: 5,
    },
    ScoreBand {
        label: "above 2",
        matches: |v| v > 2.0,
        delta: -15,
    },
];

/// RSI(14): neutral zone rewarded, extremes penalised.
pub const RSI_FACTOR: ScoreFactor = ScoreFactor {
    name: "RSI (14-day)",
    read: |s| s.technical_indicators.rsi_14,
    bands: RSI_BANDS,
    fallback: -5,
};

/// PE ratio. Values in (20, 30] fall through with no adjustment.
pub const PE_FACTOR: ScoreFactor = ScoreFactor {
    name: "PE Ratio",
    read: |s| s.fundamentals.pe_ratio,
    bands: PE_BANDS,
    fallback: 0,
};

pub const ROE_FACTOR: ScoreFactor = ScoreFactor {
    name: "ROE",
    read: |s| s.fundamentals.roe,
    bands: ROE_BANDS,
    fallback: -10,
};

pub const DEBT_TO_EQUITY_FACTOR: ScoreFactor = ScoreFactor {
    name: "Debt to Equity",
    read: |s| s.fundamentals.debt_to_equity,
    bands: DEBT_TO_EQUITY_BANDS,
    fallback: -5,
};

/// All composite score factors. Each reads only the snapshot, so the order
/// here does not affect the total.
pub const SCORE_FACTORS: &[ScoreFactor] = &[
    RSI_FACTOR,
    PE_FACTOR,
    ROE_FACTOR,
    DEBT_TO_EQUITY_FACTOR,
];
