//! Per-metric qualitative ratings.

use crate::types::StockSnapshot;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Qualitative rating band for a single metric.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Rating {
    Good,
    Fair,
    Poor,
    #[serde(rename = "Extremely Poor")]
    ExtremelyPoor,
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Rating::Good => "Good",
            Rating::Fair => "Fair",
            Rating::Poor => "Poor",
            Rating::ExtremelyPoor => "Extremely Poor",
        };
        f.write_str(label)
    }
}

/// Three descending thresholds for the generic classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub good: f64,
    pub fair: f64,
    pub poor: f64,
}

impl Thresholds {
    pub const fn new(good: f64, fair: f64, poor: f64) -> Self {
        Self { good, fair, poor }
    }
}

pub const RSI_THRESHOLDS: Thresholds = Thresholds::new(40.0, 30.0, 20.0);
pub const PE_THRESHOLDS: Thresholds = Thresholds::new(15.0, 10.0, 5.0);
pub const PB_THRESHOLDS: Thresholds = Thresholds::new(2.0, 1.5, 1.0);
pub const GROWTH_THRESHOLDS: Thresholds = Thresholds::new(10.0, 5.0, 0.0);

/// Revenue above which the sales growth placeholder switches to the high figure.
pub const LARGE_REVENUE: f64 = 100_000_000_000.0;

/// Classify a value against descending thresholds.
///
/// NaN compares false against every threshold and lands on `ExtremelyPoor`.
pub fn classify(value: f64, thresholds: Thresholds) -> Rating {
    if value >= thresholds.good {
        Rating::Good
    } else if value >= thresholds.fair {
        Rating::Fair
    } else if value >= thresholds.poor {
        Rating::Poor
    } else {
        Rating::ExtremelyPoor
    }
}

/// One row of the metric table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricRating {
    pub name: String,
    /// Value formatted with two decimals, or "N/A" when absent
    pub value: String,
    pub rating: Rating,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl MetricRating {
    fn new(name: &str, value: Option<f64>, rating: Rating) -> Self {
        Self {
            name: name.to_string(),
            value: format_value(value),
            rating,
            description: None,
        }
    }

    fn with_description(mut self, description: String) -> Self {
        self.description = Some(description);
        self
    }
}

fn format_value(value: Option<f64>) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => format!("{:.2}", v),
        None => "N/A".to_string(),
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn classify_opt(value: Option<f64>, thresholds: Thresholds) -> Rating {
    classify(value.unwrap_or(f64::NAN), thresholds)
}

/// Placeholder 1-year profit growth.
///
/// Not a trend computation: a fixed figure switched on the profit margin.
/// A zero or missing revenue makes the margin non-finite and selects the low
/// figure.
pub fn profit_growth(snapshot: &StockSnapshot) -> f64 {
    let profit = snapshot.fundamentals.profit.unwrap_or(f64::NAN);
    let revenue = snapshot.fundamentals.revenue.unwrap_or(f64::NAN);
    let margin = profit / revenue * 100.0;

    if margin.is_finite() && margin > 10.0 {
        15.5
    } else {
        -12.3
    }
}

/// Placeholder 1-year sales growth, switched on revenue size.
pub fn sales_growth(snapshot: &StockSnapshot) -> f64 {
    match snapshot.fundamentals.revenue {
        Some(revenue) if revenue > LARGE_REVENUE => 8.2,
        _ => 5.1,
    }
}

/// Build the ordered metric table for a snapshot.
pub fn metric_ratings(snapshot: &StockSnapshot) -> Vec<MetricRating> {
    let indicators = &snapshot.technical_indicators;
    let fundamentals = &snapshot.fundamentals;

    let rsi = finite(indicators.rsi_14);
    let ma_50 = finite(indicators.moving_averages.ma_50);
    let above_ema = match (snapshot.market_data.last_price, ma_50) {
        (Some(price), Some(ma)) => price > ma,
        _ => false,
    };
    let profit = profit_growth(snapshot);
    let sales = sales_growth(snapshot);
    let pe = finite(fundamentals.pe_ratio);
    let pb = finite(fundamentals.pb_ratio);

    let mut metrics = vec![
        MetricRating::new("RSI (14-day)", rsi, classify_opt(rsi, RSI_THRESHOLDS)),
        MetricRating::new(
            "EMA (50-day)",
            ma_50,
            if above_ema { Rating::Good } else { Rating::Poor },
        ),
        MetricRating::new(
            "1Y Profit Growth",
            Some(profit),
            classify(profit, GROWTH_THRESHOLDS),
        ),
        MetricRating::new(
            "1Y Sales Growth",
            Some(sales),
            classify(sales, GROWTH_THRESHOLDS),
        ),
    ];

    let mut pe_metric = MetricRating::new("Current PE (TTM)", pe, classify_opt(pe, PE_THRESHOLDS));
    if let Some(value) = pe {
        let verdict = if value < 10.0 {
            "undervaluation"
        } else {
            "fair valuation"
        };
        pe_metric = pe_metric.with_description(format!(
            "PE ratio of {:.2} indicates {}.",
            value, verdict
        ));
    }
    metrics.push(pe_metric);

    let mut pb_metric = MetricRating::new("Current PB (TTM)", pb, classify_opt(pb, PB_THRESHOLDS));
    if let Some(value) = pb {
        let verdict = if value < 1.5 {
            "good value"
        } else {
            "premium valuation"
        };
        pb_metric = pb_metric.with_description(format!(
            "PB ratio of {:.2} suggests {}.",
            value, verdict
        ));
    }
    metrics.push(pb_metric);

    metrics
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> StockSnapshot {
        let mut snapshot = StockSnapshot::default();
        snapshot.market_data.last_price = Some(120.0);
        snapshot.technical_indicators.rsi_14 = Some(45.0);
        snapshot.technical_indicators.moving_averages.ma_50 = Some(110.0);
        snapshot.fundamentals.pe_ratio = Some(8.0);
        snapshot.fundamentals.pb_ratio = Some(1.7);
        snapshot.fundamentals.revenue = Some(200_000_000_000.0);
        snapshot.fundamentals.profit = Some(30_000_000_000.0);
        snapshot
    }

    #[test]
    fn test_classify_bands() {
        let t = Thresholds::new(40.0, 30.0, 20.0);
        assert_eq!(classify(40.0, t), Rating::Good);
        assert_eq!(classify(39.9, t), Rating::Fair);
        assert_eq!(classify(30.0, t), Rating::Fair);
        assert_eq!(classify(20.0, t), Rating::Poor);
        assert_eq!(classify(19.9, t), Rating::ExtremelyPoor);
        assert_eq!(classify(f64::NAN, t), Rating::ExtremelyPoor);
    }

    #[test]
    fn test_rating_display_and_serde() {
        assert_eq!(Rating::ExtremelyPoor.to_string(), "Extremely Poor");
        assert_eq!(
            serde_json::to_string(&Rating::ExtremelyPoor).unwrap(),
            "\"Extremely Poor\""
        );
        assert_eq!(serde_json::to_string(&Rating::Good).unwrap(), "\"Good\"");
    }

    #[test]
    fn test_profit_growth_placeholder() {
        let mut s = snapshot();
        // 15% margin
        assert_eq!(profit_growth(&s), 15.5);

        s.fundamentals.profit = Some(10_000_000_000.0); // 5% margin
        assert_eq!(profit_growth(&s), -12.3);
    }

    #[test]
    fn test_profit_growth_zero_revenue() {
        let mut s = snapshot();
        s.fundamentals.revenue = Some(0.0);
        s.fundamentals.profit = Some(50.0);
        assert_eq!(profit_growth(&s), -12.3);

        s.fundamentals.revenue = None;
        assert_eq!(profit_growth(&s), -12.3);
    }

    #[test]
    fn test_sales_growth_placeholder() {
        let mut s = snapshot();
        assert_eq!(sales_growth(&s), 8.2);

        s.fundamentals.revenue = Some(LARGE_REVENUE);
        assert_eq!(sales_growth(&s), 5.1);

        s.fundamentals.revenue = None;
        assert_eq!(sales_growth(&s), 5.1);
    }

    #[test]
    fn test_metric_table_order_and_ratings() {
        let metrics = metric_ratings(&snapshot());
        let names: Vec<_> = metrics.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "RSI (14-day)",
                "EMA (50-day)",
                "1Y Profit Growth",
                "1Y Sales Growth",
                "Current PE (TTM)",
                "Current PB (TTM)",
            ]
        );

        assert_eq!(metrics[0].rating, Rating::Good);
        assert_eq!(metrics[0].value, "45.00");
        assert_eq!(metrics[1].rating, Rating::Good);
        assert_eq!(metrics[1].value, "110.00");
        assert_eq!(metrics[2].value, "15.50");
        assert_eq!(metrics[2].rating, Rating::Good);
        assert_eq!(metrics[3].value, "8.20");
        assert_eq!(metrics[3].rating, Rating::Fair);
        assert_eq!(metrics[4].rating, Rating::Poor);
        assert_eq!(metrics[5].rating, Rating::Fair);
    }

    #[test]
    fn test_descriptions() {
        let metrics = metric_ratings(&snapshot());
        assert_eq!(
            metrics[4].description.as_deref(),
            Some("PE ratio of 8.00 indicates undervaluation.")
        );
        assert_eq!(
            metrics[5].description.as_deref(),
            Some("PB ratio of 1.70 suggests premium valuation.")
        );
        assert!(metrics[0].description.is_none());
    }

    #[test]
    fn test_ema_rating_is_binary() {
        let mut s = snapshot();
        s.market_data.last_price = Some(110.0);
        assert_eq!(metric_ratings(&s)[1].rating, Rating::Poor);

        s.technical_indicators.moving_averages.ma_50 = None;
        let ema = &metric_ratings(&s)[1];
        assert_eq!(ema.rating, Rating::Poor);
        assert_eq!(ema.value, "N/A");
    }

    #[test]
    fn test_missing_values_rate_extremely_poor() {
        let metrics = metric_ratings(&StockSnapshot::default());
        assert_eq!(metrics[0].rating, Rating::ExtremelyPoor);
        assert_eq!(metrics[0].value, "N/A");
        assert_eq!(metrics[4].rating, Rating::ExtremelyPoor);
        assert!(metrics[4].description.is_none());
        assert_eq!(metrics[5].rating, Rating::ExtremelyPoor);
        // Placeholders still produce figures
        assert_eq!(metrics[2].value, "-12.30");
        assert_eq!(metrics[2].rating, Rating::ExtremelyPoor);
        assert_eq!(metrics[3].value, "5.10");
        assert_eq!(metrics[3].rating, Rating::Fair);
    }

    #[test]
    fn test_non_finite_values_read_as_missing() {
        let mut s = StockSnapshot::default();
        s.technical_indicators.rsi_14 = Some(f64::NAN);
        s.technical_indicators.moving_averages.ma_50 = Some(f64::INFINITY);
        s.fundamentals.pe_ratio = Some(f64::NEG_INFINITY);
        s.fundamentals.pb_ratio = Some(f64::NAN);

        let metrics = metric_ratings(&s);
        for idx in [0, 1, 4, 5] {
            assert_eq!(metrics[idx].value, "N/A");
        }
        assert_eq!(metrics[0].rating, Rating::ExtremelyPoor);
        assert_eq!(metrics[4].rating, Rating::ExtremelyPoor);
        assert!(metrics[4].description.is_none());
        assert!(metrics[5].description.is_none());
    }
}
