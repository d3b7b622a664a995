//! Header figures derived from a stock snapshot.

use crate::types::{Measure, StockSnapshot};
use serde::{Deserialize, Serialize};

/// Rupees per crore.
const CRORE: f64 = 10_000_000.0;

/// Derived figures shown next to the price header.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapshotSummary {
    pub symbol: String,
    pub company_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_price: Option<f64>,
    /// Last price minus previous close
    pub day_change: Measure,
    pub day_change_percent: Measure,
    pub is_positive: bool,
    /// Position of the last price inside the 52-week range, in percent
    pub range_position_percent: Measure,
    /// Distance above the 52-week low, in percent
    pub from_low_percent: Measure,
    /// Distance below the 52-week high, in percent
    pub from_high_percent: Measure,
    /// Market cap in crores, e.g. "1,23,456.78 Cr"
    pub market_cap_display: String,
}

/// Compute the header figures. Missing inputs yield non-finite measures.
pub fn summarize(snapshot: &StockSnapshot) -> SnapshotSummary {
    let market = &snapshot.market_data;
    let last = market.last_price.unwrap_or(f64::NAN);
    let previous = market.previous_close.unwrap_or(f64::NAN);
    let low = market.week_52_low.unwrap_or(f64::NAN);
    let high = market.week_52_high.unwrap_or(f64::NAN);

    let day_change = Measure::from_f64(last - previous);
    let day_change_percent = Measure::ratio(last - previous, previous).map(|r| r * 100.0);
    let is_positive = matches!(day_change_percent, Measure::Finite(p) if p >= 0.0);

    SnapshotSummary {
        symbol: snapshot.stock_symbol.clone(),
        company_name: snapshot.company_name.clone(),
        last_price: market.last_price,
        day_change,
        day_change_percent,
        is_positive,
        range_position_percent: Measure::ratio(last - low, high - low).map(|r| r * 100.0),
        from_low_percent: Measure::ratio(last - low, low).map(|r| r * 100.0),
        from_high_percent: Measure::ratio(high - last, high).map(|r| r * 100.0),
        market_cap_display: snapshot
            .fundamentals
            .market_cap
            .filter(|v| v.is_finite())
            .map(format_crores)
            .unwrap_or_else(|| "N/A".to_string()),
    }
}

/// Format a rupee amount in crores with Indian digit grouping.
///
/// At most two decimals are shown and trailing zeros are dropped.
pub fn format_crores(amount: f64) -> String {
    let crores = amount / CRORE;
    let rounded = format!("{:.2}", crores.abs());
    let (whole, fraction) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');

    let mut out = String::new();
    if crores < 0.0 && rounded != "0.00" {
        out.push('-');
    }
    out.push_str(&group_indian(whole));
    if !fraction.is_empty() {
        out.push('.');
        out.push_str(fraction);
    }
    out.push_str(" Cr");
    out
}

/// Group digits as 12,34,56,789: last three, then pairs.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}
