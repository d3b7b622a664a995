//! Date-window filtering and aggregates over a price feed.

use crate::types::{Measure, PricePoint};
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Range selector offered to the chart.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum TimeRange {
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "3M")]
    #[default]
    ThreeMonths,
    #[serde(rename = "6M")]
    SixMonths,
    #[serde(rename = "1Y")]
    OneYear,
    #[serde(rename = "2Y")]
    TwoYears,
}

impl TimeRange {
    pub const ALL: [TimeRange; 5] = [
        TimeRange::OneMonth,
        TimeRange::ThreeMonths,
        TimeRange::SixMonths,
        TimeRange::OneYear,
        TimeRange::TwoYears,
    ];

    /// Number of calendar months covered by the range.
    pub fn months(&self) -> u32 {
        match self {
            TimeRange::OneMonth => 1,
            TimeRange::ThreeMonths => 3,
            TimeRange::SixMonths => 6,
            TimeRange::OneYear => 12,
            TimeRange::TwoYears => 24,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeRange::OneMonth => "1M",
            TimeRange::ThreeMonths => "3M",
            TimeRange::SixMonths => "6M",
            TimeRange::OneYear => "1Y",
            TimeRange::TwoYears => "2Y",
        }
    }

    /// First date included in the window ending on `today`.
    ///
    /// Keeps the day of month; when the target month is shorter, clamps to
    /// its last day (Mar 31 minus one month is Feb 28 or 29).
    pub fn cutoff(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_sub_months(Months::new(self.months()))
            .unwrap_or(NaiveDate::MIN)
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeRange::ALL
            .into_iter()
            .find(|range| range.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown time range: {} (expected 1M, 3M, 6M, 1Y or 2Y)", s))
    }
}

/// A price point with its display label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartPoint {
    #[serde(flatten)]
    pub point: PricePoint,
    /// Short label such as "Jan 5"
    pub formatted_date: String,
}

impl ChartPoint {
    fn new(point: PricePoint) -> Self {
        let formatted_date = point.date.format("%b %-d").to_string();
        Self {
            point,
            formatted_date,
        }
    }
}

/// Change from the first to the last close of the window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct OverallChange {
    pub change: f64,
    /// Percent change; non-finite when the first close is zero
    pub change_percent: Measure,
}

/// Windowed series plus aggregates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeriesView {
    pub range: TimeRange,
    /// Points in the window, oldest first
    pub points: Vec<ChartPoint>,
    /// Last close, or 0 for an empty window
    pub current_price: f64,
    pub overall_change: OverallChange,
    /// Highest `high` in the window, `None` when empty
    pub period_high: Option<f64>,
    /// Lowest `low` in the window, `None` when empty
    pub period_low: Option<f64>,
    /// Mean volume in millions, one decimal; non-finite when empty
    pub average_volume: Measure,
    pub point_count: usize,
}

impl SeriesView {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether the window closed at or above where it opened.
    pub fn is_positive(&self) -> bool {
        matches!(self.overall_change.change_percent, Measure::Finite(p) if p >= 0.0)
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first().map(|p| &p.point)
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last().map(|p| &p.point)
    }
}

/// Restrict a feed to `range` ending at `today` and compute its aggregates.
///
/// The feed may arrive in any order; the output is sorted oldest first. The
/// sort is stable, so a newest-first feed comes out exactly reversed.
pub fn build_view(raw_feed: &[PricePoint], range: TimeRange, today: NaiveDate) -> SeriesView {
    let cutoff = range.cutoff(today);

    let mut window: Vec<PricePoint> = raw_feed
        .iter()
        .filter(|p| p.date >= cutoff)
        .cloned()
        .collect();
    window.reverse();
    window.sort_by_key(|p| p.date);

    let current_price = window.last().map(|p| p.close).unwrap_or(0.0);
    let overall_change = overall_change(&window);
    let period_high = period_high(&window);
    let period_low = period_low(&window);
    let average_volume = average_volume_millions(&window);
    let point_count = window.len();

    SeriesView {
        range,
        points: window.into_iter().map(ChartPoint::new).collect(),
        current_price,
        overall_change,
        period_high,
        period_low,
        average_volume,
        point_count,
    }
}

/// First-to-last change over an ordered window.
pub fn overall_change(window: &[PricePoint]) -> OverallChange {
    match (window.first(), window.last()) {
        (Some(first), Some(last)) if window.len() >= 2 => {
            let change = last.close - first.close;
            OverallChange {
                change,
                change_percent: Measure::ratio(change, first.close).map(|r| r * 100.0),
            }
        }
        _ => OverallChange::default(),
    }
}

/// Highest `high`, skipping NaN values.
pub fn period_high(window: &[PricePoint]) -> Option<f64> {
    window
        .iter()
        .map(|p| p.high)
        .filter(|v| !v.is_nan())
        .reduce(f64::max)
}

/// Lowest `low`, skipping NaN values.
pub fn period_low(window: &[PricePoint]) -> Option<f64> {
    window
        .iter()
        .map(|p| p.low)
        .filter(|v| !v.is_nan())
        .reduce(f64::min)
}

/// Mean volume in millions rounded to one decimal.
pub fn average_volume_millions(window: &[PricePoint]) -> Measure {
    let total: f64 = window.iter().map(|p| p.volume).sum();
    Measure::ratio(total, window.len() as f64).map(|avg| (avg / 1_000_000.0 * 10.0).round() / 10.0)
}
