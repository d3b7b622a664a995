//! Core data types for the Prysm stock view.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Market snapshot for a single equity, as loaded from the snapshot document.
///
/// Every numeric field is optional: the document is assumed pre-validated but
/// absent or null values must only degrade scoring, never fail it.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct StockSnapshot {
    /// Ticker symbol
    pub stock_symbol: String,
    /// Company display name
    pub company_name: String,
    /// Listing exchange
    pub exchange: String,
    /// Price and volume figures for the current session
    pub market_data: MarketData,
    /// Valuation and balance-sheet figures
    pub fundamentals: Fundamentals,
    /// Pre-computed technical indicators
    pub technical_indicators: TechnicalIndicators,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_analysis: Option<VolumeAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub momentum: Option<Momentum>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analyst_ratings: Option<AnalystRatings>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub news: Vec<NewsItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct MarketData {
    pub last_price: Option<f64>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub previous_close: Option<f64>,
    #[serde(rename = "52_week_high")]
    pub week_52_high: Option<f64>,
    #[serde(rename = "52_week_low")]
    pub week_52_low: Option<f64>,
    pub volume: Option<f64>,
    pub average_volume: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Fundamentals {
    pub market_cap: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub pb_ratio: Option<f64>,
    pub eps: Option<f64>,
    pub dividend_yield: Option<f64>,
    /// Return on equity, in percent
    pub roe: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub revenue: Option<f64>,
    pub profit: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct TechnicalIndicators {
    pub moving_averages: MovingAverages,
    pub rsi_14: Option<f64>,
    pub macd: MacdValues,
    pub bollinger_bands: BollingerValues,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct MovingAverages {
    pub ma_20: Option<f64>,
    pub ma_50: Option<f64>,
    pub ma_100: Option<f64>,
    pub ma_200: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct MacdValues {
    pub macd_value: Option<f64>,
    pub signal: Option<f64>,
    pub histogram: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct BollingerValues {
    pub upper_band: Option<f64>,
    pub middle_band: Option<f64>,
    pub lower_band: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct VolumeAnalysis {
    pub average_5_day_volume: Option<f64>,
    pub average_10_day_volume: Option<f64>,
    pub volume_spike: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Momentum {
    pub atr_14: Option<f64>,
    pub adx_14: Option<f64>,
    pub stochastic_k: Option<f64>,
    pub stochastic_d: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct AnalystRatings {
    pub buy: Option<f64>,
    pub hold: Option<f64>,
    pub sell: Option<f64>,
    pub target_price: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct NewsItem {
    pub date: String,
    pub headline: String,
    pub link: String,
}

/// One daily bar from the historical price feed (split-adjusted values).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PricePoint {
    pub symbol: String,
    #[serde(deserialize_with = "deserialize_feed_date")]
    pub date: NaiveDate,
    #[serde(rename = "adjOpen")]
    pub open: f64,
    #[serde(rename = "adjHigh")]
    pub high: f64,
    #[serde(rename = "adjLow")]
    pub low: f64,
    #[serde(rename = "adjClose")]
    pub close: f64,
    pub volume: f64,
}

impl PricePoint {
    /// Create a bar with identical open/high/low/close.
    pub fn flat(symbol: &str, date: NaiveDate, close: f64, volume: f64) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume,
        }
    }
}

/// Accepts `YYYY-MM-DD` with or without a trailing time component.
fn deserialize_feed_date<'de, D>(deserializer: D) -> std::result::Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let day = raw.get(..10).unwrap_or(&raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(serde::de::Error::custom)
}

/// A user-defined metric row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomMetric {
    /// Millisecond timestamp id, unique within a session
    pub id: i64,
    pub name: String,
    pub pe: f64,
    pub peg: f64,
    pub rsi: u32,
}

/// A derived figure that may be undefined because of a zero denominator.
///
/// Serialized as a JSON number, or `null` when non-finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measure {
    Finite(f64),
    NonFinite,
}

impl Measure {
    /// Wrap a raw computation result, mapping NaN and infinities to `NonFinite`.
    pub fn from_f64(value: f64) -> Self {
        if value.is_finite() {
            Measure::Finite(value)
        } else {
            Measure::NonFinite
        }
    }

    /// `numerator / denominator`, non-finite when the denominator is zero.
    pub fn ratio(numerator: f64, denominator: f64) -> Self {
        Self::from_f64(numerator / denominator)
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Measure::Finite(v) => Some(*v),
            Measure::NonFinite => None,
        }
    }

    pub fn is_finite(&self) -> bool {
        matches!(self, Measure::Finite(_))
    }

    /// Apply `f` to a finite value; non-finite stays non-finite.
    pub fn map(self, f: impl FnOnce(f64) -> f64) -> Self {
        match self {
            Measure::Finite(v) => Self::from_f64(f(v)),
            Measure::NonFinite => Measure::NonFinite,
        }
    }
}

impl Default for Measure {
    fn default() -> Self {
        Measure::Finite(0.0)
    }
}

impl Serialize for Measure {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Measure::Finite(v) => serializer.serialize_f64(*v),
            Measure::NonFinite => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Measure {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Option::<f64>::deserialize(deserializer)?;
        Ok(value.map(Measure::from_f64).unwrap_or(Measure::NonFinite))
    }
}

/// API response wrapper used for CLI output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_from_partial_document() {
        let json = r#"{
            "stock_symbol": "ADANIPOWER",
            "company_name": "Adani Power Limited",
            "exchange": "NSE",
            "market_data": { "last_price": 512.4, "52_week_high": 896.75, "52_week_low": null },
            "fundamentals": { "pe_ratio": 14.2 }
        }"#;
        let snapshot: StockSnapshot = serde_json::from_str(json).unwrap();

        assert_eq!(snapshot.stock_symbol, "ADANIPOWER");
        assert_eq!(snapshot.market_data.last_price, Some(512.4));
        assert_eq!(snapshot.market_data.week_52_high, Some(896.75));
        assert_eq!(snapshot.market_data.week_52_low, None);
        assert_eq!(snapshot.fundamentals.pe_ratio, Some(14.2));
        assert_eq!(snapshot.fundamentals.roe, None);
        assert_eq!(snapshot.technical_indicators.rsi_14, None);
        assert!(snapshot.news.is_empty());
    }

    #[test]
    fn test_price_point_from_feed_json() {
        let json = r#"{
            "symbol": "AAPL",
            "date": "2025-01-06",
            "adjOpen": 244.31,
            "adjHigh": 247.33,
            "adjLow": 243.2,
            "adjClose": 245.0,
            "volume": 45045571
        }"#;
        let point: PricePoint = serde_json::from_str(json).unwrap();

        assert_eq!(point.date, NaiveDate::from_ymd_opt(2025, 1, 6).unwrap());
        assert_eq!(point.close, 245.0);
        assert_eq!(point.high, 247.33);
        assert_eq!(point.volume, 45045571.0);
    }

    #[test]
    fn test_price_point_date_with_time_suffix() {
        let json = r#"{"symbol":"AAPL","date":"2025-01-06 00:00:00","adjOpen":1,"adjHigh":1,"adjLow":1,"adjClose":1,"volume":1}"#;
        let point: PricePoint = serde_json::from_str(json).unwrap();
        assert_eq!(point.date, NaiveDate::from_ymd_opt(2025, 1, 6).unwrap());
    }

    #[test]
    fn test_price_point_bad_date_rejected() {
        let json = r#"{"symbol":"AAPL","date":"06/01/2025","adjOpen":1,"adjHigh":1,"adjLow":1,"adjClose":1,"volume":1}"#;
        assert!(serde_json::from_str::<PricePoint>(json).is_err());
    }

    #[test]
    fn test_measure_ratio() {
        assert_eq!(Measure::ratio(10.0, 4.0), Measure::Finite(2.5));
        assert_eq!(Measure::ratio(10.0, 0.0), Measure::NonFinite);
        assert_eq!(Measure::ratio(0.0, 0.0), Measure::NonFinite);
        assert_eq!(Measure::NonFinite.map(|v| v * 100.0), Measure::NonFinite);
    }

    #[test]
    fn test_measure_serializes_as_number_or_null() {
        assert_eq!(serde_json::to_string(&Measure::Finite(1.5)).unwrap(), "1.5");
        assert_eq!(serde_json::to_string(&Measure::NonFinite).unwrap(), "null");

        let parsed: Measure = serde_json::from_str("null").unwrap();
        assert_eq!(parsed, Measure::NonFinite);
    }

    #[test]
    fn test_api_response() {
        let response: ApiResponse<String> = ApiResponse::ok("test".to_string());
        assert!(response.ok);
        assert_eq!(response.data, Some("test".to_string()));

        let err_response: ApiResponse<String> = ApiResponse::err("error");
        assert!(!err_response.ok);
        assert_eq!(err_response.error, Some("error".to_string()));
    }
}
