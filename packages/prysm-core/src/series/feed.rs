//! HTTP client for the historical end-of-day price feed.

use crate::types::PricePoint;
use reqwest::{Client, RequestBuilder, StatusCode};

/// Default feed host.
pub const DEFAULT_FEED_URL: &str = "https://financialmodelingprep.com";

const HISTORICAL_PATH: &str = "/stable/historical-price-eod/non-split-adjusted";

/// Failure to obtain a usable feed.
///
/// An empty array is an error here: "no data for this symbol" is reported
/// the same way as a transport failure. A feed that parses but has nothing
/// inside the selected window is not an error (see `ChartState::Empty`).
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Transport failure. The request URL is stripped since it carries the key.
    #[error("Network error: {0}")]
    Network(reqwest::Error),

    #[error("Feed returned {0}")]
    Status(StatusCode),

    #[error("Malformed feed: {0}")]
    Malformed(String),

    #[error("No data available for {0}")]
    NoData(String),
}

/// Client for the historical price feed.
#[derive(Debug, Clone)]
pub struct FeedClient {
    base_url: String,
    client: Client,
}

impl FeedClient {
    /// Create a client for the given base URL.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Historical endpoint, without query parameters.
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, HISTORICAL_PATH)
    }

    fn request(&self, symbol: &str, api_key: &str) -> RequestBuilder {
        self.client
            .get(self.endpoint())
            .query(&[("symbol", symbol), ("apikey", api_key)])
    }

    /// Fetch the raw feed for `symbol`, newest first.
    pub async fn fetch_raw_feed(
        &self,
        symbol: &str,
        api_key: &str,
    ) -> Result<Vec<PricePoint>, FetchError> {
        let symbol = symbol.trim().to_uppercase();
        tracing::debug!(%symbol, base_url = %self.base_url, "Fetching historical prices");

        let response = self
            .request(&symbol, api_key)
            .send()
            .await
            .map_err(network)?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let body = response.text().await.map_err(network)?;
        let points = parse_feed(&symbol, &body)?;
        tracing::debug!(%symbol, points = points.len(), "Historical prices received");
        Ok(points)
    }
}

impl Default for FeedClient {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_URL)
    }
}

fn network(err: reqwest::Error) -> FetchError {
    FetchError::Network(err.without_url())
}

/// Parse a feed body. The body must be a non-empty JSON array of bars.
pub fn parse_feed(symbol: &str, body: &str) -> Result<Vec<PricePoint>, FetchError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;

    if !value.is_array() {
        return Err(FetchError::Malformed("expected a JSON array".to_string()));
    }

    let points: Vec<PricePoint> =
        serde_json::from_value(value).map_err(|e| FetchError::Malformed(e.to_string()))?;

    if points.is_empty() {
        return Err(FetchError::NoData(symbol.to_string()));
    }

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const BODY: &str = r#"[
        {"symbol":"AAPL","date":"2025-06-13","adjOpen":199.73,"adjHigh":200.37,"adjLow":195.7,"adjClose":196.45,"volume":51447349},
        {"symbol":"AAPL","date":"2025-06-12","adjOpen":199.08,"adjHigh":199.68,"adjLow":197.36,"adjClose":199.2,"volume":43904635}
    ]"#;

    #[test]
    fn test_parse_feed() {
        let points = parse_feed("AAPL", BODY).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].close, 196.45);
        assert!(points[0].date > points[1].date);
    }

    #[test]
    fn test_parse_empty_array_is_no_data() {
        let result = parse_feed("ZZZZ", "[]");
        assert!(matches!(result, Err(FetchError::NoData(s)) if s == "ZZZZ"));
    }

    #[test]
    fn test_parse_non_array_is_malformed() {
        let body = r#"{"Error Message":"Invalid API KEY."}"#;
        assert!(matches!(
            parse_feed("AAPL", body),
            Err(FetchError::Malformed(_))
        ));
        assert!(matches!(
            parse_feed("AAPL", "not json"),
            Err(FetchError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_bad_record_is_malformed() {
        let body = r#"[{"symbol":"AAPL","date":"2025-06-13"}]"#;
        assert!(matches!(
            parse_feed("AAPL", body),
            Err(FetchError::Malformed(_))
        ));
    }

    #[test]
    fn test_endpoint() {
        let client = FeedClient::new("https://example.test/");
        assert_eq!(client.base_url(), "https://example.test");
        assert_eq!(
            client.endpoint(),
            "https://example.test/stable/historical-price-eod/non-split-adjusted"
        );
    }

    #[test]
    fn test_query_is_encoded() {
        let client = FeedClient::new("https://example.test");
        let request = client.request("M&M", "k3y=/+").build().unwrap();
        let pairs: Vec<(String, String)> = request
            .url()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("symbol".to_string(), "M&M".to_string()),
                ("apikey".to_string(), "k3y=/+".to_string()),
            ]
        );
        assert_eq!(
            request.url().path(),
            "/stable/historical-price-eod/non-split-adjusted"
        );
    }

    #[test]
    fn test_status_error_message() {
        let err = FetchError::Status(StatusCode::UNAUTHORIZED);
        assert_eq!(err.to_string(), "Feed returned 401 Unauthorized");
    }

    /// Serve one canned HTTP response and hand back the raw request.
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let mut read = 0;
            while !buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf[read..]).await.unwrap();
                if n == 0 {
                    break;
                }
                read += n;
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&buf[..read]).into_owned()
        });

        (format!("http://{}", addr), handle)
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let (url, server) = serve_once("200 OK", BODY).await;
        let points = FeedClient::new(&url)
            .fetch_raw_feed(" aapl ", "k3y")
            .await
            .unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].close, 199.2);

        let request = server.await.unwrap();
        assert!(request.starts_with(
            "GET /stable/historical-price-eod/non-split-adjusted?symbol=AAPL&apikey=k3y "
        ));
    }

    #[tokio::test]
    async fn test_fetch_encodes_symbol() {
        let (url, server) = serve_once("200 OK", BODY).await;
        FeedClient::new(&url)
            .fetch_raw_feed("M&M", "k3y")
            .await
            .unwrap();

        let request = server.await.unwrap();
        assert!(request.contains("symbol=M%26M&apikey=k3y"));
    }

    #[tokio::test]
    async fn test_fetch_unauthorized_is_status_error() {
        let body = r#"{"Error Message":"Invalid API KEY."}"#;
        let (url, _server) = serve_once("401 Unauthorized", body).await;
        let result = FeedClient::new(&url).fetch_raw_feed("AAPL", "bad").await;
        assert!(matches!(
            result,
            Err(FetchError::Status(StatusCode::UNAUTHORIZED))
        ));
    }

    #[tokio::test]
    async fn test_fetch_object_body_is_malformed() {
        let body = r#"{"Error Message":"Limit reached"}"#;
        let (url, _server) = serve_once("200 OK", body).await;
        let result = FeedClient::new(&url).fetch_raw_feed("AAPL", "k3y").await;
        assert!(matches!(result, Err(FetchError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_network_error_hides_api_key() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let err = FeedClient::new(&url)
            .fetch_raw_feed("AAPL", "SECRETKEY123")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
        assert!(!err.to_string().contains("SECRETKEY123"));
        assert!(!format!("{:?}", err).contains("SECRETKEY123"));
    }
}
