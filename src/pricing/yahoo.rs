use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info};

use super::{PriceSeriesProvider, RawPricePoint};
use crate::config::{InstrumentConfig, PlatformConfig};
use crate::error::TrackerError;
use crate::utils::decimal_to_f64;

const CHART_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Yahoo Finance chart response
#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: ChartData,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    result: Option<Vec<ChartResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
    adjclose: Option<Vec<AdjClose>>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    close: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    adjclose: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

/// Daily closes over the last five years from the Yahoo Finance chart API
pub struct YahooProvider {
    client: Client,
    base_url: String,
}

impl YahooProvider {
    pub fn new() -> Result<Self> {
        Self::with_base_url(CHART_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (compatible; PortfolioTracker/1.0)")
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

impl PriceSeriesProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    /// Tickers whose provider symbol differs from the displayed ticker
    fn notes(&self, platforms: &[PlatformConfig]) -> Option<BTreeMap<String, String>> {
        let notes: BTreeMap<String, String> = platforms
            .iter()
            .flat_map(|p| p.holdings.iter())
            .filter(|h| h.fetch_symbol() != h.ticker)
            .map(|h| (h.ticker.clone(), h.fetch_symbol().to_string()))
            .collect();
        (!notes.is_empty()).then_some(notes)
    }

    async fn fetch_series(&self, holding: &InstrumentConfig) -> Result<Vec<RawPricePoint>> {
        let symbol = holding.fetch_symbol();
        info!("Fetching 5y daily history for {} from Yahoo Finance", symbol);

        let url = format!("{}/{}?range=5y&interval=1d", self.base_url, symbol);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send request to Yahoo Finance")?;

        if !response.status().is_success() {
            return Err(TrackerError::Provider(format!(
                "Yahoo Finance returned error status: {}",
                response.status()
            ))
            .into());
        }

        let data: YahooChartResponse = response
            .json()
            .await
            .context("Failed to parse Yahoo Finance response")?;

        let points = chart_to_points(data)?;
        debug!("Fetched {} daily closes for {}", points.len(), symbol);
        Ok(points)
    }
}

/// Flatten a chart payload into raw points, preferring adjusted closes
fn chart_to_points(data: YahooChartResponse) -> Result<Vec<RawPricePoint>> {
    if let Some(error) = data.chart.error {
        return Err(TrackerError::Provider(format!(
            "Yahoo Finance API error: {} - {}",
            error.code, error.description
        ))
        .into());
    }

    let result = data
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| anyhow!("No data returned from Yahoo Finance"))?;

    // A symbol with no trading history comes back without timestamps
    let Some(timestamps) = result.timestamp else {
        return Ok(Vec::new());
    };

    let adjusted = result
        .indicators
        .adjclose
        .and_then(|a| a.into_iter().next())
        .and_then(|a| a.adjclose);
    let closes = match adjusted {
        Some(values) => values,
        None => result
            .indicators
            .quote
            .into_iter()
            .next()
            .and_then(|q| q.close)
            .ok_or_else(|| anyhow!("No close prices"))?,
    };

    let points = timestamps
        .iter()
        .enumerate()
        .filter_map(|(i, &timestamp)| {
            let date = chrono::DateTime::from_timestamp(timestamp, 0)?.date_naive();
            let close = closes.get(i).copied().flatten().map(round_close);
            Some(RawPricePoint {
                date: date.format("%Y-%m-%d").to_string(),
                close,
            })
        })
        .collect();

    Ok(points)
}

/// Closes are kept with four decimals; non-finite values pass through for the normalizer to drop
fn round_close(value: f64) -> f64 {
    Decimal::from_f64(value)
        .map(|d| decimal_to_f64(d.round_dp(4)))
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn should_skip_online_tests() -> bool {
        std::env::var("TRACKER_SKIP_ONLINE_TESTS")
            .map(|v| v != "0")
            .unwrap_or(false)
    }

    fn parse(raw: &str) -> YahooChartResponse {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn test_chart_prefers_adjusted_close() {
        let data = parse(
            r#"{"chart":{"result":[{"timestamp":[1704205800,1704292200],
            "indicators":{"quote":[{"close":[10.0,11.0]}],
            "adjclose":[{"adjclose":[9.512345,null]}]}}],"error":null}}"#,
        );
        let points = chart_to_points(data).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, "2024-01-02");
        assert_eq!(points[0].close, Some(9.5123));
        assert_eq!(points[1].close, None);
    }

    #[test]
    fn test_chart_falls_back_to_close() {
        let data = parse(
            r#"{"chart":{"result":[{"timestamp":[1704205800],
            "indicators":{"quote":[{"close":[10.25]}]}}],"error":null}}"#,
        );
        let points = chart_to_points(data).unwrap();
        assert_eq!(points, vec![RawPricePoint::new("2024-01-02", 10.25)]);
    }

    #[test]
    fn test_chart_without_timestamps_is_empty() {
        let data = parse(
            r#"{"chart":{"result":[{"indicators":{"quote":[{}]}}],"error":null}}"#,
        );
        assert!(chart_to_points(data).unwrap().is_empty());
    }

    #[test]
    fn test_chart_error_is_reported() {
        let data = parse(
            r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#,
        );
        let err = chart_to_points(data).unwrap_err();
        assert!(err.to_string().contains("Not Found"));
    }

    #[test]
    fn test_notes_list_only_remapped_symbols() {
        let config = crate::config::TrackerConfig::from_toml_str(
            r##"
[[platforms]]
id = "p"
display_name = "P"
color = "#000000"

[[platforms.holdings]]
ticker = "AAA"
weight = 0.5
display_name = "A"
currency = "USD"

[[platforms.holdings]]
ticker = "BBB"
weight = 0.5
display_name = "B"
currency = "USD"
fetch_symbol = "BBB.L"
"##,
        )
        .unwrap();
        let provider = YahooProvider::new().unwrap();
        let notes = provider.notes(&config.platforms).unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes["BBB"], "BBB.L");
    }

    #[tokio::test]
    async fn test_fetch_series_online() {
        if should_skip_online_tests() {
            return;
        }

        let provider = YahooProvider::new().unwrap();
        let holding = InstrumentConfig {
            ticker: "VGK".to_string(),
            weight: Decimal::ONE,
            display_name: "Vanguard FTSE Europe ETF".to_string(),
            currency: "USD".to_string(),
            fetch_symbol: None,
            sample: None,
        };

        let result = provider.fetch_series(&holding).await;
        if let Err(e) = &result {
            eprintln!("Skipping Yahoo history test: {}", e);
            return;
        }
        let points = result.unwrap();
        assert!(!points.is_empty());
        println!("Fetched {} daily closes", points.len());
    }
}
