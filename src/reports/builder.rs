//! Report orchestration
//!
//! Fetches every configured holding, pushes each series through
//! normalization and return calculation, then aggregates per platform and
//! assembles the chart data. A provider failure only ever affects the holding
//! it was fetching.

use anyhow::Error;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use super::chart::{assemble_histograms, assemble_timeseries, Histograms, TimeSeriesChart};
use super::holding::{InstrumentResult, NO_DATA_WARNING};
use super::platform::{summarize_platform, PlatformReport};
use super::series::{clean_series, PricePoint};
use crate::config::{InstrumentConfig, TrackerConfig};
use crate::pricing::{PriceSeriesProvider, RawPricePoint};

/// Where the prices of a report came from
#[derive(Debug, Clone, PartialEq)]
pub struct SourceInfo {
    pub provider: String,
    pub retrieved_at: DateTime<Utc>,
    pub notes: Option<BTreeMap<String, String>>,
}

/// The consolidated report
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub currency: String,
    pub source: SourceInfo,
    pub platforms: Vec<PlatformReport>,
    pub timeseries: TimeSeriesChart,
    pub histograms: Histograms,
}

impl Report {
    pub fn holdings(&self) -> impl Iterator<Item = &InstrumentResult> {
        self.platforms.iter().flat_map(|p| p.holdings.iter())
    }

    pub fn missing_count(&self) -> usize {
        self.holdings().filter(|h| h.missing_data).count()
    }
}

/// What happened when fetching one holding
#[derive(Debug)]
pub enum InstrumentOutcome {
    /// At least one usable point survived normalization
    Success(Vec<PricePoint>),
    /// The provider answered but nothing usable came back
    Empty,
    /// The provider failed
    Failed(Error),
}

impl InstrumentOutcome {
    /// Classify a provider response, normalizing the series on success
    pub fn from_fetch(ticker: &str, fetched: anyhow::Result<Vec<RawPricePoint>>) -> Self {
        match fetched {
            Ok(raw) => {
                let cleaned = clean_series(&raw);
                if cleaned.dropped > 0 {
                    warn!(
                        ticker,
                        dropped = cleaned.dropped,
                        "discarded malformed price points"
                    );
                }
                if cleaned.points.is_empty() {
                    InstrumentOutcome::Empty
                } else {
                    InstrumentOutcome::Success(cleaned.points)
                }
            }
            Err(e) => InstrumentOutcome::Failed(e),
        }
    }

    fn into_result(self, platform_id: &str, holding: &InstrumentConfig) -> InstrumentResult {
        match self {
            InstrumentOutcome::Success(points) => {
                InstrumentResult::with_history(platform_id, holding, points)
            }
            InstrumentOutcome::Empty => {
                InstrumentResult::missing(platform_id, holding, NO_DATA_WARNING)
            }
            InstrumentOutcome::Failed(e) => InstrumentResult::missing(
                platform_id,
                holding,
                format!("Failed to fetch data for {}: {:#}", holding.ticker, e),
            ),
        }
    }
}

/// Progress notification emitted after each holding is fetched
#[derive(Debug, Clone, Copy)]
pub struct FetchProgress<'a> {
    pub platform_id: &'a str,
    pub ticker: &'a str,
    /// Holdings fetched so far, this one included
    pub done: usize,
    pub total: usize,
}

/// Fetch all holdings through `provider` and build the report.
///
/// Never fails: unreachable or empty holdings are reported as missing data.
pub async fn build_report<P, F>(
    config: &TrackerConfig,
    provider: &P,
    generated_at: DateTime<Utc>,
    mut on_progress: F,
) -> Report
where
    P: PriceSeriesProvider,
    F: FnMut(&FetchProgress<'_>),
{
    let total = config.holding_count();
    let mut outcomes = Vec::with_capacity(config.platforms.len());
    let mut done = 0;

    for platform in &config.platforms {
        let mut platform_outcomes = Vec::with_capacity(platform.holdings.len());
        for holding in &platform.holdings {
            debug!(
                platform = %platform.id,
                ticker = %holding.ticker,
                symbol = holding.fetch_symbol(),
                "fetching price history"
            );
            let fetched = provider.fetch_series(holding).await;
            if let Err(e) = &fetched {
                warn!(ticker = %holding.ticker, "price fetch failed: {:#}", e);
            }
            platform_outcomes.push(InstrumentOutcome::from_fetch(&holding.ticker, fetched));

            done += 1;
            on_progress(&FetchProgress {
                platform_id: &platform.id,
                ticker: &holding.ticker,
                done,
                total,
            });
        }
        outcomes.push(platform_outcomes);
    }

    let source = SourceInfo {
        provider: provider.name().to_string(),
        retrieved_at: generated_at,
        notes: provider.notes(&config.platforms),
    };

    let report = assemble_report(config, outcomes, source, generated_at);
    info!(
        platforms = report.platforms.len(),
        holdings = total,
        missing = report.missing_count(),
        "report built"
    );
    report
}

/// Assemble a report from already fetched outcomes.
///
/// `outcomes[i][j]` belongs to holding `j` of platform `i`. Holdings without
/// an outcome are reported as missing.
pub fn assemble_report(
    config: &TrackerConfig,
    outcomes: Vec<Vec<InstrumentOutcome>>,
    source: SourceInfo,
    generated_at: DateTime<Utc>,
) -> Report {
    let mut outcomes = outcomes.into_iter();

    let platforms: Vec<PlatformReport> = config
        .platforms
        .iter()
        .map(|platform| {
            let mut platform_outcomes = outcomes.next().unwrap_or_default().into_iter();
            let holdings: Vec<InstrumentResult> = platform
                .holdings
                .iter()
                .map(|holding| {
                    platform_outcomes
                        .next()
                        .unwrap_or(InstrumentOutcome::Empty)
                        .into_result(&platform.id, holding)
                })
                .collect();

            PlatformReport {
                id: platform.id.clone(),
                name: platform.display_name.clone(),
                color: platform.color.clone(),
                summary: summarize_platform(&holdings),
                holdings,
            }
        })
        .collect();

    Report {
        generated_at,
        currency: config.currency.clone(),
        source,
        timeseries: assemble_timeseries(&platforms),
        histograms: assemble_histograms(&platforms),
        platforms,
    }
}
