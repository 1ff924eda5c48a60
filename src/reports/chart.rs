//! Chart datasets aligned across heterogeneous trading calendars
//!
//! Holdings trade on different calendars (Santiago vs. New York holidays), so
//! the time axis is the sorted union of every date seen, and each dataset
//! carries an explicit gap (`None`) wherever its holding has no point.

use chrono::NaiveDate;
use itertools::Itertools;
use rust_decimal::Decimal;
use tracing::warn;

use super::holding::InstrumentResult;
use super::platform::PlatformReport;
use super::series::NormalizedPoint;
use crate::utils::hex_to_rgba;

const BACKGROUND_ALPHA: f64 = 0.15;

#[derive(Debug, Clone, PartialEq)]
pub struct ChartDataset {
    pub id: String,
    pub label: String,
    pub platform_id: String,
    pub border_color: String,
    pub background_color: String,
    /// One entry per label; `None` where the holding has no point
    pub data: Vec<Option<Decimal>>,
    pub weight: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeriesChart {
    pub labels: Vec<NaiveDate>,
    pub datasets: Vec<ChartDataset>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramEntry {
    pub ticker: String,
    pub platform_id: String,
    pub label: String,
    pub weight: Decimal,
    pub value: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Histograms {
    pub monthly_change: Vec<HistogramEntry>,
    pub return_1y: Vec<HistogramEntry>,
    pub return_5y: Vec<HistogramEntry>,
}

/// Sorted union of the dates of every (individually sorted) series
pub fn union_labels<'a, I>(series: I) -> Vec<NaiveDate>
where
    I: IntoIterator<Item = &'a [NormalizedPoint]>,
{
    series
        .into_iter()
        .map(|s| s.iter().map(|p| p.date))
        .kmerge()
        .dedup()
        .collect()
}

/// Lay `series` over `labels`, leaving `None` on dates the series lacks.
///
/// Both inputs must be sorted ascending and `labels` must contain every date
/// of `series`.
pub fn align_to_labels(labels: &[NaiveDate], series: &[NormalizedPoint]) -> Vec<Option<Decimal>> {
    let mut points = series.iter().peekable();
    labels
        .iter()
        .map(|label| points.next_if(|p| p.date == *label).map(|p| p.value))
        .collect()
}

/// Build the aligned time-series chart over every holding that has data
pub fn assemble_timeseries(platforms: &[PlatformReport]) -> TimeSeriesChart {
    let with_data = || {
        platforms.iter().flat_map(|platform| {
            platform
                .holdings
                .iter()
                .filter(|h| !h.missing_data)
                .map(move |h| (platform, h))
        })
    };

    let labels = union_labels(with_data().map(|(_, h)| h.normalized_series.as_slice()));

    let datasets = with_data()
        .map(|(platform, holding)| ChartDataset {
            id: holding.ticker.clone(),
            label: format!("{} · {}", holding.ticker, platform.name),
            platform_id: platform.id.clone(),
            border_color: platform.color.clone(),
            background_color: background_for(&platform.color),
            data: align_to_labels(&labels, &holding.normalized_series),
            weight: holding.weight,
        })
        .collect();

    TimeSeriesChart { labels, datasets }
}

fn background_for(color: &str) -> String {
    hex_to_rgba(color, BACKGROUND_ALPHA).unwrap_or_else(|e| {
        warn!("{}; using border color as background", e);
        color.to_string()
    })
}

/// One entry per holding per metric, only where the metric is defined
pub fn assemble_histograms(platforms: &[PlatformReport]) -> Histograms {
    let mut histograms = Histograms::default();
    let holdings = platforms.iter().flat_map(|p| p.holdings.iter());

    for holding in holdings {
        let metrics = &holding.metrics;
        let buckets = [
            (&mut histograms.monthly_change, metrics.monthly_change_pct),
            (&mut histograms.return_1y, metrics.return_1y),
            (&mut histograms.return_5y, metrics.return_5y),
        ];
        for (bucket, value) in buckets {
            if let Some(value) = value {
                bucket.push(histogram_entry(holding, value));
            }
        }
    }

    histograms
}

fn histogram_entry(holding: &InstrumentResult, value: Decimal) -> HistogramEntry {
    HistogramEntry {
        ticker: holding.ticker.clone(),
        platform_id: holding.platform_id.clone(),
        label: holding.ticker.clone(),
        weight: holding.weight,
        value,
    }
}
