//! JSON document writer
//!
//! The wire format is consumed by a static dashboard, so its shape is fixed:
//! numbers are plain JSON numbers, absent summary fields are omitted, and a
//! holding without data carries an empty `metrics` object.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

use super::builder::Report;
use super::chart::{ChartDataset, HistogramEntry};
use super::holding::InstrumentResult;
use super::platform::{DateRange, PlatformReport, PlatformSummary};
use crate::utils::{decimal_to_f64, format_timestamp};

fn num(value: Decimal) -> f64 {
    decimal_to_f64(value)
}

fn opt_num(value: Option<Decimal>) -> Option<f64> {
    value.map(decimal_to_f64)
}

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    currency: &'a str,
    source: JsonSource<'a>,
    platforms: Vec<JsonPlatform<'a>>,
    charts: JsonCharts<'a>,
}

#[derive(Serialize)]
struct JsonSource<'a> {
    provider: &'a str,
    retrieved_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<&'a BTreeMap<String, String>>,
}

#[derive(Serialize)]
struct JsonPlatform<'a> {
    id: &'a str,
    name: &'a str,
    color: &'a str,
    summary: JsonSummary,
    holdings: Vec<JsonHolding<'a>>,
}

#[derive(Serialize)]
struct JsonSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    total_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    avg_monthly_change: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    avg_return_1y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    avg_return_5y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp_range: Option<DateRange>,
}

impl From<&PlatformSummary> for JsonSummary {
    fn from(summary: &PlatformSummary) -> Self {
        Self {
            total_weight: opt_num(summary.total_weight_with_data),
            avg_monthly_change: opt_num(summary.avg_monthly_change),
            avg_return_1y: opt_num(summary.avg_return_1y),
            avg_return_5y: opt_num(summary.avg_return_5y),
            timestamp_range: summary.timestamp_range,
        }
    }
}

/// `{}` for holdings without data, all four keys otherwise
#[derive(Serialize)]
#[serde(untagged)]
enum JsonMetrics {
    Computed {
        return_1y: Option<f64>,
        return_5y: Option<f64>,
        monthly_change_pct: Option<f64>,
        daily_change_pct: Option<f64>,
    },
    Missing {},
}

#[derive(Serialize)]
struct JsonHolding<'a> {
    ticker: &'a str,
    display_name: &'a str,
    platform_id: &'a str,
    weight: f64,
    currency: &'a str,
    latest_price: Option<f64>,
    metrics: JsonMetrics,
    series: JsonSeries,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<JsonStatus<'a>>,
}

#[derive(Serialize)]
struct JsonSeries {
    price_history: Vec<JsonClose>,
    normalized_5y: Vec<JsonValuePoint>,
}

#[derive(Serialize)]
struct JsonClose {
    date: NaiveDate,
    close: f64,
}

#[derive(Serialize)]
struct JsonValuePoint {
    date: NaiveDate,
    value: f64,
}

#[derive(Serialize)]
struct JsonStatus<'a> {
    missing_data: bool,
    warnings: &'a [String],
}

impl<'a> From<&'a InstrumentResult> for JsonHolding<'a> {
    fn from(holding: &'a InstrumentResult) -> Self {
        let metrics = if holding.missing_data {
            JsonMetrics::Missing {}
        } else {
            JsonMetrics::Computed {
                return_1y: opt_num(holding.metrics.return_1y),
                return_5y: opt_num(holding.metrics.return_5y),
                monthly_change_pct: opt_num(holding.metrics.monthly_change_pct),
                daily_change_pct: opt_num(holding.metrics.daily_change_pct),
            }
        };
        let status = (holding.missing_data || !holding.warnings.is_empty()).then(|| JsonStatus {
            missing_data: holding.missing_data,
            warnings: &holding.warnings,
        });

        Self {
            ticker: &holding.ticker,
            display_name: &holding.display_name,
            platform_id: &holding.platform_id,
            weight: num(holding.weight),
            currency: &holding.currency,
            latest_price: opt_num(holding.latest_price),
            metrics,
            series: JsonSeries {
                price_history: holding
                    .price_history
                    .iter()
                    .map(|p| JsonClose {
                        date: p.date,
                        close: num(p.close),
                    })
                    .collect(),
                normalized_5y: holding
                    .normalized_series
                    .iter()
                    .map(|p| JsonValuePoint {
                        date: p.date,
                        value: num(p.value),
                    })
                    .collect(),
            },
            status,
        }
    }
}

impl<'a> From<&'a PlatformReport> for JsonPlatform<'a> {
    fn from(platform: &'a PlatformReport) -> Self {
        Self {
            id: &platform.id,
            name: &platform.name,
            color: &platform.color,
            summary: JsonSummary::from(&platform.summary),
            holdings: platform.holdings.iter().map(JsonHolding::from).collect(),
        }
    }
}

#[derive(Serialize)]
struct JsonCharts<'a> {
    timeseries_5y: JsonTimeSeries<'a>,
    histograms: JsonHistograms<'a>,
}

#[derive(Serialize)]
struct JsonTimeSeries<'a> {
    labels: &'a [NaiveDate],
    datasets: Vec<JsonDataset<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonDataset<'a> {
    id: &'a str,
    label: &'a str,
    #[serde(rename = "platform_id")]
    platform_id: &'a str,
    border_color: &'a str,
    background_color: &'a str,
    data: Vec<Option<f64>>,
    weight: f64,
}

impl<'a> From<&'a ChartDataset> for JsonDataset<'a> {
    fn from(dataset: &'a ChartDataset) -> Self {
        Self {
            id: &dataset.id,
            label: &dataset.label,
            platform_id: &dataset.platform_id,
            border_color: &dataset.border_color,
            background_color: &dataset.background_color,
            data: dataset.data.iter().copied().map(opt_num).collect(),
            weight: num(dataset.weight),
        }
    }
}

#[derive(Serialize)]
struct JsonHistograms<'a> {
    monthly_change: Vec<JsonHistogramEntry<'a>>,
    return_1y: Vec<JsonHistogramEntry<'a>>,
    return_5y: Vec<JsonHistogramEntry<'a>>,
}

#[derive(Serialize)]
struct JsonHistogramEntry<'a> {
    ticker: &'a str,
    platform_id: &'a str,
    label: &'a str,
    weight: f64,
    value: f64,
}

fn histogram(entries: &[HistogramEntry]) -> Vec<JsonHistogramEntry<'_>> {
    entries
        .iter()
        .map(|e| JsonHistogramEntry {
            ticker: &e.ticker,
            platform_id: &e.platform_id,
            label: &e.label,
            weight: num(e.weight),
            value: num(e.value),
        })
        .collect()
}

impl<'a> From<&'a Report> for JsonReport<'a> {
    fn from(report: &'a Report) -> Self {
        Self {
            generated_at: format_timestamp(report.generated_at),
            currency: &report.currency,
            source: JsonSource {
                provider: &report.source.provider,
                retrieved_at: format_timestamp(report.source.retrieved_at),
                notes: report.source.notes.as_ref().filter(|n| !n.is_empty()),
            },
            platforms: report.platforms.iter().map(JsonPlatform::from).collect(),
            charts: JsonCharts {
                timeseries_5y: JsonTimeSeries {
                    labels: &report.timeseries.labels,
                    datasets: report.timeseries.datasets.iter().map(JsonDataset::from).collect(),
                },
                histograms: JsonHistograms {
                    monthly_change: histogram(&report.histograms.monthly_change),
                    return_1y: histogram(&report.histograms.return_1y),
                    return_5y: histogram(&report.histograms.return_5y),
                },
            },
        }
    }
}

impl Report {
    pub fn to_json_value(&self) -> Result<Value> {
        serde_json::to_value(JsonReport::from(self)).context("Failed to serialize report")
    }

    /// Pretty-printed document, terminated by a newline
    pub fn to_json_pretty(&self) -> Result<String> {
        let mut out = serde_json::to_string_pretty(&JsonReport::from(self))
            .context("Failed to serialize report")?;
        out.push('\n');
        Ok(out)
    }
}

/// Write `report` to `path`, creating parent directories as needed
pub fn write_report(report: &Report, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let json = report.to_json_pretty()?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Report written to {}", path.display());
    Ok(())
}
