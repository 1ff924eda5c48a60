//! Output formatting module for CLI display
//!
//! This module handles all terminal output formatting, separating
//! the concerns of report building from presentation.

use colored::Colorize;
use portfolio_tracker::config::TrackerConfig;
use portfolio_tracker::reports::Report;
use portfolio_tracker::utils::{format_percent, format_timestamp};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tabled::{
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

fn colored_percent(value: Option<Decimal>) -> String {
    let text = format_percent(value);
    match value {
        Some(v) if v >= Decimal::ZERO => text.green().to_string(),
        Some(_) => text.red().to_string(),
        None => text.bright_black().to_string(),
    }
}

/// Format a built report as one table per platform
pub fn format_report_table(report: &Report, destination: &str) -> String {
    #[derive(Tabled)]
    struct HoldingRow {
        #[tabled(rename = "Ticker")]
        ticker: String,
        #[tabled(rename = "Weight")]
        weight: String,
        #[tabled(rename = "Last")]
        latest: String,
        #[tabled(rename = "1D")]
        daily: String,
        #[tabled(rename = "1M")]
        monthly: String,
        #[tabled(rename = "1Y")]
        one_year: String,
        #[tabled(rename = "5Y")]
        five_years: String,
    }

    let mut output = String::new();
    output.push_str(&format!(
        "\n{} Portfolio report ({}, {})\n",
        "📊".cyan().bold(),
        report.source.provider,
        format_timestamp(report.generated_at)
    ));

    for platform in &report.platforms {
        output.push_str(&format!("\n{}\n", platform.name.bold()));

        let rows: Vec<HoldingRow> = platform
            .holdings
            .iter()
            .map(|h| HoldingRow {
                ticker: if h.missing_data {
                    format!("{} (no data)", h.ticker).yellow().to_string()
                } else {
                    h.ticker.clone()
                },
                weight: format!("{:.2}%", h.weight * Decimal::from(100)),
                latest: h
                    .latest_price
                    .map(|p| format!("{:.2} {}", p, h.currency))
                    .unwrap_or_else(|| "N/A".to_string()),
                daily: colored_percent(h.metrics.daily_change_pct),
                monthly: colored_percent(h.metrics.monthly_change_pct),
                one_year: colored_percent(h.metrics.return_1y),
                five_years: colored_percent(h.metrics.return_5y),
            })
            .collect();

        let mut table = Table::new(&rows);
        table.with(Style::modern());
        // Right-align everything but the ticker
        table.modify(Columns::new(1..), Alignment::right());
        output.push_str(&table.to_string());

        let summary = &platform.summary;
        output.push_str(&format!(
            "\n{:<14} 1M {}  1Y {}  5Y {}",
            "Weighted avg:".bold(),
            colored_percent(summary.avg_monthly_change),
            colored_percent(summary.avg_return_1y),
            colored_percent(summary.avg_return_5y),
        ));
        if let Some(range) = summary.timestamp_range {
            output.push_str(&format!("\n{:<14} {} → {}", "Data range:".bold(), range.start, range.end));
        }
        output.push('\n');
    }

    let missing = report.missing_count();
    if missing > 0 {
        output.push_str(&format!(
            "\n{} {} holding(s) without data\n",
            "⚠".yellow().bold(),
            missing
        ));
    }
    output.push_str(&format!("\n{} Report written to {}\n", "✓".green().bold(), destination));
    output
}

/// Compact machine-readable outcome of a fetch
pub fn format_report_json(report: &Report, destination: &str) -> Value {
    json!({
        "output": destination,
        "provider": report.source.provider,
        "generated_at": format_timestamp(report.generated_at),
        "platforms": report.platforms.len(),
        "holdings": report.holdings().count(),
        "missing": report.missing_count(),
    })
}

/// List configured platforms and their holdings
pub fn format_platforms_table(config: &TrackerConfig) -> String {
    #[derive(Tabled)]
    struct PlatformRow {
        #[tabled(rename = "Platform")]
        platform: String,
        #[tabled(rename = "Ticker")]
        ticker: String,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Currency")]
        currency: String,
        #[tabled(rename = "Weight")]
        weight: String,
    }

    let rows: Vec<PlatformRow> = config
        .platforms
        .iter()
        .flat_map(|p| {
            p.holdings.iter().map(move |h| PlatformRow {
                platform: p.id.clone(),
                ticker: h.ticker.clone(),
                name: h.display_name.clone(),
                currency: h.currency.clone(),
                weight: format!("{:.2}%", h.weight * Decimal::from(100)),
            })
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    table.modify(Columns::new(4..), Alignment::right());

    format!(
        "\n{} {} platform(s), {} holding(s)\n\n{}\n",
        "ℹ".blue().bold(),
        config.platforms.len(),
        config.holding_count(),
        table
    )
}

pub fn format_platforms_json(config: &TrackerConfig) -> Value {
    json!({
        "currency": config.currency,
        "platforms": config.platforms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_platforms_table_lists_every_holding() {
        colored::control::set_override(false);
        let config = TrackerConfig::embedded().unwrap();
        let table = format_platforms_table(&config);
        assert!(table.contains("2 platform(s), 14 holding(s)"));
        assert!(table.contains("QQQM"));
        assert!(table.contains("racional"));
    }

    #[test]
    fn test_platforms_json_round_trips_config() {
        let config = TrackerConfig::embedded().unwrap();
        let value = format_platforms_json(&config);
        assert_eq!(value["platforms"].as_array().unwrap().len(), 2);
        assert_eq!(value["platforms"][1]["id"], "fintual");
    }

    #[test]
    fn test_colored_percent_without_color() {
        colored::control::set_override(false);
        assert_eq!(colored_percent(Some(dec!(0.1))), "+10.00%");
        assert_eq!(colored_percent(Some(dec!(-0.1))), "-10.00%");
        assert_eq!(colored_percent(None), "—");
    }
}
