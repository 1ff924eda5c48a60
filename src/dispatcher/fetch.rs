//! Fetch command dispatcher implementation

use anyhow::Result;
use chrono::{SubsecRound, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use portfolio_tracker::config::TrackerConfig;
use portfolio_tracker::pricing::{PriceSeriesProvider, SampleProvider, YahooProvider};
use portfolio_tracker::reports::{self, Report};
use std::path::Path;
use tracing::info;

use crate::cli::formatters;

/// Output value meaning "write the report to stdout"
const STDOUT_OUTPUT: &str = "-";

fn progress_bar(total: usize, visible: bool) -> Result<ProgressBar> {
    if !visible {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

async fn run_pipeline<P: PriceSeriesProvider>(
    config: &TrackerConfig,
    provider: &P,
    pb: &ProgressBar,
) -> Report {
    info!("Fetching {} holdings with {}", config.holding_count(), provider.name());
    let generated_at = Utc::now().trunc_subsecs(0);
    reports::build_report(config, provider, generated_at, |progress| {
        pb.set_message(format!("{} ({})", progress.ticker, progress.platform_id));
        pb.set_position(progress.done as u64);
    })
    .await
}

pub async fn dispatch_fetch(
    config: &TrackerConfig,
    offline: bool,
    output: &str,
    json_output: bool,
) -> Result<()> {
    let to_stdout = output == STDOUT_OUTPUT;
    let pb = progress_bar(config.holding_count(), !json_output && !to_stdout)?;

    let report = if offline {
        run_pipeline(config, &SampleProvider::new(), &pb).await
    } else {
        let provider = YahooProvider::new()?;
        run_pipeline(config, &provider, &pb).await
    };
    pb.finish_and_clear();

    if to_stdout {
        print!("{}", report.to_json_pretty()?);
        return Ok(());
    }

    reports::write_report(&report, Path::new(output))?;

    if json_output {
        let payload = formatters::format_report_json(&report, output);
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("{}", formatters::format_report_table(&report, output));
    }
    Ok(())
}
