//! Platforms command dispatcher implementation

use anyhow::Result;
use portfolio_tracker::config::TrackerConfig;

use crate::cli::formatters;

pub fn dispatch_platforms(config: &TrackerConfig, json_output: bool) -> Result<()> {
    if json_output {
        let payload = formatters::format_platforms_json(config);
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("{}", formatters::format_platforms_table(config));
    }
    Ok(())
}
