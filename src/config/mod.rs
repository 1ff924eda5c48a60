//! Platform configuration
//!
//! Platforms and their weighted holdings are static data loaded once at
//! startup, either from the embedded `config/platforms.toml` or from a user
//! supplied TOML file. Every structural invariant (unique ids and tickers,
//! weights in (0, 1], `#RRGGBB` colors) is checked here so the report pipeline
//! never sees an invalid table.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::TrackerError;

/// Platform table shipped with the binary
const DEFAULT_PLATFORMS_TOML: &str = include_str!("../../config/platforms.toml");

/// Environment variable pointing at an alternative platforms file
pub const CONFIG_ENV_VAR: &str = "TRACKER_CONFIG";

static HEX_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("valid color regex"));

fn default_currency() -> String {
    "USD".to_string()
}

/// Deterministic price behavior used by the offline sample provider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleBehavior {
    pub base_price: f64,
    pub annual_return: f64,
    pub volatility: f64,
}

impl Default for SampleBehavior {
    fn default() -> Self {
        Self {
            base_price: 100.0,
            annual_return: 0.07,
            volatility: 0.03,
        }
    }
}

/// A single weighted holding of a platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentConfig {
    pub ticker: String,
    pub weight: Decimal,
    pub display_name: String,
    pub currency: String,
    /// Symbol sent to the price provider (defaults to `ticker`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample: Option<SampleBehavior>,
}

impl InstrumentConfig {
    pub fn fetch_symbol(&self) -> &str {
        self.fetch_symbol.as_deref().unwrap_or(&self.ticker)
    }

    pub fn sample_behavior(&self) -> SampleBehavior {
        self.sample.unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformConfig {
    pub id: String,
    pub display_name: String,
    pub color: String,
    #[serde(default)]
    pub holdings: Vec<InstrumentConfig>,
}

impl PlatformConfig {
    pub fn total_weight(&self) -> Decimal {
        self.holdings.iter().map(|h| h.weight).sum()
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Currency label written at the top of the report
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub platforms: Vec<PlatformConfig>,
}

impl TrackerConfig {
    /// Load configuration from `path`, or from the embedded default table
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => {
                debug!("Loading platform config from {}", p.display());
                let raw = std::fs::read_to_string(p)
                    .with_context(|| format!("Failed to read config file {}", p.display()))?;
                Self::from_toml_str(&raw)
                    .with_context(|| format!("Invalid config file {}", p.display()))
            }
            None => {
                debug!("Loading embedded platform config");
                Self::from_toml_str(DEFAULT_PLATFORMS_TOML).context("Invalid embedded config")
            }
        }
    }

    /// Embedded default configuration
    pub fn embedded() -> Result<Self> {
        Self::load(None)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: TrackerConfig =
            toml::from_str(raw).map_err(|e| TrackerError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject tables that violate a static invariant
    pub fn validate(&self) -> std::result::Result<(), TrackerError> {
        if self.currency.trim().is_empty() {
            return Err(TrackerError::Config("currency must not be empty".into()));
        }

        let mut platform_ids = HashSet::new();
        for platform in &self.platforms {
            validate_platform(platform)?;
            if !platform_ids.insert(platform.id.as_str()) {
                return Err(TrackerError::Config(format!(
                    "duplicate platform id '{}'",
                    platform.id
                )));
            }
        }
        Ok(())
    }

    pub fn holding_count(&self) -> usize {
        self.platforms.iter().map(|p| p.holdings.len()).sum()
    }
}

fn validate_platform(platform: &PlatformConfig) -> std::result::Result<(), TrackerError> {
    if platform.id.trim().is_empty() {
        return Err(TrackerError::Config("platform id must not be empty".into()));
    }
    if platform.display_name.trim().is_empty() {
        return Err(TrackerError::Config(format!(
            "platform '{}': display_name must not be empty",
            platform.id
        )));
    }
    if !HEX_COLOR.is_match(&platform.color) {
        return Err(TrackerError::Config(format!(
            "platform '{}': color '{}' is not #RRGGBB",
            platform.id, platform.color
        )));
    }

    let mut tickers = HashSet::new();
    for holding in &platform.holdings {
        if holding.ticker.trim().is_empty() {
            return Err(TrackerError::Config(format!(
                "platform '{}': holding with empty ticker",
                platform.id
            )));
        }
        if holding.display_name.trim().is_empty() {
            return Err(TrackerError::Config(format!(
                "platform '{}': {} has an empty display_name",
                platform.id, holding.ticker
            )));
        }
        if holding.weight <= Decimal::ZERO || holding.weight > Decimal::ONE {
            return Err(TrackerError::Config(format!(
                "platform '{}': {} weight {} outside (0, 1]",
                platform.id, holding.ticker, holding.weight
            )));
        }
        if !tickers.insert(holding.ticker.as_str()) {
            return Err(TrackerError::Config(format!(
                "platform '{}': duplicate ticker '{}'",
                platform.id, holding.ticker
            )));
        }
    }

    let total = platform.total_weight();
    if !platform.holdings.is_empty() && (total - Decimal::ONE).abs() > Decimal::new(1, 2) {
        warn!(
            platform = %platform.id,
            total_weight = %total,
            "platform weights do not add up to 1"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const MINIMAL: &str = r##"
[[platforms]]
id = "alpha"
display_name = "Alpha"
color = "#112233"

[[platforms.holdings]]
ticker = "AAA"
weight = 0.6
display_name = "Triple A"
currency = "USD"

[[platforms.holdings]]
ticker = "BBB"
weight = 0.4
display_name = "Triple B"
currency = "USD"
fetch_symbol = "BBB.X"
"##;

    #[test]
    fn test_embedded_config_loads() {
        let config = TrackerConfig::embedded().unwrap();
        assert_eq!(config.currency, "USD");
        let ids: Vec<_> = config.platforms.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["racional", "fintual"]);
        assert_eq!(config.holding_count(), 14);

        let racional = &config.platforms[0];
        assert_eq!(racional.holdings[1].ticker, "IYWCL.SN");
        assert_eq!(racional.holdings[1].weight, dec!(0.35));
        assert_eq!(racional.total_weight(), dec!(1.00));
    }

    #[test]
    fn test_minimal_config_defaults() {
        let config = TrackerConfig::from_toml_str(MINIMAL).unwrap();
        assert_eq!(config.currency, "USD");
        let holdings = &config.platforms[0].holdings;
        assert_eq!(holdings[0].fetch_symbol(), "AAA");
        assert_eq!(holdings[1].fetch_symbol(), "BBB.X");
        assert_eq!(holdings[0].sample_behavior(), SampleBehavior::default());
    }

    #[test]
    fn test_duplicate_ticker_rejected() {
        let raw = MINIMAL.replace("\"BBB\"", "\"AAA\"");
        let err = TrackerConfig::from_toml_str(&raw).unwrap_err();
        assert!(format!("{:#}", err).contains("duplicate ticker 'AAA'"));
    }

    #[test]
    fn test_non_positive_weight_rejected() {
        let raw = MINIMAL.replace("weight = 0.4", "weight = 0.0");
        let err = TrackerConfig::from_toml_str(&raw).unwrap_err();
        assert!(format!("{:#}", err).contains("outside (0, 1]"));

        let raw = MINIMAL.replace("weight = 0.4", "weight = 1.5");
        assert!(TrackerConfig::from_toml_str(&raw).is_err());
    }

    #[test]
    fn test_bad_color_rejected() {
        let raw = MINIMAL.replace("#112233", "blue");
        let err = TrackerConfig::from_toml_str(&raw).unwrap_err();
        assert!(format!("{:#}", err).contains("not #RRGGBB"));
    }

    #[test]
    fn test_duplicate_platform_rejected() {
        let raw = format!("{}\n{}", MINIMAL, MINIMAL);
        let err = TrackerConfig::from_toml_str(&raw).unwrap_err();
        assert!(format!("{:#}", err).contains("duplicate platform id 'alpha'"));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = TrackerConfig::from_toml_str("[[platforms]\nid = ").unwrap_err();
        assert!(err.to_string().starts_with("parse error"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("platforms.toml");
        std::fs::write(&path, MINIMAL).unwrap();
        let config = TrackerConfig::load(Some(&path)).unwrap();
        assert_eq!(config.platforms[0].display_name, "Alpha");

        let missing = dir.path().join("nope.toml");
        assert!(TrackerConfig::load(Some(&missing)).is_err());
    }
}
