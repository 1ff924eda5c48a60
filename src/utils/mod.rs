//! Utility functions for formatting and common conversions
//!
//! This module centralizes the small conversions shared by the report
//! pipeline, the JSON writer and the CLI tables.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Convert a decimal to the closest `f64`, going through its decimal text so
/// that `0.1` stays `0.1` in the emitted JSON.
///
/// # Examples
/// ```
/// use portfolio_tracker::utils::decimal_to_f64;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(decimal_to_f64(dec!(110.25)), 110.25);
/// assert_eq!(decimal_to_f64(dec!(-0.0123)), -0.0123);
/// ```
pub fn decimal_to_f64(value: Decimal) -> f64 {
    value
        .normalize()
        .to_string()
        .parse::<f64>()
        .ok()
        .or_else(|| value.to_f64())
        .unwrap_or_default()
}

/// Convert `#RRGGBB` into a CSS `rgba(r, g, b, alpha)` string.
///
/// # Examples
/// ```
/// use portfolio_tracker::utils::hex_to_rgba;
///
/// assert_eq!(hex_to_rgba("#0B57D0", 0.15).unwrap(), "rgba(11, 87, 208, 0.15)");
/// assert!(hex_to_rgba("#FFF", 0.15).is_err());
/// ```
pub fn hex_to_rgba(hex_color: &str, alpha: f64) -> Result<String> {
    let hex = hex_color.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(anyhow!("Invalid color: {}", hex_color));
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16).map_err(|_| anyhow!("Invalid color: {}", hex_color))
    };
    let (r, g, b) = (channel(0..2)?, channel(2..4)?, channel(4..6)?);
    Ok(format!("rgba({}, {}, {}, {})", r, g, b, alpha))
}

/// ISO-8601 timestamp with second precision and a `Z` suffix
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Format a fractional return as a signed percentage: `0.1234` -> `+12.34%`.
/// Missing values render as a dash.
///
/// # Examples
/// ```
/// use portfolio_tracker::utils::format_percent;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_percent(Some(dec!(0.1234))), "+12.34%");
/// assert_eq!(format_percent(Some(dec!(-0.05))), "-5.00%");
/// assert_eq!(format_percent(None), "—");
/// ```
pub fn format_percent(value: Option<Decimal>) -> String {
    match value.and_then(|v| v.checked_mul(Decimal::ONE_HUNDRED)) {
        Some(pct) => {
            let pct = pct.round_dp(2);
            if pct >= Decimal::ZERO {
                format!("+{:.2}%", pct)
            } else {
                format!("{:.2}%", pct)
            }
        }
        None => "—".to_string(),
    }
}
