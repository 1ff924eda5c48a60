//! Deterministic offline price series
//!
//! Produces five years of daily closes per holding from its configured
//! [`SampleBehavior`]: a compounding trend modulated by a 180-day seasonal
//! wave. Useful for demos and for exercising the pipeline without network.

use anyhow::Result;
use chrono::{Days, NaiveDate, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::f64::consts::PI;

use super::{PriceSeriesProvider, RawPricePoint};
use crate::config::{InstrumentConfig, PlatformConfig, SampleBehavior};
use crate::utils::decimal_to_f64;

const TOTAL_DAYS: u64 = 5 * 365;
const SEASONAL_SCALE: f64 = 0.6;
const SEASONAL_PERIOD_DAYS: f64 = 180.0;
const MIN_PRICE: f64 = 0.01;

pub struct SampleProvider {
    end_date: NaiveDate,
}

impl SampleProvider {
    /// Series ending today (UTC)
    pub fn new() -> Self {
        Self::ending_on(Utc::now().date_naive())
    }

    pub fn ending_on(end_date: NaiveDate) -> Self {
        Self { end_date }
    }

    pub fn generate(&self, behavior: &SampleBehavior) -> Vec<RawPricePoint> {
        let start_date = self
            .end_date
            .checked_sub_days(Days::new(TOTAL_DAYS - 1))
            .unwrap_or(self.end_date);
        let daily_growth = (1.0 + behavior.annual_return).powf(1.0 / 365.0);

        (0..TOTAL_DAYS)
            .filter_map(|idx| {
                let date = start_date.checked_add_days(Days::new(idx))?;
                let t = idx as f64;
                let trend = behavior.base_price * daily_growth.powf(t);
                let seasonal = 1.0
                    + SEASONAL_SCALE
                        * behavior.volatility
                        * (2.0 * PI * t / SEASONAL_PERIOD_DAYS).sin();
                let price = (trend * seasonal).max(MIN_PRICE);
                let close = Decimal::from_f64(price)
                    .map(|d| decimal_to_f64(d.round_dp(2)))
                    .unwrap_or(price);
                Some(RawPricePoint::new(date.format("%Y-%m-%d").to_string(), close))
            })
            .collect()
    }
}

impl Default for SampleProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceSeriesProvider for SampleProvider {
    fn name(&self) -> &str {
        "offline_sample"
    }

    fn notes(&self, _platforms: &[PlatformConfig]) -> Option<BTreeMap<String, String>> {
        Some(BTreeMap::from([(
            "info".to_string(),
            "Deterministic data generated in offline mode.".to_string(),
        )]))
    }

    async fn fetch_series(&self, holding: &InstrumentConfig) -> Result<Vec<RawPricePoint>> {
        Ok(self.generate(&holding.sample_behavior()))
    }
}
