// Pricing module - price series providers consumed by the report pipeline

pub mod sample;
pub mod yahoo;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;

use crate::config::{InstrumentConfig, PlatformConfig};

pub use sample::SampleProvider;
pub use yahoo::YahooProvider;

/// A price point exactly as a provider returned it.
///
/// Nothing about it is trusted: the date may not parse and the close may be
/// missing or non-finite. The series normalizer filters these out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPricePoint {
    pub date: String,
    pub close: Option<f64>,
}

impl RawPricePoint {
    pub fn new(date: impl Into<String>, close: f64) -> Self {
        Self {
            date: date.into(),
            close: Some(close),
        }
    }
}

/// Source of daily price history for a single holding
pub trait PriceSeriesProvider {
    /// Provider name written to the report's `source.provider`
    fn name(&self) -> &str;

    /// Free-form notes for the report's `source.notes`
    fn notes(&self, _platforms: &[PlatformConfig]) -> Option<BTreeMap<String, String>> {
        None
    }

    /// Fetch the daily closes of `holding`. May fail or return an empty series.
    fn fetch_series(
        &self,
        holding: &InstrumentConfig,
    ) -> impl Future<Output = Result<Vec<RawPricePoint>>> + Send;
}
