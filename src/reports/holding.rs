//! Per-holding results
//!
//! An [`InstrumentResult`] is produced for every configured (platform, holding)
//! pair, whether or not the provider delivered usable prices.

use rust_decimal::Decimal;

use super::returns::{compute_returns, ReturnMetrics};
use super::series::{rebase_series, NormalizedPoint, PricePoint};
use crate::config::InstrumentConfig;

/// Warning attached to holdings whose provider returned nothing usable
pub const NO_DATA_WARNING: &str = "No data available for this ticker.";

#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentResult {
    pub platform_id: String,
    pub ticker: String,
    pub display_name: String,
    pub weight: Decimal,
    pub currency: String,
    pub latest_price: Option<Decimal>,
    pub metrics: ReturnMetrics,
    pub price_history: Vec<PricePoint>,
    pub normalized_series: Vec<NormalizedPoint>,
    /// Set iff no usable price point was obtained
    pub missing_data: bool,
    pub warnings: Vec<String>,
}

impl InstrumentResult {
    /// Result for a holding whose history is `points` (sorted, de-duplicated, non-empty)
    pub fn with_history(
        platform_id: &str,
        holding: &InstrumentConfig,
        points: Vec<PricePoint>,
    ) -> Self {
        if points.is_empty() {
            return Self::missing(platform_id, holding, NO_DATA_WARNING);
        }

        Self {
            platform_id: platform_id.to_string(),
            ticker: holding.ticker.clone(),
            display_name: holding.display_name.clone(),
            weight: holding.weight,
            currency: holding.currency.clone(),
            latest_price: points.last().map(|p| p.close),
            metrics: compute_returns(&points),
            normalized_series: rebase_series(&points),
            price_history: points,
            missing_data: false,
            warnings: Vec::new(),
        }
    }

    /// Result for a holding that produced no usable data
    pub fn missing(
        platform_id: &str,
        holding: &InstrumentConfig,
        warning: impl Into<String>,
    ) -> Self {
        Self {
            platform_id: platform_id.to_string(),
            ticker: holding.ticker.clone(),
            display_name: holding.display_name.clone(),
            weight: holding.weight,
            currency: holding.currency.clone(),
            latest_price: None,
            metrics: ReturnMetrics::default(),
            price_history: Vec::new(),
            normalized_series: Vec::new(),
            missing_data: true,
            warnings: vec![warning.into()],
        }
    }

    pub fn first_date(&self) -> Option<chrono::NaiveDate> {
        self.price_history.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<chrono::NaiveDate> {
        self.price_history.last().map(|p| p.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn holding() -> InstrumentConfig {
        InstrumentConfig {
            ticker: "FTEC".to_string(),
            weight: dec!(0.181753),
            display_name: "Fidelity MSCI Information Tech ETF".to_string(),
            currency: "USD".to_string(),
            fetch_symbol: None,
            sample: None,
        }
    }

    #[test]
    fn test_with_history_populates_fields() {
        let points = vec![
            PricePoint {
                date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
                close: dec!(100),
            },
            PricePoint {
                date: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
                close: dec!(110),
            },
        ];
        let result = InstrumentResult::with_history("fintual", &holding(), points);
        assert!(!result.missing_data);
        assert!(result.warnings.is_empty());
        assert_eq!(result.latest_price, Some(dec!(110)));
        assert_eq!(result.metrics.return_1y, Some(dec!(0.1)));
        assert_eq!(result.normalized_series.len(), 2);
        assert_eq!(result.first_date(), NaiveDate::from_ymd_opt(2020, 1, 1));
        assert_eq!(result.last_date(), NaiveDate::from_ymd_opt(2021, 1, 1));
    }

    #[test]
    fn test_empty_history_is_missing() {
        let result = InstrumentResult::with_history("fintual", &holding(), Vec::new());
        assert!(result.missing_data);
        assert_eq!(result.latest_price, None);
        assert_eq!(result.metrics, ReturnMetrics::default());
        assert_eq!(result.warnings, vec![NO_DATA_WARNING.to_string()]);
        assert_eq!(result.first_date(), None);
    }
}
