//! Point-in-time return metrics
//!
//! Every metric is measured from the last point of a sorted series back to an
//! "as-of" anchor: the freshest point on or before `latest.date - window`.
//! When the series is too short to reach back that far, the earliest point is
//! used as the anchor instead, so short histories still report an (approximate)
//! long-window return.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use tracing::debug;

use super::series::PricePoint;

/// Decimal places kept for every percentage metric
pub const METRIC_DP: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookbackWindow {
    OneMonth,
    OneYear,
    FiveYears,
}

impl LookbackWindow {
    pub fn days(self) -> u64 {
        match self {
            LookbackWindow::OneMonth => 30,
            LookbackWindow::OneYear => 365,
            LookbackWindow::FiveYears => 365 * 5,
        }
    }

    pub fn threshold(self, latest: NaiveDate) -> Option<NaiveDate> {
        latest.checked_sub_days(Days::new(self.days()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReturnMetrics {
    pub return_1y: Option<Decimal>,
    pub return_5y: Option<Decimal>,
    pub monthly_change_pct: Option<Decimal>,
    pub daily_change_pct: Option<Decimal>,
}

/// Close of the freshest point dated on or before `target`.
///
/// With `fallback_to_first`, a series that starts after `target` yields its
/// earliest close instead of `None`.
pub fn as_of_price(
    series: &[PricePoint],
    target: NaiveDate,
    fallback_to_first: bool,
) -> Option<Decimal> {
    let idx = series.partition_point(|p| p.date <= target);
    match idx.checked_sub(1) {
        Some(i) => Some(series[i].close),
        None if fallback_to_first => {
            let first = series.first()?;
            debug!(
                target = %target,
                first = %first.date,
                "no point on or before threshold, anchoring at series start"
            );
            Some(first.close)
        }
        None => None,
    }
}

/// `latest / base - 1`, undefined against a missing or zero base and when the
/// ratio does not fit a `Decimal`
pub fn percentage_change(latest: Decimal, base: Option<Decimal>) -> Option<Decimal> {
    let base = base.filter(|b| !b.is_zero())?;
    latest.checked_div(base)?.checked_sub(Decimal::ONE)
}

fn rounded(value: Option<Decimal>) -> Option<Decimal> {
    value.map(|v| v.round_dp(METRIC_DP))
}

/// Compute the four metrics of a sorted, de-duplicated series.
///
/// Fewer than two points leave every metric undefined.
pub fn compute_returns(series: &[PricePoint]) -> ReturnMetrics {
    let [.., previous, latest] = series else {
        return ReturnMetrics::default();
    };

    let window_change = |window: LookbackWindow| {
        let base = window
            .threshold(latest.date)
            .and_then(|threshold| as_of_price(series, threshold, true));
        rounded(percentage_change(latest.close, base))
    };

    ReturnMetrics {
        return_1y: window_change(LookbackWindow::OneYear),
        return_5y: window_change(LookbackWindow::FiveYears),
        monthly_change_pct: window_change(LookbackWindow::OneMonth),
        daily_change_pct: rounded(percentage_change(latest.close, Some(previous.close))),
    }
}
