//! Weighted platform summaries

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::holding::InstrumentResult;
use super::returns::{ReturnMetrics, METRIC_DP};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Weighted view of one platform. Every field is absent when no holding
/// contributed to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformSummary {
    /// Sum of weights of holdings with any usable price (diagnostic only)
    pub total_weight_with_data: Option<Decimal>,
    pub avg_monthly_change: Option<Decimal>,
    pub avg_return_1y: Option<Decimal>,
    pub avg_return_5y: Option<Decimal>,
    pub timestamp_range: Option<DateRange>,
}

/// A platform as it appears in the report: its identity, summary and holdings
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformReport {
    pub id: String,
    pub name: String,
    pub color: String,
    pub summary: PlatformSummary,
    pub holdings: Vec<InstrumentResult>,
}

/// Running `sum(w * x) / sum(w)` over the holdings that define a metric
#[derive(Debug, Default)]
struct WeightedMean {
    weighted_sum: Decimal,
    weight: Decimal,
    overflowed: bool,
}

impl WeightedMean {
    fn add(&mut self, weight: Decimal, value: Option<Decimal>) {
        let Some(v) = value else {
            return;
        };
        match weight
            .checked_mul(v)
            .and_then(|term| self.weighted_sum.checked_add(term))
        {
            Some(sum) => {
                self.weighted_sum = sum;
                self.weight += weight;
            }
            None => self.overflowed = true,
        }
    }

    /// `None` when nothing contributed or the sum left the `Decimal` range
    fn value(&self) -> Option<Decimal> {
        if self.overflowed || self.weight.is_zero() {
            return None;
        }
        self.weighted_sum
            .checked_div(self.weight)
            .map(|mean| mean.round_dp(METRIC_DP))
    }
}

pub fn summarize_platform(holdings: &[InstrumentResult]) -> PlatformSummary {
    let mut monthly = WeightedMean::default();
    let mut one_year = WeightedMean::default();
    let mut five_year = WeightedMean::default();
    let mut weight_with_data = Decimal::ZERO;
    let mut range: Option<DateRange> = None;

    for holding in holdings.iter().filter(|h| !h.missing_data) {
        let ReturnMetrics {
            return_1y,
            return_5y,
            monthly_change_pct,
            ..
        } = holding.metrics;
        monthly.add(holding.weight, monthly_change_pct);
        one_year.add(holding.weight, return_1y);
        five_year.add(holding.weight, return_5y);
        weight_with_data += holding.weight;

        if let (Some(start), Some(end)) = (holding.first_date(), holding.last_date()) {
            range = Some(match range {
                Some(r) => DateRange {
                    start: r.start.min(start),
                    end: r.end.max(end),
                },
                None => DateRange { start, end },
            });
        }
    }

    PlatformSummary {
        total_weight_with_data: (!weight_with_data.is_zero())
            .then(|| weight_with_data.round_dp(METRIC_DP)),
        avg_monthly_change: monthly.value(),
        avg_return_1y: one_year.value(),
        avg_return_5y: five_year.value(),
        timestamp_range: range,
    }
}
