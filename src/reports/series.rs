//! Price series normalization
//!
//! Turns the untrusted output of a provider into a clean, strictly ascending
//! series and derives the rebased (`= 100` at the first point) display series.

use chrono::NaiveDate;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use crate::pricing::RawPricePoint;

/// A validated daily close
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: Decimal,
}

/// A close rebased against the first point of its series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedPoint {
    pub date: NaiveDate,
    pub value: Decimal,
}

/// Output of [`clean_series`]: the usable points plus how many were discarded
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanSeries {
    pub points: Vec<PricePoint>,
    pub dropped: usize,
}

/// Parse `YYYY-MM-DD`, also accepting ISO datetimes by their date prefix
pub fn parse_price_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| NaiveDate::parse_from_str(trimmed.get(..10)?, "%Y-%m-%d").ok())
}

fn parse_close(close: Option<f64>) -> Option<Decimal> {
    let value = close.filter(|v| v.is_finite() && *v >= 0.0)?;
    Decimal::from_f64(value)
}

/// Sort, de-duplicate and filter a raw series.
///
/// Points with an unparseable date or a missing, non-finite or negative close
/// are dropped. When several points share a date, the last one in input order
/// is kept.
pub fn clean_series(raw: &[RawPricePoint]) -> CleanSeries {
    let mut parsed: Vec<PricePoint> = raw
        .iter()
        .filter_map(|point| {
            Some(PricePoint {
                date: parse_price_date(&point.date)?,
                close: parse_close(point.close)?,
            })
        })
        .collect();
    let dropped = raw.len() - parsed.len();

    // Stable sort keeps input order among equal dates
    parsed.sort_by_key(|p| p.date);

    let mut points: Vec<PricePoint> = Vec::with_capacity(parsed.len());
    for point in parsed {
        match points.last_mut() {
            Some(last) if last.date == point.date => *last = point,
            _ => points.push(point),
        }
    }

    CleanSeries { points, dropped }
}

/// Rebase a sorted series so the first point equals 100, rounded to 2 decimals.
///
/// Returns an empty series when the input is empty, starts at a zero close, or
/// holds a ratio to the base too large for a `Decimal`.
pub fn rebase_series(points: &[PricePoint]) -> Vec<NormalizedPoint> {
    let Some(base) = points.first().map(|p| p.close) else {
        return Vec::new();
    };
    if base.is_zero() {
        return Vec::new();
    }

    let rebased: Option<Vec<_>> = points
        .iter()
        .map(|p| {
            Some(NormalizedPoint {
                date: p.date,
                value: rebase_close(p.close, base)?.round_dp(2),
            })
        })
        .collect();
    rebased.unwrap_or_default()
}

/// `100 * close / base`, dividing first when the product alone would overflow
fn rebase_close(close: Decimal, base: Decimal) -> Option<Decimal> {
    Decimal::ONE_HUNDRED
        .checked_mul(close)
        .and_then(|scaled| scaled.checked_div(base))
        .or_else(|| close.checked_div(base)?.checked_mul(Decimal::ONE_HUNDRED))
}
