//! Portfolio Tracker - weighted ETF platform return reports
//!
//! This library fetches daily price histories for the holdings of a set of
//! investment platforms, computes point-in-time returns, aggregates them per
//! platform by weight, and assembles chart-ready data into a single JSON
//! report.

pub mod config;
pub mod error;
pub mod pricing;
pub mod reports;
pub mod utils;
pub mod validation;
