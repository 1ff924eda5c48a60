//! Error handling for the portfolio tracker
//!
//! Defines the typed errors raised at configuration and provider boundaries and
//! establishes a unified Result type using anyhow for context chaining.

use thiserror::Error;

/// Core error types for report generation
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("config error: {0}")]
    Config(String),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Result type alias for tracker operations
pub type Result<T> = anyhow::Result<T>;
