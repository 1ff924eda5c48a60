// Reports module - price series to platform report pipeline

pub mod builder;
pub mod chart;
pub mod holding;
pub mod payload;
pub mod platform;
pub mod returns;
pub mod series;

pub use builder::{
    assemble_report, build_report, FetchProgress, InstrumentOutcome, Report, SourceInfo,
};
pub use chart::{ChartDataset, HistogramEntry, Histograms, TimeSeriesChart};
pub use holding::{InstrumentResult, NO_DATA_WARNING};
pub use payload::write_report;
pub use platform::{summarize_platform, DateRange, PlatformReport, PlatformSummary};
pub use returns::{compute_returns, LookbackWindow, ReturnMetrics};
pub use series::{clean_series, rebase_series, CleanSeries, NormalizedPoint, PricePoint};
