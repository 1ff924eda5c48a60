//! Structural validation of report documents
//!
//! Checks a JSON document against the shape written by
//! [`crate::reports::payload`] without deserializing it into report types, so
//! hand-edited or foreign files can be checked too. Every violation is
//! collected; nothing stops at the first error.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::path::Path;
use thiserror::Error;

/// All structural problems found in one document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid report structure:\n{}", .errors.join("\n"))]
pub struct PayloadValidationError {
    pub errors: Vec<String>,
}

const REQUIRED_KEYS: [&str; 5] = ["generated_at", "currency", "source", "platforms", "charts"];
const METRIC_KEYS: [&str; 4] = [
    "return_1y",
    "return_5y",
    "monthly_change_pct",
    "daily_change_pct",
];
const SUMMARY_KEYS: [&str; 4] = [
    "total_weight",
    "avg_return_1y",
    "avg_return_5y",
    "avg_monthly_change",
];
const DATASET_STRING_KEYS: [&str; 5] = [
    "id",
    "label",
    "platform_id",
    "borderColor",
    "backgroundColor",
];
const HISTOGRAM_KEYS: [&str; 3] = ["monthly_change", "return_1y", "return_5y"];

fn is_number(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::Number(_)))
}

fn is_nullable_number(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null) | Some(Value::Number(_)))
}

fn is_string(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::String(_)))
}

fn is_non_blank(value: Option<&Value>) -> bool {
    value
        .and_then(Value::as_str)
        .is_some_and(|s| !s.trim().is_empty())
}

/// Accumulates messages for failed requirements
#[derive(Default)]
struct Collector {
    errors: Vec<String>,
}

impl Collector {
    fn require(&mut self, condition: bool, message: impl FnOnce() -> String) {
        if !condition {
            self.errors.push(message());
        }
    }

    fn push(&mut self, message: String) {
        self.errors.push(message);
    }
}

/// Look up `key`, treating a missing key as `default`
fn field_or<'a>(object: &'a Map<String, Value>, key: &str, default: &'a Value) -> &'a Value {
    object.get(key).unwrap_or(default)
}

fn validate_holding(holding: &Map<String, Value>, platform_id: &str, out: &mut Collector) {
    let ticker = holding
        .get("ticker")
        .and_then(Value::as_str)
        .unwrap_or("<no ticker>");
    let prefix = format!("Holding {} ({})", ticker, platform_id);

    out.require(is_non_blank(holding.get("ticker")), || format!("{prefix}: invalid ticker"));
    out.require(is_non_blank(holding.get("display_name")), || {
        format!("{prefix}: invalid display_name")
    });
    out.require(is_number(holding.get("weight")), || {
        format!("{prefix}: weight must be a number")
    });
    out.require(is_string(holding.get("currency")), || {
        format!("{prefix}: currency must be a string")
    });

    let empty_object = Value::Object(Map::new());
    let empty_list = Value::Array(Vec::new());

    match field_or(holding, "metrics", &empty_object) {
        Value::Object(metrics) => {
            for key in METRIC_KEYS {
                out.require(is_nullable_number(metrics.get(key)), || {
                    format!("{prefix}: metrics.{key} must be a number or null")
                });
            }
        }
        _ => out.push(format!("{prefix}: metrics must be an object")),
    }

    let series = match field_or(holding, "series", &empty_object) {
        Value::Object(series) => series,
        _ => {
            out.push(format!("{prefix}: series must be an object"));
            return;
        }
    };

    for (key, value_key) in [("price_history", "close"), ("normalized_5y", "value")] {
        let Value::Array(points) = field_or(series, key, &empty_list) else {
            out.push(format!("{prefix}: series.{key} must be a list"));
            continue;
        };
        for point in points {
            let Value::Object(point) = point else {
                out.push(format!("{prefix}: {key} must contain objects"));
                continue;
            };
            out.require(is_string(point.get("date")), || {
                format!("{prefix}: {key}.date must be a string")
            });
            out.require(is_number(point.get(value_key)), || {
                format!("{prefix}: {key}.{value_key} must be a number")
            });
        }
    }
}

fn validate_summary(summary: &Value, prefix: &str, out: &mut Collector) {
    let Value::Object(summary) = summary else {
        out.push(format!("{prefix}: summary must be an object"));
        return;
    };

    for key in SUMMARY_KEYS {
        if summary.contains_key(key) {
            out.require(is_number(summary.get(key)), || {
                format!("{prefix}: summary.{key} must be a number")
            });
        }
    }

    if let Some(range) = summary.get("timestamp_range") {
        let Value::Object(range) = range else {
            out.push(format!("{prefix}: summary.timestamp_range must be an object"));
            return;
        };
        for bound in ["start", "end"] {
            out.require(is_string(range.get(bound)), || {
                format!("{prefix}: summary.timestamp_range.{bound} must be a string")
            });
        }
    }
}

fn validate_platform(platform: &Map<String, Value>, out: &mut Collector) {
    let platform_id = platform.get("id").and_then(Value::as_str).unwrap_or("");
    let prefix = if platform_id.is_empty() {
        "Platform <no id>".to_string()
    } else {
        format!("Platform {}", platform_id)
    };

    out.require(is_non_blank(platform.get("id")), || format!("{prefix}: invalid id"));
    out.require(is_string(platform.get("name")), || {
        format!("{prefix}: name must be a string")
    });
    out.require(is_string(platform.get("color")), || {
        format!("{prefix}: color must be a string")
    });

    match platform.get("holdings") {
        None => {}
        Some(Value::Array(holdings)) => {
            for holding in holdings {
                match holding {
                    Value::Object(holding) => validate_holding(holding, platform_id, out),
                    _ => out.push(format!("{prefix}: holdings must contain objects")),
                }
            }
        }
        Some(_) => out.push(format!("{prefix}: holdings must be a list")),
    }

    match platform.get("summary") {
        None | Some(Value::Null) => {}
        Some(summary) => validate_summary(summary, &prefix, out),
    }
}

fn validate_timeseries(timeseries: &Map<String, Value>, out: &mut Collector) {
    match timeseries.get("labels") {
        None => {}
        Some(Value::Array(labels)) => {
            for label in labels {
                out.require(label.is_string(), || {
                    "charts.timeseries_5y.labels must contain strings".to_string()
                });
            }
        }
        Some(_) => out.push("charts.timeseries_5y.labels must be a list".to_string()),
    }

    let datasets = match timeseries.get("datasets") {
        None => return,
        Some(Value::Array(datasets)) => datasets,
        Some(_) => {
            out.push("charts.timeseries_5y.datasets must be a list".to_string());
            return;
        }
    };

    for dataset in datasets {
        let Value::Object(dataset) = dataset else {
            out.push("charts.timeseries_5y.datasets must contain objects".to_string());
            continue;
        };
        let prefix = format!(
            "Dataset {}",
            dataset.get("id").and_then(Value::as_str).unwrap_or("<no id>")
        );
        for key in DATASET_STRING_KEYS {
            out.require(is_string(dataset.get(key)), || {
                format!("{prefix}: {key} must be a string")
            });
        }
        match dataset.get("data") {
            None => {}
            Some(Value::Array(data)) => {
                for value in data {
                    out.require(is_nullable_number(Some(value)), || {
                        format!("{prefix}: data must contain numbers or null")
                    });
                }
            }
            Some(_) => out.push(format!("{prefix}: data must be a list")),
        }
    }
}

fn validate_histograms(histograms: &Map<String, Value>, out: &mut Collector) {
    for histogram_key in HISTOGRAM_KEYS {
        let Some(entries) = histograms.get(histogram_key) else {
            continue;
        };
        let Value::Array(entries) = entries else {
            out.push(format!("charts.histograms.{histogram_key} must be a list"));
            continue;
        };
        for entry in entries {
            let Value::Object(entry) = entry else {
                out.push(format!("charts.histograms.{histogram_key} must contain objects"));
                continue;
            };
            let prefix = format!(
                "Histogram {} · {}",
                histogram_key,
                entry.get("ticker").and_then(Value::as_str).unwrap_or("<no ticker>")
            );
            for key in ["ticker", "platform_id", "label"] {
                out.require(is_string(entry.get(key)), || {
                    format!("{prefix}: {key} must be a string")
                });
            }
            for key in ["weight", "value"] {
                out.require(is_number(entry.get(key)), || {
                    format!("{prefix}: {key} must be a number")
                });
            }
        }
    }
}

fn validate_charts(charts: &Value, out: &mut Collector) {
    let Value::Object(charts) = charts else {
        out.push("charts must be an object".to_string());
        return;
    };

    match charts.get("timeseries_5y") {
        None => {}
        Some(Value::Object(timeseries)) => validate_timeseries(timeseries, out),
        Some(_) => out.push("charts.timeseries_5y must be an object".to_string()),
    }

    match charts.get("histograms") {
        None => {}
        Some(Value::Object(histograms)) => validate_histograms(histograms, out),
        Some(_) => out.push("charts.histograms must be an object".to_string()),
    }
}

/// Check the structure of a report document, reporting every violation
pub fn validate_payload(payload: &Value) -> std::result::Result<(), PayloadValidationError> {
    let mut out = Collector::default();

    let Value::Object(root) = payload else {
        return Err(PayloadValidationError {
            errors: vec!["document must be a JSON object".to_string()],
        });
    };

    for key in REQUIRED_KEYS {
        out.require(root.contains_key(key), || format!("missing required key: {key}"));
    }
    out.require(is_string(root.get("generated_at")), || {
        "generated_at must be a string".to_string()
    });
    out.require(is_string(root.get("currency")), || {
        "currency must be a string".to_string()
    });

    match root.get("source") {
        None => {}
        Some(Value::Object(source)) => {
            out.require(is_string(source.get("provider")), || {
                "source.provider must be a string".to_string()
            });
            if source.contains_key("retrieved_at") {
                out.require(is_string(source.get("retrieved_at")), || {
                    "source.retrieved_at must be a string".to_string()
                });
            }
            if source.contains_key("notes") {
                out.require(matches!(source.get("notes"), Some(Value::Object(_))), || {
                    "source.notes must be an object".to_string()
                });
            }
        }
        Some(_) => out.push("source must be an object".to_string()),
    }

    match root.get("platforms") {
        None => {}
        Some(Value::Array(platforms)) => {
            for platform in platforms {
                match platform {
                    Value::Object(platform) => validate_platform(platform, &mut out),
                    _ => out.push("platforms must contain objects".to_string()),
                }
            }
        }
        Some(_) => out.push("platforms must be a list".to_string()),
    }

    if let Some(charts) = root.get("charts") {
        validate_charts(charts, &mut out);
    }

    if out.errors.is_empty() {
        Ok(())
    } else {
        Err(PayloadValidationError { errors: out.errors })
    }
}

/// Read and validate a report file
pub fn validate_file(path: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("File not found or unreadable: {}", path.display()))?;
    let payload: Value = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    validate_payload(&payload)?;
    Ok(())
}
