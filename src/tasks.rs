//! Aggregation tasks: loading the task file and validating each entry.

use crate::marketplaces::{Marketplace, MarketplaceParseError};
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Why a task entry was skipped.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("task #{index} is missing {field}")]
    MissingField { index: usize, field: &'static str },

    #[error("task #{index}: {source}")]
    UnknownMarketplace {
        index: usize,
        #[source]
        source: MarketplaceParseError,
    },

    #[error("task #{index} is malformed: {reason}")]
    Malformed { index: usize, reason: String },
}

/// A task entry as written in the task file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTask {
    #[serde(default)]
    marketplace: Option<String>,
    #[serde(default, alias = "product_url")]
    product_url: Option<String>,
    #[serde(default)]
    max_reviews: Option<Value>,
}

/// A validated task ready to hand to a review source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// 1-based position in the task file
    pub index: usize,
    pub marketplace: Marketplace,
    pub product_url: String,
    /// Always at least 1
    pub max_reviews: usize,
}

/// Reads the task file, which must hold a JSON array.
pub fn load_tasks(path: &Path) -> Result<Vec<Value>> {
    debug!("Loading tasks from: {}", path.display());

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;

    let data: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse input file: {}", path.display()))?;

    match data {
        Value::Array(entries) => Ok(entries),
        _ => anyhow::bail!(
            "Input file must contain a JSON array of tasks: {}",
            path.display()
        ),
    }
}

/// Validates one task entry.
///
/// `index` is 1-based. `maxReviews` overrides `default_max`; either is raised
/// to at least 1.
pub fn resolve_task(index: usize, entry: &Value, default_max: usize) -> Result<Task, TaskError> {
    let raw: RawTask = serde_json::from_value(entry.clone())
        .map_err(|e| TaskError::Malformed { index, reason: e.to_string() })?;

    let marketplace = raw
        .marketplace
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or(TaskError::MissingField { index, field: "marketplace" })?;

    let product_url = raw
        .product_url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or(TaskError::MissingField { index, field: "productUrl" })?;

    let marketplace = marketplace
        .parse::<Marketplace>()
        .map_err(|source| TaskError::UnknownMarketplace { index, source })?;

    let max_reviews = match raw.max_reviews.as_ref().filter(|v| !v.is_null()) {
        Some(value) => match coerce_count(value) {
            Some(n) => usize::try_from(n.max(1)).unwrap_or(usize::MAX),
            None => {
                warn!("Task #{} has unusable maxReviews {}, using {}", index, value, default_max);
                default_max.max(1)
            }
        },
        None => default_max.max(1),
    };

    Ok(Task { index, marketplace, product_url: product_url.to_string(), max_reviews })
}

/// Reads a review count from a number or numeric string, truncating fractions.
fn coerce_count(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)
            })
        }
        _ => None,
    }
}
