//! Configuration management with TOML, environment variables, and CLI overrides.

use crate::reviews::DEFAULT_RATING_SCALE;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Reviews requested per product when a task does not say otherwise
    #[serde(default = "default_max_reviews_per_product")]
    pub max_reviews_per_product: usize,

    /// Upper bound on sources extracting at the same time
    #[serde(default = "default_max_concurrent_tasks")]
    pub max_concurrent_tasks: usize,

    /// Time allowed for a single extraction, in seconds
    #[serde(default = "default_task_timeout_secs")]
    pub task_timeout_secs: u64,

    /// Upper bound of the rating range
    #[serde(default = "default_rating_scale")]
    pub rating_scale: u32,

    /// Export settings
    #[serde(default)]
    pub export: ExportConfig,
}

/// Where and how merged reviews are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Format tags (json, csv, excel/xlsx); unknown tags are ignored
    #[serde(default = "default_formats")]
    pub formats: Vec<String>,

    /// Directory receiving the export files
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// File name, without extension, shared by every export
    #[serde(default = "default_file_stem")]
    pub file_stem: String,
}

fn default_max_reviews_per_product() -> usize {
    25
}

fn default_max_concurrent_tasks() -> usize {
    4
}

fn default_task_timeout_secs() -> u64 {
    30
}

fn default_rating_scale() -> u32 {
    DEFAULT_RATING_SCALE
}

fn default_formats() -> Vec<String> {
    vec!["json".to_string(), "csv".to_string(), "excel".to_string()]
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_file_stem() -> String {
    "output".to_string()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            formats: default_formats(),
            output_dir: default_output_dir(),
            file_stem: default_file_stem(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_reviews_per_product: default_max_reviews_per_product(),
            max_concurrent_tasks: default_max_concurrent_tasks(),
            task_timeout_secs: default_task_timeout_secs(),
            rating_scale: default_rating_scale(),
            export: ExportConfig::default(),
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        // 1. Explicit path takes precedence
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        // 2. Try current directory
        let local_config = Path::new("review-aggregator.toml");
        if local_config.exists() {
            debug!("Found review-aggregator.toml in current directory");
            return Self::from_file(local_config);
        }

        // 3. Try XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("review-aggregator").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        // 4. Return default config
        warn!("No config file found, using default settings");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(max) = std::env::var("REVIEWS_MAX_PER_PRODUCT") {
            if let Ok(m) = max.parse() {
                self.max_reviews_per_product = m;
            }
        }

        if let Ok(dir) = std::env::var("REVIEWS_OUTPUT_DIR") {
            if !dir.trim().is_empty() {
                self.export.output_dir = PathBuf::from(dir);
            }
        }

        if let Ok(formats) = std::env::var("REVIEWS_FORMATS") {
            let formats: Vec<String> = formats
                .split(',')
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty())
                .collect();
            if !formats.is_empty() {
                self.export.formats = formats;
            }
        }

        self
    }

    /// Returns the recognized export formats, in configured order.
    pub fn export_formats(&self) -> Vec<ExportFormat> {
        parse_formats(&self.export.formats)
    }
}

/// File format of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
    Excel,
}

impl ExportFormat {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "xlsx",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            _ => Err(format!("Unknown format: {}. Use: json, csv, excel", s)),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Csv => write!(f, "csv"),
            ExportFormat::Excel => write!(f, "excel"),
        }
    }
}

/// Parses format tags, skipping unknown ones and collapsing duplicates.
pub fn parse_formats(tags: &[String]) -> Vec<ExportFormat> {
    let mut formats = Vec::new();
    for tag in tags {
        match tag.parse::<ExportFormat>() {
            Ok(format) if !formats.contains(&format) => formats.push(format),
            Ok(_) => {}
            Err(e) => warn!("Ignoring export format: {}", e),
        }
    }
    formats
}
