//! review-aggregator - Multi-marketplace product review aggregation
//!
//! Extracts reviews per task, normalizes them into one canonical shape,
//! merges the batches without duplicates and exports the result.

pub mod commands;
pub mod config;
pub mod export;
pub mod marketplaces;
pub mod reviews;
pub mod tasks;

pub use config::{Config, ExportFormat};
pub use marketplaces::{Marketplace, ReviewSource, SourceRegistry};
pub use reviews::{deduplicate, merge_batches, Review};
