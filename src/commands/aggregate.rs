//! Aggregate command: extract every task, merge the batches and export them.

use crate::config::Config;
use crate::export::export_all;
use crate::marketplaces::{ReviewSource, SourceRegistry};
use crate::reviews::{merge_batches, Review};
use crate::tasks::{load_tasks, resolve_task, Task};
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{error, info, info_span, warn, Instrument};

/// Outcome of an aggregation run.
#[derive(Debug, Clone, Default)]
pub struct AggregateReport {
    /// Task entries found in the input file
    pub tasks_total: usize,
    /// Entries skipped for missing fields or unknown marketplaces
    pub tasks_skipped: usize,
    /// Tasks whose source failed or timed out
    pub tasks_failed: usize,
    /// Reviews received from sources, before deduplication
    pub reviews_extracted: usize,
    /// Merged, deduplicated, newest-first reviews
    pub reviews: Vec<Review>,
    /// Files written, one per export format
    pub exports: Vec<PathBuf>,
}

impl AggregateReport {
    /// One-line human summary.
    pub fn summary(&self) -> String {
        format!(
            "Aggregated {} reviews ({} extracted) from {} tasks ({} skipped, {} failed)",
            self.reviews.len(),
            self.reviews_extracted,
            self.tasks_total,
            self.tasks_skipped,
            self.tasks_failed
        )
    }
}

/// Batches gathered from sources, in task order.
#[derive(Debug, Default)]
pub struct BatchCollection {
    pub batches: Vec<Vec<Review>>,
    pub skipped: usize,
    pub failed: usize,
}

/// Runs one aggregation over a task file.
pub struct AggregateCommand {
    config: Config,
}

impl AggregateCommand {
    /// Creates a new aggregate command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Aggregates with the default synthetic sources.
    pub async fn execute(&self, input: &Path) -> Result<AggregateReport> {
        let registry = SourceRegistry::with_defaults();
        self.execute_with_sources(&registry, input).await
    }

    /// Aggregates with a provided source registry (for testing).
    pub async fn execute_with_sources(
        &self,
        registry: &SourceRegistry,
        input: &Path,
    ) -> Result<AggregateReport> {
        let entries = load_tasks(input)?;
        let output_dir = &self.config.export.output_dir;

        info!("Using input: {}", input.display());
        info!("Output directory: {}", output_dir.display());

        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;

        let collection = self.collect_batches(registry, &entries).await;
        let reviews_extracted: usize = collection.batches.iter().map(Vec::len).sum();

        let reviews = merge_batches(&collection.batches);
        info!("Aggregated total of {} reviews", reviews.len());

        let formats = self.config.export_formats();
        if formats.is_empty() {
            warn!("No recognized export formats configured, nothing will be written");
        }
        let exports =
            export_all(&reviews, &formats, output_dir, &self.config.export.file_stem)?;

        info!("Processing complete");

        Ok(AggregateReport {
            tasks_total: entries.len(),
            tasks_skipped: collection.skipped,
            tasks_failed: collection.failed,
            reviews_extracted,
            reviews,
            exports,
        })
    }

    /// Extracts a batch per task entry.
    ///
    /// Sources run concurrently up to `max_concurrent_tasks`, but batches are
    /// returned in task order. Invalid entries are skipped; failing or timed
    /// out sources are logged and their batch omitted. Every review is
    /// returned as a canonical copy.
    pub async fn collect_batches(
        &self,
        registry: &SourceRegistry,
        entries: &[Value],
    ) -> BatchCollection {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_tasks.max(1)));
        let timeout = Duration::from_secs(self.config.task_timeout_secs);
        let mut collection = BatchCollection::default();
        let mut handles = Vec::new();

        for (i, entry) in entries.iter().enumerate() {
            let task = match resolve_task(i + 1, entry, self.config.max_reviews_per_product) {
                Ok(task) => task,
                Err(e) => {
                    warn!("Skipping invalid entry: {}", e);
                    collection.skipped += 1;
                    continue;
                }
            };

            let Some(source) = registry.get(task.marketplace) else {
                warn!(
                    "No source registered for marketplace '{}', skipping task #{}",
                    task.marketplace, task.index
                );
                collection.skipped += 1;
                continue;
            };

            let index = task.index;
            let span = info_span!("task", index, marketplace = %task.marketplace);
            let handle = tokio::spawn(
                run_task(source, task, Arc::clone(&semaphore), timeout).instrument(span),
            );
            handles.push((index, handle));
        }

        for (index, handle) in handles {
            match handle.await {
                Ok(Ok(reviews)) => {
                    info!("Task #{} produced {} reviews before aggregation", index, reviews.len());
                    let scale = self.config.rating_scale;
                    collection.batches.push(reviews.iter().map(|r| r.canonical(scale)).collect());
                }
                Ok(Err(e)) => {
                    error!("Error while processing task #{}: {:#}", index, e);
                    collection.failed += 1;
                }
                Err(e) => {
                    error!("Task #{} aborted: {}", index, e);
                    collection.failed += 1;
                }
            }
        }

        collection
    }
}

/// Extracts one task's batch once a concurrency permit is available.
/// A zero timeout means no limit.
async fn run_task(
    source: Arc<dyn ReviewSource>,
    task: Task,
    semaphore: Arc<Semaphore>,
    timeout: Duration,
) -> Result<Vec<Review>> {
    let _permit = semaphore.acquire_owned().await?;

    info!(
        "Processing task: marketplace={}, url={}, max_reviews={}",
        task.marketplace, task.product_url, task.max_reviews
    );

    let extraction = source.extract(&task.product_url, task.max_reviews);
    if timeout.is_zero() {
        return extraction.await;
    }

    match tokio::time::timeout(timeout, extraction).await {
        Ok(result) => result,
        Err(_) => anyhow::bail!("extraction timed out after {}s", timeout.as_secs()),
    }
}
