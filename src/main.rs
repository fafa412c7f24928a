//! review-aggregator - Multi-marketplace product review aggregation CLI

use anyhow::Result;
use clap::{Parser, Subcommand};
use review_aggregator::commands::AggregateCommand;
use review_aggregator::config::Config;
use review_aggregator::marketplaces::Marketplace;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "review-aggregator",
    version,
    about = "Aggregate product reviews across marketplaces",
    long_about = "Extracts reviews for each task in an input file, normalizes and deduplicates them, \
                  and exports the merged, newest-first list as JSON, CSV and Excel."
)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate reviews for every task in an input file
    #[command(alias = "a")]
    Aggregate {
        /// JSON array of {marketplace, productUrl, maxReviews?} tasks
        #[arg(short, long, default_value = "data/inputs.sample.json")]
        input: PathBuf,

        /// Directory receiving the export files
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Reviews per product when a task does not say otherwise
        #[arg(long)]
        max_reviews: Option<usize>,

        /// Export formats (comma-separated: json, csv, excel)
        #[arg(long, value_delimiter = ',')]
        formats: Option<Vec<String>>,

        /// Maximum number of tasks extracted at the same time
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// List supported marketplaces
    Marketplaces,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    match cli.command {
        Commands::Aggregate { input, output_dir, max_reviews, formats, concurrency } => {
            if let Some(dir) = output_dir {
                config.export.output_dir = dir;
            }
            if let Some(max) = max_reviews {
                config.max_reviews_per_product = max;
            }
            if let Some(formats) = formats {
                config.export.formats = formats;
            }
            if let Some(n) = concurrency {
                config.max_concurrent_tasks = n;
            }

            let cmd = AggregateCommand::new(config);
            let report = cmd.execute(&input).await?;

            println!("{}", report.summary());
            for path in &report.exports {
                println!("  wrote {}", path.display());
            }
        }

        Commands::Marketplaces => {
            println!("Supported marketplaces:\n");
            println!("{:<10} {:<12} {:<15}", "Code", "Name", "Domain");
            println!("{:-<10} {:-<12} {:-<15}", "", "", "");

            for marketplace in Marketplace::all() {
                println!(
                    "{:<10} {:<12} {:<15}",
                    marketplace.slug(),
                    marketplace.display_name(),
                    marketplace.domain()
                );
            }
        }
    }

    Ok(())
}
