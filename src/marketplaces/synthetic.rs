//! Deterministic synthetic review source.
//!
//! Reviews are derived from a SHA-256 of the product URL, so the same URL
//! always yields the same ratings, ages and texts. This keeps the aggregator
//! runnable offline while exercising the full merge and export path.

use crate::marketplaces::{Marketplace, ReviewSource};
use crate::reviews::normalize::{
    clamp_rating, clean_text, format_datetime, marketplace_slug, NormalizeError,
    DEFAULT_RATING_SCALE,
};
use crate::reviews::Review;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use tracing::info;

/// Maps a seed string onto `[min, max]` using the first 32 bits of its SHA-256.
pub fn deterministic_random(seed: &str, min: u32, max: u32) -> Result<u32, NormalizeError> {
    if min > max {
        return Err(NormalizeError::InvalidRange { min, max });
    }

    let digest = Sha256::digest(seed.as_bytes());
    let num = u64::from(u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]));
    let span = u64::from(max - min) + 1;

    Ok(min + (num % span) as u32)
}

/// Generates `max_reviews` (at least one) synthetic reviews dated relative to `now`.
pub fn generate_reviews(
    product_url: &str,
    marketplace: &str,
    max_reviews: usize,
    now: DateTime<Utc>,
) -> Result<Vec<Review>, NormalizeError> {
    let slug = marketplace_slug(marketplace);
    let base_seed = hex::encode(Sha256::digest(product_url.as_bytes()));

    (1..=max_reviews.max(1))
        .map(|idx| {
            let seed = format!("{}-{}", base_seed, idx);
            let stars = deterministic_random(&seed, 1, 5)?;
            let days_ago = deterministic_random(&format!("{}-days", seed), 1, 365)?;
            let created_at = now - Duration::days(i64::from(days_ago)) - Duration::hours(idx as i64);

            let text = format!(
                "This is an auto-generated synthetic review #{} for product {} on {}.",
                idx, product_url, slug
            );

            Ok(Review {
                product_url: product_url.to_string(),
                text: clean_text(Some(text.as_str())),
                rating: clamp_rating(f64::from(stars), DEFAULT_RATING_SCALE),
                date: format_datetime(&created_at),
                marketplace: slug.clone(),
                review_title: format!("Review #{} for {}", idx, slug.to_uppercase()),
                review_url: format!("{}#review-{}", product_url, idx),
            })
        })
        .collect()
}

/// Review source producing deterministic synthetic reviews for one marketplace.
pub struct SyntheticSource {
    marketplace: Marketplace,
    now: Option<DateTime<Utc>>,
}

impl SyntheticSource {
    /// Creates a source dated against the wall clock.
    pub fn new(marketplace: Marketplace) -> Self {
        Self { marketplace, now: None }
    }

    /// Pins the reference time (for testing).
    pub fn with_clock(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }
}

#[async_trait]
impl ReviewSource for SyntheticSource {
    async fn extract(&self, product_url: &str, max_reviews: usize) -> Result<Vec<Review>> {
        info!(
            "Starting {} extraction for {} (max={})",
            self.marketplace.display_name(),
            product_url,
            max_reviews
        );

        let now = self.now.unwrap_or_else(Utc::now);
        let reviews = generate_reviews(product_url, self.marketplace.slug(), max_reviews, now)?;

        info!("{} extractor produced {} reviews", self.marketplace.display_name(), reviews.len());
        Ok(reviews)
    }

    fn marketplace(&self) -> Marketplace {
        self.marketplace
    }
}
