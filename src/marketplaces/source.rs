//! The extraction seam between marketplaces and the aggregation pipeline.

use crate::marketplaces::Marketplace;
use crate::reviews::Review;
use anyhow::Result;
use async_trait::async_trait;

/// Produces a batch of reviews for one product - enables mocking for tests.
#[async_trait]
pub trait ReviewSource: Send + Sync {
    /// Extracts up to `max_reviews` reviews for the product.
    ///
    /// A returned batch is complete; sources never stream partial results.
    async fn extract(&self, product_url: &str, max_reviews: usize) -> Result<Vec<Review>>;

    /// Returns the marketplace this source extracts from.
    fn marketplace(&self) -> Marketplace;
}
