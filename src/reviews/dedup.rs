//! Composite-key deduplication of reviews.

use crate::reviews::models::Review;
use crate::reviews::normalize::parse_date;
use std::collections::HashSet;

/// The fields that make two reviews "the same review".
///
/// Product URL, marketplace and text compare lowercased and trimmed. The date
/// compares in canonical form, so `2024-01-01` and `2024-01-01T00:00:00Z`
/// collide while unparseable dates compare as their trimmed text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    product_url: String,
    marketplace: String,
    text: String,
    date: String,
}

impl IdentityKey {
    /// Computes the identity key of a review.
    pub fn of(review: &Review) -> Self {
        Self {
            product_url: review.product_url.trim().to_lowercase(),
            marketplace: review.marketplace.trim().to_lowercase(),
            text: review.text.trim().to_lowercase(),
            date: parse_date(&review.date),
        }
    }
}

/// Keeps the first review seen for each identity key, in input order.
pub fn deduplicate(reviews: impl IntoIterator<Item = Review>) -> Vec<Review> {
    let mut seen = HashSet::new();
    reviews.into_iter().filter(|review| seen.insert(IdentityKey::of(review))).collect()
}
