//! Merging review batches into one deduplicated, newest-first list.

use crate::reviews::dedup::deduplicate;
use crate::reviews::models::Review;
use crate::reviews::normalize::{parse_date, try_parse_datetime};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use tracing::{debug, info};

/// Timestamp used to order a review. Empty or unparseable dates are `None`,
/// which orders before every real timestamp.
pub fn sort_timestamp(date: &str) -> Option<DateTime<Utc>> {
    try_parse_datetime(&parse_date(date)).ok()
}

/// Orders newest date first, then highest rating first.
fn newest_first(a: &(Option<DateTime<Utc>>, f64), b: &(Option<DateTime<Utc>>, f64)) -> Ordering {
    b.0.cmp(&a.0).then_with(|| b.1.total_cmp(&a.1))
}

/// Merges review batches.
///
/// Batches are flattened in order (every record is cloned, callers keep their
/// data), deduplicated by identity key and sorted newest-first, then by rating.
/// The sort is stable: reviews with equal date and rating stay in the order
/// they had after flattening.
pub fn merge_batches<B: AsRef<[Review]>>(batches: &[B]) -> Vec<Review> {
    let flat: Vec<Review> =
        batches.iter().flat_map(|batch| batch.as_ref().iter().cloned()).collect();
    let total = flat.len();
    debug!("Merging {} reviews from {} batches", total, batches.len());

    let deduped = deduplicate(flat);
    info!("Deduplicated reviews: {} -> {}", total, deduped.len());

    let mut keyed: Vec<_> = deduped
        .into_iter()
        .map(|review| ((sort_timestamp(&review.date), review.rating), review))
        .collect();
    keyed.sort_by(|a, b| newest_first(&a.0, &b.0));

    keyed.into_iter().map(|(_, review)| review).collect()
}
