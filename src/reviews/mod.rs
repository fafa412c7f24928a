//! Review records and the normalize → deduplicate → merge pipeline.

pub mod dedup;
pub mod merge;
pub mod models;
pub mod normalize;

pub use dedup::{deduplicate, IdentityKey};
pub use merge::merge_batches;
pub use models::{Review, FIELD_NAMES};
pub use normalize::{
    clean_text, marketplace_slug, normalize_rating, parse_date, NormalizeError,
    DEFAULT_RATING_SCALE,
};
