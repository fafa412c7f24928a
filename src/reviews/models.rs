//! The review record shared by sources, the merge pipeline and exporters.

use crate::reviews::normalize;
use serde::{Deserialize, Deserializer, Serialize};

/// Column order used by every tabular export.
pub const FIELD_NAMES: [&str; 7] =
    ["productUrl", "text", "rating", "date", "marketplace", "reviewTitle", "reviewUrl"];

/// A single product review.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Review {
    /// Source identifier of the reviewed product
    #[serde(alias = "product_url")]
    pub product_url: String,
    /// Review body
    pub text: String,
    /// Star rating on a 0..=scale range
    #[serde(deserialize_with = "lenient_rating")]
    pub rating: f64,
    /// ISO-8601 UTC timestamp, or the raw string when it could not be parsed
    pub date: String,
    /// Marketplace slug
    pub marketplace: String,
    /// Review headline
    #[serde(alias = "review_title")]
    pub review_title: String,
    /// Permalink to the review
    #[serde(alias = "review_url")]
    pub review_url: String,
}

impl Review {
    /// Returns the value of a column by its exported name.
    ///
    /// Unknown names yield an empty string so sinks can look up columns
    /// without caring about the record shape.
    pub fn field(&self, name: &str) -> String {
        match name {
            "productUrl" => self.product_url.clone(),
            "text" => self.text.clone(),
            // keeps the trailing ".0" that JSON output shows
            "rating" => format!("{:?}", self.rating),
            "date" => self.date.clone(),
            "marketplace" => self.marketplace.clone(),
            "reviewTitle" => self.review_title.clone(),
            "reviewUrl" => self.review_url.clone(),
            _ => String::new(),
        }
    }

    /// Returns a canonical copy: cleaned text, clamped rating, ISO-8601 UTC
    /// date and slugged marketplace. Title and URLs pass through.
    pub fn canonical(&self, scale: u32) -> Review {
        Review {
            product_url: self.product_url.clone(),
            text: normalize::clean_text(Some(self.text.as_str())),
            rating: normalize::clamp_rating(self.rating, scale),
            date: normalize::parse_date(&self.date),
            marketplace: normalize::marketplace_slug(&self.marketplace),
            review_title: self.review_title.clone(),
            review_url: self.review_url.clone(),
        }
    }
}

/// Accepts numbers, numeric strings and booleans; anything else becomes 0.0.
fn lenient_rating<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(normalize::coerce_rating(&raw).unwrap_or(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_review() -> Review {
        Review {
            product_url: "https://example.com/p/1".to_string(),
            text: "Solid build, fast shipping".to_string(),
            rating: 4.5,
            date: "2024-01-01T00:00:00Z".to_string(),
            marketplace: "amazon".to_string(),
            review_title: "Good".to_string(),
            review_url: "https://example.com/p/1#review-1".to_string(),
        }
    }

    #[test]
    fn test_review_serializes_camel_case() {
        let json = serde_json::to_string(&make_review()).unwrap();
        assert!(json.contains("\"productUrl\""));
        assert!(json.contains("\"reviewTitle\""));
        assert!(json.contains("\"reviewUrl\""));
        assert!(!json.contains("product_url"));
    }

    #[test]
    fn test_review_missing_fields_default() {
        let review: Review = serde_json::from_str(r#"{"text": "hello"}"#).unwrap();
        assert_eq!(review.text, "hello");
        assert_eq!(review.rating, 0.0);
        assert!(review.product_url.is_empty());
        assert!(review.date.is_empty());
    }

    #[test]
    fn test_review_ignores_extra_fields() {
        let review: Review =
            serde_json::from_str(r#"{"productUrl": "p1", "helpfulVotes": 12}"#).unwrap();
        assert_eq!(review.product_url, "p1");
    }

    #[test]
    fn test_review_lenient_rating() {
        let review: Review = serde_json::from_str(r#"{"rating": " 4.25 "}"#).unwrap();
        assert_eq!(review.rating, 4.25);

        let review: Review = serde_json::from_str(r#"{"rating": "five"}"#).unwrap();
        assert_eq!(review.rating, 0.0);

        let review: Review = serde_json::from_str(r#"{"rating": null}"#).unwrap();
        assert_eq!(review.rating, 0.0);

        let review: Review = serde_json::from_str(r#"{"rating": 3}"#).unwrap();
        assert_eq!(review.rating, 3.0);
    }

    #[test]
    fn test_review_snake_case_aliases() {
        let review: Review =
            serde_json::from_str(r#"{"product_url": "p2", "review_title": "t"}"#).unwrap();
        assert_eq!(review.product_url, "p2");
        assert_eq!(review.review_title, "t");
    }

    #[test]
    fn test_canonical_copy() {
        let raw = Review {
            product_url: " https://example.com/p/1 ".to_string(),
            text: "  Works\r\nwell  ".to_string(),
            rating: 7.123,
            date: "2024-01-01 10:00:00".to_string(),
            marketplace: "Amazon.com!!".to_string(),
            review_title: "  Title ".to_string(),
            review_url: "u".to_string(),
        };

        let canonical = raw.canonical(5);
        assert_eq!(canonical.text, "Works well");
        assert_eq!(canonical.rating, 5.0);
        assert_eq!(canonical.date, "2024-01-01T10:00:00Z");
        assert_eq!(canonical.marketplace, "amazon-com");
        assert_eq!(canonical.product_url, raw.product_url);
        assert_eq!(canonical.review_title, "  Title ");

        // source record untouched
        assert_eq!(raw.rating, 7.123);
        assert_eq!(canonical.canonical(5), canonical);
    }

    #[test]
    fn test_field_lookup() {
        let review = make_review();
        assert_eq!(review.field("productUrl"), "https://example.com/p/1");
        assert_eq!(review.field("rating"), "4.5");
        assert_eq!(review.field("marketplace"), "amazon");
        assert_eq!(review.field("helpfulVotes"), "");

        let whole = Review { rating: 5.0, ..make_review() };
        assert_eq!(whole.field("rating"), "5.0");

        for name in FIELD_NAMES {
            assert!(!review.field(name).is_empty(), "{} should resolve", name);
        }
    }
}
