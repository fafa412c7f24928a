//! Supported marketplaces and the review sources that extract from them.

pub mod registry;
pub mod source;
pub mod synthetic;

pub use registry::SourceRegistry;
pub use source::ReviewSource;
pub use synthetic::{deterministic_random, generate_reviews, SyntheticSource};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Marketplaces with a registered review source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Marketplace {
    Amazon,
    Ebay,
    Walmart,
}

impl Marketplace {
    /// Returns the canonical slug stored on reviews.
    pub fn slug(&self) -> &'static str {
        match self {
            Marketplace::Amazon => "amazon",
            Marketplace::Ebay => "ebay",
            Marketplace::Walmart => "walmart",
        }
    }

    /// Returns the human-readable marketplace name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Marketplace::Amazon => "Amazon",
            Marketplace::Ebay => "eBay",
            Marketplace::Walmart => "Walmart",
        }
    }

    /// Returns the marketplace's primary domain.
    pub fn domain(&self) -> &'static str {
        match self {
            Marketplace::Amazon => "amazon.com",
            Marketplace::Ebay => "ebay.com",
            Marketplace::Walmart => "walmart.com",
        }
    }

    /// Returns all supported marketplaces.
    pub fn all() -> &'static [Marketplace] {
        &[Marketplace::Amazon, Marketplace::Ebay, Marketplace::Walmart]
    }
}

impl fmt::Display for Marketplace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

impl FromStr for Marketplace {
    type Err = MarketplaceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "amazon" | "amazon.com" => Ok(Marketplace::Amazon),
            "ebay" | "ebay.com" => Ok(Marketplace::Ebay),
            "walmart" | "walmart.com" => Ok(Marketplace::Walmart),
            _ => Err(MarketplaceParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MarketplaceParseError(String);

impl fmt::Display for MarketplaceParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown marketplace '{}'. Valid marketplaces: amazon, ebay, walmart", self.0)
    }
}

impl std::error::Error for MarketplaceParseError {}
