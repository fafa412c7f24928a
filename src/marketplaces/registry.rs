//! Lookup from marketplace to the source that extracts its reviews.

use crate::marketplaces::{Marketplace, ReviewSource, SyntheticSource};
use std::collections::HashMap;
use std::sync::Arc;

/// The set of review sources available to an aggregation run.
pub struct SourceRegistry {
    sources: HashMap<Marketplace, Arc<dyn ReviewSource>>,
}

impl SourceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self { sources: HashMap::new() }
    }

    /// Creates a registry with a synthetic source for every marketplace.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for marketplace in Marketplace::all() {
            registry.register(SyntheticSource::new(*marketplace));
        }
        registry
    }

    /// Registers a source, replacing any previous one for its marketplace.
    pub fn register(&mut self, source: impl ReviewSource + 'static) -> &mut Self {
        self.sources.insert(source.marketplace(), Arc::new(source));
        self
    }

    /// Returns the source for a marketplace.
    pub fn get(&self, marketplace: Marketplace) -> Option<Arc<dyn ReviewSource>> {
        self.sources.get(&marketplace).cloned()
    }

    /// Returns registered marketplaces in declaration order.
    pub fn marketplaces(&self) -> Vec<Marketplace> {
        Marketplace::all().iter().copied().filter(|m| self.sources.contains_key(m)).collect()
    }

    /// Returns true if no sources are registered.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Returns the number of registered sources.
    pub fn len(&self) -> usize {
        self.sources.len()
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reviews::Review;
    use anyhow::Result;
    use async_trait::async_trait;

    struct CannedSource {
        marketplace: Marketplace,
        reviews: Vec<Review>,
    }

    #[async_trait]
    impl ReviewSource for CannedSource {
        async fn extract(&self, _product_url: &str, _max_reviews: usize) -> Result<Vec<Review>> {
            Ok(self.reviews.clone())
        }

        fn marketplace(&self) -> Marketplace {
            self.marketplace
        }
    }

    #[test]
    fn test_empty_registry() {
        let registry = SourceRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(registry.get(Marketplace::Amazon).is_none());
        assert!(registry.marketplaces().is_empty());
    }

    #[test]
    fn test_default_registry_covers_all_marketplaces() {
        let registry = SourceRegistry::with_defaults();
        assert_eq!(registry.len(), Marketplace::all().len());
        assert_eq!(registry.marketplaces(), Marketplace::all().to_vec());
        for marketplace in Marketplace::all() {
            let source = registry.get(*marketplace).unwrap();
            assert_eq!(source.marketplace(), *marketplace);
        }
    }

    #[tokio::test]
    async fn test_register_replaces_existing() {
        let mut registry = SourceRegistry::with_defaults();
        registry.register(CannedSource { marketplace: Marketplace::Ebay, reviews: Vec::new() });

        assert_eq!(registry.len(), 3);
        let source = registry.get(Marketplace::Ebay).unwrap();
        let reviews = source.extract("p1", 10).await.unwrap();
        assert!(reviews.is_empty());
    }
}
