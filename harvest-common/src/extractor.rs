use crate::{Category, Result};
use async_trait::async_trait;

/// One retrieval strategy: turns a URL into raw text.
///
/// Implementations own their remote collaborators and any per-call
/// resources (browser sessions, HTTP clients). Missing credentials are a
/// [`crate::HarvestError::Configuration`]; anything that prevents readable
/// output is a [`crate::HarvestError::Retrieval`].
#[async_trait]
pub trait ContentExtractor: Send + Sync {
    /// The category this extractor serves.
    fn category(&self) -> Category;

    async fn extract(&self, url: &str) -> Result<String>;
}
