//! Common types and utilities shared across harvest crates.
//!
//! This crate defines the crawl category tag, the shared error type, and
//! the observability helpers used throughout the workspace. It is kept
//! dependency‑minimal so that every crate can depend on it without
//! pulling in the browser or HTTP stacks.
//!
//! # Overview
//!
//! - [`Category`]: which retrieval strategy handles a URL
//! - [`ContentExtractor`]: the seam every retrieval strategy implements
//! - [`observability`]: centralised tracing/logging initialisation
//! - [`HarvestError`] and [`Result`]: shared error handling
//!
//! # Examples
//!
//! Categories travel across process boundaries as their wire tags:
//!
//! ```rust
//! use harvest_common::Category;
//!
//! let c: Category = "DOCUMENT".parse().unwrap();
//! assert_eq!(c, Category::Document);
//! assert_eq!(Category::GenericWeb.to_string(), "GENERIC_WEB");
//! assert!("VIDEO".parse::<Category>().is_err());
//! ```
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod extractor;
pub mod observability;

pub use extractor::ContentExtractor;

/// Retrieval strategy assigned to a URL.
///
/// Assigned once per crawl request and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    /// Social network post, delegated to the post-scraping service.
    Social,
    /// Hosted document (pdf, office files), delegated to the text-extraction service.
    Document,
    /// Anything else: rendered in a real browser and isolated heuristically.
    GenericWeb,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Social, Category::Document, Category::GenericWeb];

    /// The wire tag used when the category crosses a process boundary.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Social => "SOCIAL",
            Category::Document => "DOCUMENT",
            Category::GenericWeb => "GENERIC_WEB",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = HarvestError;

    fn from_str(s: &str) -> Result<Self> {
        let tag = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == tag)
            .ok_or_else(|| HarvestError::UnknownCategory(tag.to_string()))
    }
}

/// Error types used across the harvest pipeline.
#[derive(thiserror::Error, Debug)]
pub enum HarvestError {
    /// A required credential or setting is missing. Fatal, never retried.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Navigation, remote call, or a structurally empty result.
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// The caller supplied a category tag that names no strategy.
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// The completion service failed. Absorbed by the normalizer.
    #[error("Completion error: {0}")]
    Completion(String),
}

impl HarvestError {
    pub fn completion(err: impl fmt::Display) -> Self {
        HarvestError::Completion(err.to_string())
    }
}

/// Convenient alias for results that use [`HarvestError`].
pub type Result<T> = std::result::Result<T, HarvestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_tags_roundtrip_through_serde() {
        let json = serde_json::to_string(&Category::GenericWeb).unwrap();
        assert_eq!(json, "\"GENERIC_WEB\"");
        let back: Category = serde_json::from_str("\"SOCIAL\"").unwrap();
        assert_eq!(back, Category::Social);
    }

    #[test]
    fn unknown_tag_is_reported_verbatim() {
        let err = "social".parse::<Category>().unwrap_err();
        assert!(matches!(err, HarvestError::UnknownCategory(ref t) if t == "social"));
        assert_eq!(err.to_string(), "Unknown category: social");
    }

    #[test]
    fn parsing_trims_surrounding_whitespace() {
        assert_eq!(" DOCUMENT\n".parse::<Category>().unwrap(), Category::Document);
    }
}
