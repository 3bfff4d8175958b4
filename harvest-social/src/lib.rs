//! Social network extractors used by harvest.
//!
//! Only public Facebook posts are supported. Retrieval is delegated to a
//! hosted post-scraping actor; this crate turns its loosely shaped dataset
//! item into one text blob with optional link and image manifests.
pub mod facebook;

pub use facebook::SocialPostExtractor;
