//! Facebook post retrieval surface.
//!
//! [`client`] runs the scraping actor, [`types`] models its dataset items and
//! [`extract`] renders one item into text.
pub mod client;
pub mod extract;
pub mod types;

pub use client::SocialPostExtractor;
