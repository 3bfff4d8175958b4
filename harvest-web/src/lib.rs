//! Browser-rendered page acquisition.
//!
//! - [`browser`]: session lifecycle, challenge wait, scroll pass, screenshot
//! - [`extract`]: selector-cascade content isolation over the rendered source

pub mod browser;
pub mod extract;

pub use browser::WebPageExtractor;
