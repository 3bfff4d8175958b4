//! Driver layer for browser automation.
//!
//! This crate exposes the WebDriver session and page helpers used by the
//! generic-web extractor to render pages the way a desktop browser would.
//!
//! - [`harvest_browser::driver::HarvestDriver`]: WebDriver session wrapper
//! - [`harvest_browser::page::HarvestPage`]: navigation, scrolling, DOM source
//! - [`harvest_browser::behavioral::BehavioralEngine`]: timed waits and pauses
//! - [`harvest_browser::evasion::EvasionProfile`]: declarative browser identity
pub mod harvest_browser;
