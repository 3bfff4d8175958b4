//! Crawl pipeline: classify a URL, run the matching extractor, normalize.
//!
//! ```no_run
//! use harvest_config::HarvestConfigLoader;
//! use harvest_pipeline::Pipeline;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = HarvestConfigLoader::new().with_optional_file("harvest.yaml").load()?;
//! let pipeline = Pipeline::from_config(&cfg);
//! let text = pipeline.run_tagged("https://example.com/news/1", Some("GENERIC_WEB")).await?;
//! println!("{text}");
//! # Ok(())
//! # }
//! ```
pub mod classify;
pub mod normalizer;
pub mod orchestrator;

pub use classify::classify;
pub use normalizer::Normalizer;
pub use orchestrator::{Extractors, Pipeline};
