use harvest_common::{Category, ContentExtractor, HarvestError, Result};
use harvest_config::HarvestConfig;
use harvest_docs::DocumentExtractor;
use harvest_social::SocialPostExtractor;
use harvest_web::WebPageExtractor;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::classify::classify;
use crate::normalizer::Normalizer;

/// One extractor per category.
#[derive(Clone)]
pub struct Extractors {
    pub social: Arc<dyn ContentExtractor>,
    pub document: Arc<dyn ContentExtractor>,
    pub web: Arc<dyn ContentExtractor>,
}

impl Extractors {
    pub fn from_config(cfg: &HarvestConfig) -> Self {
        Self {
            social: Arc::new(SocialPostExtractor::new(cfg.social.clone())),
            document: Arc::new(DocumentExtractor::new(cfg.document.clone())),
            web: Arc::new(WebPageExtractor::new(
                cfg.browser.clone(),
                cfg.extraction.clone(),
            )),
        }
    }

    pub fn for_category(&self, category: Category) -> &dyn ContentExtractor {
        match category {
            Category::Social => self.social.as_ref(),
            Category::Document => self.document.as_ref(),
            Category::GenericWeb => self.web.as_ref(),
        }
    }
}

/// Classify, extract, normalize.
///
/// Extraction failures propagate unchanged; normalization never fails.
/// Each call owns its own extraction resources, so one `Pipeline` can serve
/// concurrent calls. Capping that concurrency is the caller's job.
pub struct Pipeline {
    extractors: Extractors,
    normalizer: Normalizer,
}

impl Pipeline {
    pub fn new(extractors: Extractors, normalizer: Normalizer) -> Self {
        Self {
            extractors,
            normalizer,
        }
    }

    pub fn from_config(cfg: &HarvestConfig) -> Self {
        Self::new(
            Extractors::from_config(cfg),
            Normalizer::from_settings(cfg.llm.as_ref()),
        )
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Crawl `url` and return normalized text.
    ///
    /// Without a `category` hint the URL is classified first.
    pub async fn run(&self, url: &str, category: Option<Category>) -> Result<String> {
        let started = Instant::now();
        let (category, raw) = self.extract(url, category).await?;
        let text = self.normalizer.normalize(&raw).await;
        info!(
            target: "pipeline",
            %url,
            %category,
            raw_chars = raw.chars().count(),
            chars = text.chars().count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "pipeline.run.finish"
        );
        Ok(text)
    }

    /// [`Pipeline::run`] with the category given as its wire tag.
    ///
    /// A tag naming no strategy fails with `UnknownCategory` before any
    /// retrieval happens.
    pub async fn run_tagged(&self, url: &str, tag: Option<&str>) -> Result<String> {
        let category = tag.map(str::parse::<Category>).transpose()?;
        self.run(url, category).await
    }

    /// Resolve the category and run its extractor, skipping normalization.
    pub async fn extract(&self, url: &str, hint: Option<Category>) -> Result<(Category, String)> {
        let category = hint.unwrap_or_else(|| classify(url));
        info!(
            target: "pipeline",
            %url,
            %category,
            hinted = hint.is_some(),
            "pipeline.run.start"
        );

        let extractor = self.extractors.for_category(category);
        if extractor.category() != category {
            return Err(HarvestError::Configuration(format!(
                "{} extractor registered in the {category} slot",
                extractor.category()
            )));
        }
        match extractor.extract(url).await {
            Ok(raw) => {
                info!(
                    target: "pipeline",
                    %url,
                    %category,
                    chars = raw.chars().count(),
                    "pipeline.run.extracted"
                );
                Ok((category, raw))
            }
            Err(e) => {
                warn!(target: "pipeline", %url, %category, error = %e, "pipeline.run.error");
                Err(e)
            }
        }
    }
}
