use async_trait::async_trait;
use harvest_apify::ApifyClient;
use harvest_common::{Category, ContentExtractor, HarvestError, Result};
use harvest_config::{ActorServiceSettings, DEFAULT_SOCIAL_ACTOR, credential};
use serde_json::json;
use std::time::Duration;

use crate::facebook::extract::render_post;
use crate::facebook::types::FacebookPost;

/// Fetches a single public post through the scraping actor and renders it.
#[derive(Debug, Clone)]
pub struct SocialPostExtractor {
    settings: ActorServiceSettings,
}

impl SocialPostExtractor {
    pub fn new(settings: ActorServiceSettings) -> Self {
        Self { settings }
    }

    fn client(&self) -> Result<ApifyClient> {
        let token = credential(&self.settings.api_token).ok_or_else(|| {
            HarvestError::Configuration("social.api_token is not set".to_string())
        })?;
        let client = match self.settings.endpoint.as_deref() {
            Some(base) => ApifyClient::with_base(base, token),
            None => ApifyClient::new(token),
        }
        .map_err(|e| HarvestError::Configuration(format!("social.endpoint: {e}")))?;
        Ok(client.with_run_timeout(Duration::from_secs(self.settings.timeout_secs)))
    }

    fn actor(&self) -> &str {
        self.settings.actor.as_deref().unwrap_or(DEFAULT_SOCIAL_ACTOR)
    }

    /// Retrieve and render the post at `url`.
    pub async fn extract_social_post(&self, url: &str) -> Result<String> {
        let client = self.client()?;
        let input = json!({
            "startUrls": [{ "url": url }],
            "resultsLimit": 1,
        });

        let items: Vec<FacebookPost> = client
            .run_sync_dataset_items(self.actor(), &input)
            .await
            .map_err(|e| HarvestError::Retrieval(format!("post scraper failed for {url}: {e}")))?;

        let post = items
            .into_iter()
            .next()
            .ok_or_else(|| HarvestError::Retrieval(format!("post scraper returned no items for {url}")))?;

        let text = render_post(&post, url);
        tracing::info!(target: "social", %url, chars = text.chars().count(), "social.post.extracted");
        Ok(text)
    }
}

#[async_trait]
impl ContentExtractor for SocialPostExtractor {
    fn category(&self) -> Category {
        Category::Social
    }

    async fn extract(&self, url: &str) -> Result<String> {
        self.extract_social_post(url).await
    }
}
