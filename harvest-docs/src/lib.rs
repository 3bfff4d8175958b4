//! Hosted document extraction (pdf and office files).
//!
//! The document is never downloaded here: its URL is handed to a text
//! extraction actor and whatever text comes back is wrapped in a fixed
//! envelope recording the source and the character count.
use async_trait::async_trait;
use harvest_apify::ApifyClient;
use harvest_common::{Category, ContentExtractor, HarvestError, Result};
use harvest_config::{ActorServiceSettings, DEFAULT_DOCUMENT_ACTOR, credential};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

pub const CONTENT_HEADER: &str = "NỘI DUNG TÀI LIỆU:";
pub const NO_TEXT_PLACEHOLDER: &str = "Không thể trích xuất nội dung";
pub const INFO_HEADER: &str = "THÔNG TIN:";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DocumentItem {
    text: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DocumentExtractor {
    settings: ActorServiceSettings,
}

impl DocumentExtractor {
    pub fn new(settings: ActorServiceSettings) -> Self {
        Self { settings }
    }

    fn client(&self) -> Result<ApifyClient> {
        let token = credential(&self.settings.api_token).ok_or_else(|| {
            HarvestError::Configuration("document.api_token is not set".to_string())
        })?;
        let client = match self.settings.endpoint.as_deref() {
            Some(base) => ApifyClient::with_base(base, token),
            None => ApifyClient::new(token),
        }
        .map_err(|e| HarvestError::Configuration(format!("document.endpoint: {e}")))?;
        Ok(client.with_run_timeout(Duration::from_secs(self.settings.timeout_secs)))
    }

    /// Extract the text of the document at `url` and wrap it in the envelope.
    pub async fn extract_document(&self, url: &str) -> Result<String> {
        let client = self.client()?;
        let actor = self
            .settings
            .actor
            .as_deref()
            .unwrap_or(DEFAULT_DOCUMENT_ACTOR);
        let input = json!({
            "urls": [url],
            "performChunking": false,
        });

        let items: Vec<DocumentItem> = client
            .run_sync_dataset_items(actor, &input)
            .await
            .map_err(|e| {
                HarvestError::Retrieval(format!("document extractor failed for {url}: {e}"))
            })?;

        if items.is_empty() {
            return Err(HarvestError::Retrieval(format!(
                "document extractor returned no items for {url}"
            )));
        }

        let text = items
            .iter()
            .filter_map(|item| item.text.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");

        tracing::info!(
            target: "docs",
            %url,
            items = items.len(),
            chars = text.chars().count(),
            "docs.extract.success"
        );
        Ok(envelope(url, &text))
    }
}

/// Content section, then source and character count.
pub fn envelope(url: &str, text: &str) -> String {
    let body = if text.is_empty() {
        NO_TEXT_PLACEHOLDER
    } else {
        text
    };
    format!(
        "{CONTENT_HEADER}\n\n{body}\n\n{INFO_HEADER}\nNguồn: {url}\nSố ký tự: {}",
        text.chars().count()
    )
}

#[async_trait]
impl ContentExtractor for DocumentExtractor {
    fn category(&self) -> Category {
        Category::Document
    }

    async fn extract(&self, url: &str) -> Result<String> {
        self.extract_document(url).await
    }
}
