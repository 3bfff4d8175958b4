//! Completion-backed condensing of extracted text.
//!
//! Normalization never fails outward. Whatever goes wrong (no client
//! configured, a provider error, an empty answer) is logged and the raw input
//! is returned unchanged.

use harvest_common::{HarvestError, Result};
use harvest_config::LlmSettings;
use harvest_llm::traits::LlmClient;
use harvest_llm::{build_llm_client, generation_options};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

pub const DEFAULT_MAX_INPUT_CHARS: usize = 30_000;

pub const NORMALIZE_INSTRUCTIONS: &str = r#"You condense crawled web content into a clean plain-text brief.

Rules:
- Keep every URL exactly as written. Never shorten, rewrite or drop a link.
- Remove navigation text, ads, cookie notices, share prompts and anything unrelated to the main content.
- Keep facts, names, dates, figures and labelled metadata lines such as "Ngày đăng:" or "Nguồn:".
- Aim for no more than about 300 words.
- Output plain text only: no markdown headings, bold, tables or code fences.
- Start every bullet with "- " and use no other bullet marker.
- Write in the language of the source text."#;

enum Backend {
    Client(Arc<dyn LlmClient + Send + Sync>),
    /// No usable client; the reason is logged on every pass-through.
    Unavailable(String),
}

pub struct Normalizer {
    backend: Backend,
    max_input_chars: usize,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

impl Normalizer {
    pub fn new(client: Arc<dyn LlmClient + Send + Sync>) -> Self {
        Self {
            backend: Backend::Client(client),
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            max_tokens: None,
            temperature: None,
        }
    }

    /// A normalizer that always passes text through, logging `reason`.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            backend: Backend::Unavailable(reason.into()),
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            max_tokens: None,
            temperature: None,
        }
    }

    /// Build from the `llm` config section. Missing section or credential
    /// yields a pass-through normalizer rather than an error.
    pub fn from_settings(settings: Option<&LlmSettings>) -> Self {
        let Some(settings) = settings else {
            return Self::unavailable("no llm section configured");
        };
        let (max_tokens, temperature) = generation_options(settings);
        let normalizer = match build_llm_client(settings) {
            Ok(client) => Self::new(client),
            Err(e) => {
                warn!(target: "normalize", error = %e, "normalize.client.unavailable");
                Self::unavailable(e.to_string())
            }
        };
        Self {
            max_input_chars: settings.max_input_chars,
            max_tokens,
            temperature,
            ..normalizer
        }
    }

    pub fn with_max_input_chars(mut self, n: usize) -> Self {
        self.max_input_chars = n;
        self
    }

    pub fn is_available(&self) -> bool {
        matches!(self.backend, Backend::Client(_))
    }

    /// Condensed text, or `raw` unchanged if condensing failed for any reason.
    pub async fn normalize(&self, raw: &str) -> String {
        let started = Instant::now();
        match self.try_normalize(raw).await {
            Ok(text) => {
                info!(
                    target: "normalize",
                    input_chars = raw.chars().count(),
                    output_chars = text.chars().count(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "normalize.success"
                );
                text
            }
            Err(e) => {
                warn!(target: "normalize", error = %e, "normalize.passthrough");
                raw.to_string()
            }
        }
    }

    async fn try_normalize(&self, raw: &str) -> Result<String> {
        let client = match &self.backend {
            Backend::Client(client) => client,
            Backend::Unavailable(reason) => {
                return Err(HarvestError::Configuration(reason.clone()));
            }
        };

        let input = truncate_chars(raw, self.max_input_chars);
        if input.len() < raw.len() {
            info!(
                target: "normalize",
                kept_chars = self.max_input_chars,
                "normalize.input.truncated"
            );
        }

        let response = client
            .generate(
                input,
                Some(NORMALIZE_INSTRUCTIONS),
                self.max_tokens,
                self.temperature,
            )
            .await?;

        let text = response.text.trim();
        if text.is_empty() {
            return Err(HarvestError::completion("empty completion"));
        }
        Ok(text.to_string())
    }
}

/// Longest prefix of `s` holding at most `max` characters.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use harvest_llm::traits::LlmResponse;
    use std::sync::Mutex;

    struct Scripted {
        reply: Result<String>,
        prompts: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(reply: Result<String>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LlmClient for Scripted {
        async fn generate(
            &self,
            prompt: &str,
            system_prompt: Option<&str>,
            _max_tokens: Option<u32>,
            _temperature: Option<f32>,
        ) -> Result<LlmResponse> {
            assert_eq!(system_prompt, Some(NORMALIZE_INSTRUCTIONS));
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Ok(text) => Ok(LlmResponse {
                    text: text.clone(),
                    model: None,
                    tokens_used: None,
                }),
                Err(e) => Err(HarvestError::completion(e)),
            }
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    #[tokio::test]
    async fn returns_trimmed_completion() {
        let llm = Scripted::new(Ok("  - gọn gàng https://a.vn/x \n".into()));
        let n = Normalizer::new(llm.clone());
        assert_eq!(n.normalize("raw text").await, "- gọn gàng https://a.vn/x");
        assert_eq!(llm.prompts.lock().unwrap().as_slice(), ["raw text"]);
    }

    #[tokio::test]
    async fn provider_error_returns_input_unchanged() {
        let raw = "  original\n\nwith spacing  ";
        let n = Normalizer::new(Scripted::new(Err(HarvestError::completion("503"))));
        assert_eq!(n.normalize(raw).await, raw);
    }

    #[tokio::test]
    async fn empty_completion_returns_input_unchanged() {
        let n = Normalizer::new(Scripted::new(Ok("   ".into())));
        assert_eq!(n.normalize("keep me").await, "keep me");
    }

    #[tokio::test]
    async fn unavailable_backend_passes_through() {
        let n = Normalizer::from_settings(None);
        assert!(!n.is_available());
        assert_eq!(n.normalize("as is").await, "as is");
    }

    #[tokio::test]
    async fn long_input_is_truncated_before_sending() {
        let llm = Scripted::new(Ok("short".into()));
        let n = Normalizer::new(llm.clone()).with_max_input_chars(5);
        n.normalize("Tiếng Việt có dấu").await;
        assert_eq!(llm.prompts.lock().unwrap()[0], "Tiếng");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("ngày", 3), "ngà");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }
}
