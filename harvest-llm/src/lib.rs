//! Provider‑agnostic LLM integration for harvest.
//!
//! This crate exposes a common [`traits::LlmClient`] interface and concrete
//! provider implementations for Gemini and OpenAI. [`build_llm_client`] turns
//! the `llm` section of the configuration into a ready client.
//!
//! # Examples
//! ```no_run
//! use harvest_config::{LlmProvider, LlmSettings};
//! use harvest_llm::build_llm_client;
//!
//! let settings = LlmSettings {
//!     provider: LlmProvider::Gemini {
//!         api_key: Some("secret".into()),
//!         model: "gemini-2.0-flash".into(),
//!         endpoint: None,
//!         temperature: None,
//!         max_tokens: None,
//!     },
//!     max_input_chars: 30_000,
//! };
//! let client = build_llm_client(&settings).unwrap();
//! assert_eq!(client.model_name(), "gemini-2.0-flash");
//! ```
pub mod gemini;
pub mod openai;
pub mod traits;

use gemini::GeminiClient;
use harvest_common::{HarvestError, Result};
use harvest_config::{credential, LlmProvider, LlmSettings};
use openai::OpenAiClient;
use std::sync::Arc;
use traits::LlmClient;

/// Build the configured completion client.
///
/// A missing or unexpanded API key is a [`HarvestError::Configuration`].
pub fn build_llm_client(settings: &LlmSettings) -> Result<Arc<dyn LlmClient + Send + Sync + 'static>> {
    match &settings.provider {
        LlmProvider::Gemini {
            api_key,
            model,
            endpoint,
            ..
        } => {
            let key = credential(api_key)
                .ok_or_else(|| HarvestError::Configuration("llm.api_key is not set".into()))?;
            let client = match endpoint.as_deref() {
                Some(ep) => GeminiClient::with_endpoint(ep, key.to_string(), model.clone())?,
                None => GeminiClient::new(key.to_string(), model.clone())?,
            };
            Ok(Arc::new(client))
        }
        LlmProvider::Openai {
            api_key,
            model,
            endpoint,
            ..
        } => {
            let key = credential(api_key)
                .ok_or_else(|| HarvestError::Configuration("llm.api_key is not set".into()))?;
            let client = match endpoint.as_deref() {
                Some(ep) => OpenAiClient::with_endpoint(ep, key.to_string(), model.clone())?,
                None => OpenAiClient::new(key.to_string(), model.clone())?,
            };
            Ok(Arc::new(client))
        }
    }
}

/// Sampling options the configuration attaches to the provider.
pub fn generation_options(settings: &LlmSettings) -> (Option<u32>, Option<f32>) {
    match &settings.provider {
        LlmProvider::Gemini {
            max_tokens,
            temperature,
            ..
        }
        | LlmProvider::Openai {
            max_tokens,
            temperature,
            ..
        } => (*max_tokens, *temperature),
    }
}
