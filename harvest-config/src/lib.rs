//! Loader for harvest configuration with YAML + environment overlays.
//!
//! Sources are merged in order: an optional YAML file, inline YAML snippets,
//! then `HARVEST__`-prefixed environment variables (`HARVEST__SOCIAL__API_TOKEN`
//! overrides `social.api_token`). After merging, every string value has
//! `${VAR}` placeholders expanded against the process environment.
//!
//! Every field carries a default, so an empty document is a valid config.
//! Credentials are kept as `Option<String>`; use [`credential`] to read them,
//! which treats blank or unresolved placeholders as absent.
use config::{Config, ConfigError, Environment, File};
use harvest_common::observability::LogFormat;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    pub browser: BrowserSettings,
    pub extraction: ExtractionSettings,
    pub social: ActorServiceSettings,
    pub document: ActorServiceSettings,
    pub llm: Option<LlmSettings>,
    pub logging: LoggingSettings,
}

impl HarvestConfig {
    /// The document section falls back to its own default actor when unset.
    pub fn document_actor(&self) -> &str {
        self.document
            .actor
            .as_deref()
            .unwrap_or(DEFAULT_DOCUMENT_ACTOR)
    }

    pub fn social_actor(&self) -> &str {
        self.social.actor.as_deref().unwrap_or(DEFAULT_SOCIAL_ACTOR)
    }
}

pub const DEFAULT_SOCIAL_ACTOR: &str = "apify~facebook-posts-scraper";
pub const DEFAULT_DOCUMENT_ACTOR: &str = "jirimoravcik~pdf-text-extractor";

/// WebDriver session and timing knobs for the browser strategy.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    pub webdriver_url: String,
    pub headless: bool,
    pub navigation_timeout_secs: u64,
    pub script_timeout_secs: u64,
    /// Unconditional wait after DOM construction for interstitials to resolve.
    pub settle_wait_ms: u64,
    /// Extra wait when the rendered markup still shows a challenge page.
    pub challenge_wait_ms: u64,
    pub scroll_pause_ms: u64,
    pub screenshot_dir: Option<PathBuf>,
    pub profile: ProfileSettings,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".into(),
            headless: true,
            navigation_timeout_secs: 60,
            script_timeout_secs: 30,
            settle_wait_ms: 8_000,
            challenge_wait_ms: 10_000,
            scroll_pause_ms: 1_500,
            screenshot_dir: None,
            profile: ProfileSettings::default(),
        }
    }
}

/// Optional overrides for the browser identity; unset fields keep the built-in profile.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfileSettings {
    pub user_agent: Option<String>,
    pub viewport: Option<(u32, u32)>,
    pub locale: Option<String>,
    pub languages: Option<Vec<String>>,
    pub timezone: Option<String>,
    pub accept_language: Option<String>,
    pub platform: Option<String>,
}

/// Content-isolation thresholds. The defaults are empirical.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractionSettings {
    pub min_title_chars: usize,
    pub min_fragment_chars: usize,
    pub min_body_chars: usize,
    pub fallback_paragraph_chars: usize,
    pub fallback_max_paragraphs: usize,
    pub include_blockquote: bool,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            min_title_chars: 10,
            min_fragment_chars: 20,
            min_body_chars: 100,
            fallback_paragraph_chars: 50,
            fallback_max_paragraphs: 20,
            include_blockquote: true,
        }
    }
}

/// A hosted scraping actor reached with an API token.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ActorServiceSettings {
    pub api_token: Option<String>,
    pub actor: Option<String>,
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ActorServiceSettings {
    fn default() -> Self {
        Self {
            api_token: None,
            actor: None,
            endpoint: None,
            timeout_secs: 180,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    #[serde(flatten)]
    pub provider: LlmProvider,
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum LlmProvider {
    Gemini {
        #[serde(default)]
        api_key: Option<String>,
        #[serde(default = "default_gemini_model")]
        model: String,
        #[serde(default)]
        endpoint: Option<String>,
        #[serde(default)]
        temperature: Option<f32>,
        #[serde(default)]
        max_tokens: Option<u32>,
    },
    Openai {
        #[serde(default)]
        api_key: Option<String>,
        #[serde(default = "default_openai_model")]
        model: String,
        #[serde(default)]
        endpoint: Option<String>,
        #[serde(default)]
        temperature: Option<f32>,
        #[serde(default)]
        max_tokens: Option<u32>,
    },
}

fn default_max_input_chars() -> usize {
    30_000
}
fn default_gemini_model() -> String {
    "gemini-2.0-flash".into()
}
fn default_openai_model() -> String {
    "gpt-4o-mini".into()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub app_name: String,
    pub dir: Option<PathBuf>,
    pub format: LogFormat,
    pub stderr: bool,
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            app_name: "harvest".into(),
            dir: None,
            format: LogFormat::Text,
            stderr: false,
            filter: "info".into(),
        }
    }
}

/// Read a credential, treating blank strings and unexpanded `${VAR}` as absent.
///
/// ```
/// use harvest_config::credential;
///
/// assert_eq!(credential(&Some("abc".into())), Some("abc"));
/// assert_eq!(credential(&Some("  ".into())), None);
/// assert_eq!(credential(&Some("${APIFY_TOKEN}".into())), None);
/// assert_eq!(credential(&None), None);
/// ```
pub fn credential(raw: &Option<String>) -> Option<&str> {
    let value = raw.as_deref()?.trim();
    if value.is_empty() || (value.contains("${") && value.contains('}')) {
        return None;
    }
    Some(value)
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring (YAML + env overrides).
pub struct HarvestConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for HarvestConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl HarvestConfigLoader {
    /// Start with an empty source list; `HARVEST__` env overrides are applied last.
    ///
    /// ```
    /// use harvest_config::HarvestConfigLoader;
    ///
    /// let config = HarvestConfigLoader::new()
    ///     .with_yaml_str("browser:\n  settle_wait_ms: 500")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.browser.settle_wait_ms, 500);
    /// assert_eq!(config.browser.challenge_wait_ms, 10_000);
    /// assert!(config.llm.is_none());
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a required YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that may be missing, for deployments configured purely by env.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources.
    ///
    /// ```
    /// use harvest_config::{HarvestConfigLoader, LlmProvider, credential};
    ///
    /// unsafe { std::env::set_var("DOC_GEMINI_KEY", "injected-from-env"); }
    ///
    /// let config = HarvestConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// llm:
    ///   provider: gemini
    ///   api_key: "${DOC_GEMINI_KEY}"
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// let llm = config.llm.expect("llm section");
    /// assert_eq!(llm.max_input_chars, 30_000);
    /// match &llm.provider {
    ///     LlmProvider::Gemini { api_key, model, .. } => {
    ///         assert_eq!(credential(api_key), Some("injected-from-env"));
    ///         assert_eq!(model, "gemini-2.0-flash");
    ///     }
    ///     _ => panic!("expected Gemini configuration"),
    /// }
    ///
    /// unsafe { std::env::remove_var("DOC_GEMINI_KEY"); }
    /// ```
    pub fn load(self) -> Result<HarvestConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("HARVEST")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        if v.is_null() {
            v = Value::Object(Default::default());
        }
        expand_env_in_value(&mut v);

        serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_in_array_and_object() {
        temp_env::with_vars([("CITY", Some("Hanoi")), ("ZONE", Some("ICT"))], || {
            let mut v = json!(["at-$CITY", { "tz": "${CITY}-${ZONE}" }, 42, true, null]);
            expand_env_in_value(&mut v);
            assert_eq!(v, json!(["at-Hanoi", { "tz": "Hanoi-ICT" }, 42, true, null]));
        });
    }

    #[test]
    fn expands_recursively_across_env_values() {
        temp_env::with_vars(
            [
                ("BAZ", Some("qux")),
                ("BAR", Some("mid-${BAZ}")),
                ("FOO", Some("start-${BAR}-end")),
            ],
            || {
                let mut v = json!("X=${FOO}");
                expand_env_in_value(&mut v);
                assert_eq!(v, json!("X=start-mid-qux-end"));
            },
        );
    }

    #[test]
    fn stops_on_cycles() {
        temp_env::with_vars([("A", Some("${B}")), ("B", Some("${A}"))], || {
            let mut v = json!("x=${A}-y");
            expand_env_in_value(&mut v);
            let s = v.as_str().unwrap();
            assert!(s.starts_with("x=") && s.ends_with("-y"));
            assert!(s.contains("${"));
        });
    }

    #[test]
    fn unresolved_placeholder_is_not_a_credential() {
        let mut v = json!("${HARVEST_TEST_DOES_NOT_EXIST}");
        expand_env_in_value(&mut v);
        let raw = Some(v.as_str().unwrap().to_string());
        assert_eq!(credential(&raw), None);
    }

    #[test]
    fn empty_document_yields_defaults() {
        let cfg = HarvestConfigLoader::new().with_yaml_str("{}").load().unwrap();
        assert_eq!(cfg.extraction.min_title_chars, 10);
        assert_eq!(cfg.extraction.min_fragment_chars, 20);
        assert_eq!(cfg.extraction.min_body_chars, 100);
        assert_eq!(cfg.extraction.fallback_paragraph_chars, 50);
        assert_eq!(cfg.extraction.fallback_max_paragraphs, 20);
        assert_eq!(cfg.browser.settle_wait_ms, 8_000);
        assert_eq!(cfg.social_actor(), DEFAULT_SOCIAL_ACTOR);
        assert_eq!(cfg.document_actor(), DEFAULT_DOCUMENT_ACTOR);
        assert!(cfg.social.api_token.is_none());
    }
}
