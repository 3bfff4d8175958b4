use harvest_common::observability::LogFormat;
use harvest_config::{HarvestConfigLoader, LlmProvider, credential};
use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

const FILE_YAML: &str = r#"
browser:
  webdriver_url: "http://chromedriver:9515"
  headless: true
  settle_wait_ms: 8000
  profile:
    timezone: "Asia/Ho_Chi_Minh"
    viewport: [1366, 768]
extraction:
  min_body_chars: 120
social:
  api_token: "${APIFY_API_TOKEN}"
document:
  api_token: "${APIFY_API_TOKEN}"
  timeout_secs: 240
llm:
  provider: openai
  api_key: "${OPENAI_API_KEY}"
  temperature: 0.2
  max_input_chars: 12000
logging:
  format: json
  stderr: true
"#;

#[test]
#[serial]
fn file_sources_expand_credentials_from_env() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(&tmp, "harvest.yaml", FILE_YAML);

    temp_env::with_vars(
        [
            ("APIFY_API_TOKEN", Some("apify-secret")),
            ("OPENAI_API_KEY", Some("sk-test")),
        ],
        || {
            let config = HarvestConfigLoader::new()
                .with_file(&p)
                .load()
                .expect("load harvest config");

            assert_eq!(config.browser.webdriver_url, "http://chromedriver:9515");
            assert_eq!(config.browser.profile.viewport, Some((1366, 768)));
            assert_eq!(config.extraction.min_body_chars, 120);
            assert_eq!(config.extraction.min_title_chars, 10);
            assert_eq!(credential(&config.social.api_token), Some("apify-secret"));
            assert_eq!(config.document.timeout_secs, 240);
            assert_eq!(config.logging.format, LogFormat::Json);

            let llm = config.llm.expect("llm section");
            assert_eq!(llm.max_input_chars, 12_000);
            match llm.provider {
                LlmProvider::Openai {
                    api_key,
                    model,
                    temperature,
                    ..
                } => {
                    assert_eq!(credential(&api_key), Some("sk-test"));
                    assert_eq!(model, "gpt-4o-mini");
                    assert_eq!(temperature, Some(0.2));
                }
                other => panic!("expected openai provider, got {other:?}"),
            }
        },
    );
}

#[test]
#[serial]
fn missing_env_leaves_credentials_absent() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(&tmp, "harvest.yaml", FILE_YAML);

    temp_env::with_vars_unset(["APIFY_API_TOKEN", "OPENAI_API_KEY"], || {
        let config = HarvestConfigLoader::new().with_file(&p).load().unwrap();
        assert_eq!(credential(&config.social.api_token), None);
        assert_eq!(credential(&config.document.api_token), None);
    });
}

#[test]
#[serial]
fn prefixed_env_overrides_file_values() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(&tmp, "harvest.yaml", FILE_YAML);

    temp_env::with_vars(
        [
            ("HARVEST__BROWSER__SETTLE_WAIT_MS", Some("250")),
            ("HARVEST__SOCIAL__ACTOR", Some("custom~posts")),
        ],
        || {
            let config = HarvestConfigLoader::new().with_file(&p).load().unwrap();
            assert_eq!(config.browser.settle_wait_ms, 250);
            assert_eq!(config.social_actor(), "custom~posts");
        },
    );
}

#[test]
#[serial]
fn optional_file_may_be_missing() {
    let tmp = TempDir::new().unwrap();
    let config = HarvestConfigLoader::new()
        .with_optional_file(tmp.path().join("absent.yaml"))
        .load()
        .expect("missing optional file is fine");
    assert!(config.browser.headless);
}
