//! Needs a chromedriver listening on `HARVEST_WEBDRIVER_URL`
//! (default `http://localhost:9515`). Run with `--features e2e -- --ignored`.
#![cfg(feature = "e2e")]

use harvest_config::{BrowserSettings, ExtractionSettings};
use harvest_web::WebPageExtractor;

#[tokio::test]
#[ignore]
async fn renders_and_extracts_a_live_page() {
    let browser = BrowserSettings {
        webdriver_url: std::env::var("HARVEST_WEBDRIVER_URL")
            .unwrap_or_else(|_| "http://localhost:9515".to_string()),
        settle_wait_ms: 1_000,
        challenge_wait_ms: 1_000,
        scroll_pause_ms: 200,
        ..BrowserSettings::default()
    };
    let extractor = WebPageExtractor::new(browser, ExtractionSettings::default());

    let text = extractor
        .extract_web_page("https://example.com/")
        .await
        .expect("example.com should render");
    assert!(text.contains("Example Domain"));
}
