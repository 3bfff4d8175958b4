use anyhow::Context;
use async_trait::async_trait;
use harvest_common::{Category, ContentExtractor, HarvestError, Result};
use harvest_config::{BrowserSettings, ExtractionSettings, ProfileSettings};
use harvest_drivers::harvest_browser::driver::{DriverSettings, HarvestDriver};
use harvest_drivers::harvest_browser::evasion::EvasionProfile;
use harvest_drivers::harvest_browser::page::{HarvestPage, shows_challenge};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::extract::extract_article;

/// Renders a page in a fresh browser session and isolates its article text.
#[derive(Debug, Clone)]
pub struct WebPageExtractor {
    browser: BrowserSettings,
    rules: ExtractionSettings,
}

impl WebPageExtractor {
    pub fn new(browser: BrowserSettings, rules: ExtractionSettings) -> Self {
        Self { browser, rules }
    }

    fn driver_settings(&self) -> DriverSettings {
        DriverSettings {
            webdriver_url: self.browser.webdriver_url.clone(),
            headless: self.browser.headless,
            navigation_timeout: Duration::from_secs(self.browser.navigation_timeout_secs),
            script_timeout: Duration::from_secs(self.browser.script_timeout_secs),
        }
    }

    /// Render `url` and return headline plus body text.
    ///
    /// The session is closed whether or not rendering succeeded. No retries.
    pub async fn extract_web_page(&self, url: &str) -> Result<String> {
        let started = Instant::now();
        info!(target: "browser", %url, "browser.session.start");

        let driver = HarvestDriver::launch(
            self.driver_settings(),
            evasion_profile(&self.browser.profile),
        )
        .await
        .map_err(|e| HarvestError::Retrieval(format!("{e:#}")))?;

        let rendered = self.render(&driver, url).await;
        if let Err(e) = driver.close().await {
            warn!(target: "browser", %url, error = %e, "browser.session.close_failed");
        }

        let html = rendered.map_err(|e| {
            warn!(target: "browser", %url, error = %format!("{e:#}"), "browser.render.error");
            HarvestError::Retrieval(format!("{e:#}"))
        })?;

        let article = extract_article(&html, &self.rules);
        let used_fallback = article.used_fallback;
        let has_headline = article.headline.is_some();
        let text = article
            .into_text()
            .ok_or_else(|| HarvestError::Retrieval(format!("no readable content at {url}")))?;

        info!(
            target: "browser",
            %url,
            has_headline,
            used_fallback,
            chars = text.chars().count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "browser.extract.success"
        );
        Ok(text)
    }

    async fn render(&self, driver: &HarvestDriver, url: &str) -> anyhow::Result<String> {
        let page = driver.goto(url).await?;
        let engine = &driver.behavioral_engine;

        engine.wait(self.browser.settle_wait_ms).await;
        let html = page.get_content().await.context("reading page source")?;
        if shows_challenge(&html) {
            warn!(
                target: "browser",
                %url,
                wait_ms = self.browser.challenge_wait_ms,
                "browser.challenge.detected"
            );
            engine.wait(self.browser.challenge_wait_ms).await;
        }

        page.scroll_pass(self.browser.scroll_pause_ms)
            .await
            .context("scrolling page")?;

        if let Some(dir) = &self.browser.screenshot_dir {
            save_screenshot(&page, dir, url).await;
        }

        let html = page.get_content().await.context("reading page source")?;
        let final_url = page.get_url().await.unwrap_or_default();
        let title = page.get_title().await.unwrap_or_default();
        debug!(
            target: "browser",
            %url,
            %final_url,
            %title,
            html_bytes = html.len(),
            "browser.page.rendered"
        );
        Ok(html)
    }
}

#[async_trait]
impl ContentExtractor for WebPageExtractor {
    fn category(&self) -> Category {
        Category::GenericWeb
    }

    async fn extract(&self, url: &str) -> Result<String> {
        self.extract_web_page(url).await
    }
}

/// Built-in identity with any configured overrides applied.
pub fn evasion_profile(overrides: &ProfileSettings) -> EvasionProfile {
    let mut profile = EvasionProfile::default();
    if let Some(ua) = &overrides.user_agent {
        profile.user_agent = ua.clone();
    }
    if let Some(viewport) = overrides.viewport {
        profile.viewport = viewport;
    }
    if let Some(locale) = &overrides.locale {
        profile.locale = locale.clone();
    }
    if let Some(languages) = overrides.languages.as_ref().filter(|l| !l.is_empty()) {
        profile.languages = languages.clone();
    }
    if let Some(tz) = &overrides.timezone {
        profile.timezone = tz.clone();
    }
    if let Some(al) = &overrides.accept_language {
        profile.accept_language = al.clone();
    }
    if let Some(platform) = &overrides.platform {
        profile.platform = platform.clone();
    }
    profile
}

/// `<dir>/<blake3(url)>.png`
pub fn screenshot_path(dir: &Path, url: &str) -> std::path::PathBuf {
    dir.join(format!("{}.png", blake3::hash(url.as_bytes()).to_hex()))
}

async fn save_screenshot(page: &HarvestPage, dir: &Path, url: &str) {
    let path = screenshot_path(dir, url);
    let result = async {
        let png = page.screenshot().await?;
        tokio::fs::create_dir_all(dir).await?;
        tokio::fs::write(&path, png).await?;
        anyhow::Ok(())
    }
    .await;
    match result {
        Ok(()) => info!(target: "browser", %url, path = %path.display(), "browser.screenshot.saved"),
        Err(e) => warn!(target: "browser", %url, error = %e, "browser.screenshot.failed"),
    }
}
