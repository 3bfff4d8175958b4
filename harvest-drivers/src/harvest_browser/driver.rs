use crate::harvest_browser::{
    behavioral::BehavioralEngine, evasion::EvasionProfile, page::HarvestPage,
};
use anyhow::{Context, Result};
use fantoccini::wd::TimeoutConfiguration;
use fantoccini::{Client, ClientBuilder};
use std::time::Duration;
use webdriver::capabilities::Capabilities;

/// How to reach the WebDriver service and how long operations may take.
#[derive(Debug, Clone)]
pub struct DriverSettings {
    pub webdriver_url: String,
    pub headless: bool,
    pub navigation_timeout: Duration,
    pub script_timeout: Duration,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            headless: true,
            navigation_timeout: Duration::from_secs(60),
            script_timeout: Duration::from_secs(30),
        }
    }
}

/// One isolated browser session with its evasion profile.
///
/// Sessions are never pooled: create one per crawl and [`close`](Self::close)
/// it on every exit path.
pub struct HarvestDriver {
    pub client: Client,
    pub behavioral_engine: BehavioralEngine,
    pub profile: EvasionProfile,
    settings: DriverSettings,
}

impl HarvestDriver {
    /// Open a new session against the configured WebDriver endpoint.
    pub async fn launch(settings: DriverSettings, profile: EvasionProfile) -> Result<Self> {
        let caps: Capabilities = profile.capabilities(settings.headless);

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(&settings.webdriver_url)
            .await
            .with_context(|| {
                format!("failed to open WebDriver session at {}", settings.webdriver_url)
            })?;

        let driver = Self {
            client,
            behavioral_engine: BehavioralEngine::new(),
            profile,
            settings,
        };

        if let Err(e) = driver.configure_session().await {
            let _ = driver.client.clone().close().await;
            return Err(e);
        }
        Ok(driver)
    }

    async fn configure_session(&self) -> Result<()> {
        self.client
            .update_timeouts(TimeoutConfiguration::new(
                Some(self.settings.script_timeout),
                Some(self.settings.navigation_timeout),
                None,
            ))
            .await
            .context("failed to set session timeouts")?;
        let (w, h) = self.profile.viewport;
        self.client
            .set_window_size(w, h)
            .await
            .context("failed to size browser window")?;
        Ok(())
    }

    /// Navigate and return a [`HarvestPage`] with the evasion script applied.
    ///
    /// Bounded by the navigation timeout on top of the session's own page-load
    /// timeout, so a wedged driver cannot hang the crawl.
    pub async fn goto(&self, url: &str) -> Result<HarvestPage> {
        let page = HarvestPage::new(
            self.client.clone(),
            self.profile.clone(),
            self.behavioral_engine.clone(),
        );
        let budget = self.settings.navigation_timeout + Duration::from_secs(5);
        tokio::time::timeout(budget, page.goto(url))
            .await
            .map_err(|_| anyhow::anyhow!("navigation to {url} timed out after {budget:?}"))??;
        Ok(page)
    }

    /// Close the underlying browser session.
    pub async fn close(self) -> Result<()> {
        self.client.close().await?;
        Ok(())
    }
}
