use crate::harvest_browser::{behavioral::BehavioralEngine, evasion::EvasionProfile};
use anyhow::{Context, Result};
use fantoccini::Client;
use serde_json::Value;
use tracing::debug;

/// Phrases only a bot-challenge interstitial puts in its body text.
pub const CHALLENGE_MARKERS: [&str; 4] = [
    "checking your browser",
    "cf-browser-verification",
    "verify you are human",
    "ddos protection by",
];

/// Interstitial titles. These also occur in ordinary prose, so they only
/// count inside `<title>`.
pub const CHALLENGE_TITLES: [&str; 2] = ["just a moment", "attention required"];

/// True when the rendered markup still looks like a challenge page.
pub fn shows_challenge(html: &str) -> bool {
    let lower = html.to_lowercase();
    if CHALLENGE_MARKERS.iter().any(|m| lower.contains(m)) {
        return true;
    }
    document_title(&lower).is_some_and(|title| CHALLENGE_TITLES.iter().any(|m| title.contains(m)))
}

fn document_title(html: &str) -> Option<&str> {
    let open = html.find("<title")?;
    let start = open + html[open..].find('>')? + 1;
    let len = html[start..].find("</title")?;
    Some(&html[start..start + len])
}

/// High‑level page wrapper over the session's WebDriver client.
pub struct HarvestPage {
    pub(crate) client: Client,
    pub(crate) profile: EvasionProfile,
    pub(crate) behavioral_engine: BehavioralEngine,
}

impl HarvestPage {
    pub fn new(client: Client, profile: EvasionProfile, behavioral_engine: BehavioralEngine) -> Self {
        Self {
            client,
            profile,
            behavioral_engine,
        }
    }

    /// Navigate to `url` and re-apply the evasion script to the new document.
    pub async fn goto(&self, url: &str) -> Result<()> {
        self.client
            .goto(url)
            .await
            .with_context(|| format!("navigation to {url} failed"))?;
        self.apply_evasions().await
    }

    /// Apply the profile's fingerprint overrides to the current document.
    pub async fn apply_evasions(&self) -> Result<()> {
        self.client
            .execute(&self.profile.init_script(), vec![])
            .await
            .context("evasion script failed")?;
        Ok(())
    }

    /// Run a script in the page and return its JSON result.
    pub async fn evaluate(&self, script: &str) -> Result<Value> {
        self.client
            .execute(script, vec![])
            .await
            .map_err(anyhow::Error::from)
    }

    /// Return the full rendered HTML.
    pub async fn get_content(&self) -> Result<String> {
        self.client.source().await.map_err(anyhow::Error::from)
    }

    pub async fn get_title(&self) -> Result<String> {
        self.client.title().await.map_err(anyhow::Error::from)
    }

    pub async fn get_url(&self) -> Result<String> {
        self.client
            .current_url()
            .await
            .map(|url| url.to_string())
            .map_err(anyhow::Error::from)
    }

    /// Scroll to `fraction` of the document height (0.0 = top, 1.0 = bottom).
    pub async fn scroll_to_fraction(&self, fraction: f64) -> Result<()> {
        let script = format!(
            "window.scrollTo(0, Math.floor(document.body.scrollHeight * {}));",
            fraction.clamp(0.0, 1.0)
        );
        self.evaluate(&script).await?;
        Ok(())
    }

    /// Mid-page, bottom, then back to top, pausing between steps so
    /// scroll-bound lazy content gets a chance to load.
    pub async fn scroll_pass(&self, pause_ms: u64) -> Result<()> {
        for fraction in [0.5, 1.0] {
            self.scroll_to_fraction(fraction).await?;
            debug!(target: "browser.scroll", fraction, "scrolled");
            self.behavioral_engine.pause(pause_ms).await;
        }
        self.scroll_to_fraction(0.0).await?;
        self.behavioral_engine.pause(pause_ms / 2).await;
        Ok(())
    }

    /// PNG screenshot of the current viewport.
    pub async fn screenshot(&self) -> Result<Vec<u8>> {
        self.client.screenshot().await.map_err(anyhow::Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_challenge_phrases_case_insensitively() {
        assert!(shows_challenge("<title>Just a moment...</title>"));
        assert!(shows_challenge("<p>Checking your browser before accessing</p>"));
        assert!(!shows_challenge("<article><p>Regular news story</p></article>"));
    }

    #[test]
    fn ordinary_pages_with_challenge_words_are_not_challenges() {
        let cdn_script = r#"<html><head><title>Tin tức hôm nay</title>
            <script src="/cdn-cgi/challenge-platform/scripts/jsd/main.js"></script></head>
            <body><p>The minister said: just a moment, we are still counting.</p></body></html>"#;
        assert!(!shows_challenge(cdn_script));
        assert!(shows_challenge(
            "<html><head><title>Attention Required! | Cloudflare</title></head></html>"
        ));
    }
}
