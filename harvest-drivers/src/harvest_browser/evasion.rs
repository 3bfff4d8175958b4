use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Browser identity applied once when a session is created.
///
/// The profile is plain data: [`EvasionProfile::chrome_arguments`],
/// [`EvasionProfile::chrome_options`] and [`EvasionProfile::init_script`]
/// render it into whatever the WebDriver session needs. A session never
/// changes its profile after launch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvasionProfile {
    pub user_agent: String,
    pub viewport: (u32, u32),
    pub platform: String,
    /// Primary UI locale, e.g. `vi-VN`.
    pub locale: String,
    /// Reported by `navigator.languages`; must contain more than one entry.
    pub languages: Vec<String>,
    /// IANA zone reported by `Intl.DateTimeFormat().resolvedOptions()`.
    pub timezone: String,
    pub accept_language: String,
}

impl Default for EvasionProfile {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36".to_string(),
            viewport: (1920, 1080),
            platform: "Win32".to_string(),
            locale: "vi-VN".to_string(),
            languages: vec!["vi-VN".to_string(), "vi".to_string(), "en-US".to_string(), "en".to_string()],
            timezone: "Asia/Ho_Chi_Minh".to_string(),
            accept_language: "vi-VN,vi;q=0.9,en-US;q=0.8,en;q=0.7".to_string(),
        }
    }
}

/// Plugin names reported by a stock desktop Chrome.
const CHROME_PLUGINS: [&str; 3] = [
    "PDF Viewer",
    "Chrome PDF Viewer",
    "Chromium PDF Viewer",
];

impl EvasionProfile {
    /// Chrome command-line switches for this identity.
    pub fn chrome_arguments(&self, headless: bool) -> Vec<String> {
        let mut args = vec![
            "--disable-blink-features=AutomationControlled".to_string(),
            "--disable-infobars".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--no-sandbox".to_string(),
            "--disable-extensions".to_string(),
            "--no-first-run".to_string(),
            format!("--user-agent={}", self.user_agent),
            format!("--window-size={},{}", self.viewport.0, self.viewport.1),
            format!("--lang={}", self.locale),
        ];
        if headless {
            args.push("--headless=new".to_string());
            args.push("--disable-gpu".to_string());
        }
        args
    }

    /// The `goog:chromeOptions` object: switches, automation markers removed,
    /// and the `Accept-Language` preference Chrome sends with every request.
    pub fn chrome_options(&self, headless: bool) -> Value {
        json!({
            "args": self.chrome_arguments(headless),
            "excludeSwitches": ["enable-automation"],
            "useAutomationExtension": false,
            "prefs": {
                "intl.accept_languages": self.accept_language,
            },
        })
    }

    /// Full capability map for a new session.
    pub fn capabilities(&self, headless: bool) -> Map<String, Value> {
        let mut caps = Map::new();
        caps.insert("browserName".to_string(), json!("chrome"));
        // Return from navigation at DOMContentLoaded instead of full load.
        caps.insert("pageLoadStrategy".to_string(), json!("eager"));
        caps.insert(
            "goog:chromeOptions".to_string(),
            self.chrome_options(headless),
        );
        caps
    }

    /// Script neutralising the usual automation fingerprints.
    ///
    /// Covers `navigator.webdriver`, the plugin list, `navigator.languages`,
    /// `navigator.platform`, the `window.chrome` global, notification
    /// permission queries, and the reported time zone.
    pub fn init_script(&self) -> String {
        let languages = serde_json::to_string(&self.languages).unwrap_or_else(|_| "[]".into());
        let plugins = serde_json::to_string(&CHROME_PLUGINS).unwrap_or_else(|_| "[]".into());
        let platform = serde_json::to_string(&self.platform).unwrap_or_else(|_| "\"\"".into());
        let timezone = serde_json::to_string(&self.timezone).unwrap_or_else(|_| "\"UTC\"".into());

        format!(
            r#"
            (() => {{
                Object.defineProperty(navigator, 'webdriver', {{ get: () => undefined }});
                const pluginNames = {plugins};
                Object.defineProperty(navigator, 'plugins', {{
                    get: () => pluginNames.map((name) => ({{ name, filename: 'internal-pdf-viewer', description: 'Portable Document Format' }}))
                }});
                Object.defineProperty(navigator, 'languages', {{ get: () => {languages} }});
                Object.defineProperty(navigator, 'platform', {{ get: () => {platform} }});
                if (!window.chrome) {{
                    window.chrome = {{ runtime: {{}}, loadTimes: function () {{}}, csi: function () {{}}, app: {{}} }};
                }}
                if (navigator.permissions && navigator.permissions.query) {{
                    const originalQuery = navigator.permissions.query.bind(navigator.permissions);
                    navigator.permissions.query = (parameters) =>
                        parameters && parameters.name === 'notifications'
                            ? Promise.resolve({{ state: Notification.permission }})
                            : originalQuery(parameters);
                }}
                const resolved = Intl.DateTimeFormat.prototype.resolvedOptions;
                Intl.DateTimeFormat.prototype.resolvedOptions = function () {{
                    const options = resolved.call(this);
                    options.timeZone = {timezone};
                    return options;
                }};
            }})();
            "#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_reports_several_languages() {
        let p = EvasionProfile::default();
        assert!(p.languages.len() > 1);
        assert!(p.accept_language.starts_with(&p.locale));
    }

    #[test]
    fn arguments_hide_automation_and_carry_identity() {
        let p = EvasionProfile::default();
        let args = p.chrome_arguments(true);
        assert!(args.contains(&"--disable-blink-features=AutomationControlled".to_string()));
        assert!(args.contains(&format!("--user-agent={}", p.user_agent)));
        assert!(args.contains(&"--window-size=1920,1080".to_string()));
        assert!(args.iter().any(|a| a.starts_with("--headless")));
        assert!(!p.chrome_arguments(false).iter().any(|a| a.starts_with("--headless")));
    }

    #[test]
    fn capabilities_request_eager_loading_and_prefs() {
        let caps = EvasionProfile::default().capabilities(true);
        assert_eq!(caps["pageLoadStrategy"], "eager");
        let opts = &caps["goog:chromeOptions"];
        assert_eq!(opts["excludeSwitches"][0], "enable-automation");
        assert_eq!(
            opts["prefs"]["intl.accept_languages"],
            "vi-VN,vi;q=0.9,en-US;q=0.8,en;q=0.7"
        );
    }

    #[test]
    fn init_script_embeds_profile_values() {
        let p = EvasionProfile {
            timezone: "Europe/Paris".into(),
            languages: vec!["fr-FR".into(), "fr".into()],
            ..EvasionProfile::default()
        };
        let script = p.init_script();
        assert!(script.contains("'webdriver'"));
        assert!(script.contains(r#"["fr-FR","fr"]"#));
        assert!(script.contains(r#""Europe/Paris""#));
        assert!(script.contains("Notification.permission"));
        assert!(script.contains("window.chrome"));
    }
}
