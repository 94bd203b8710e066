//! Configuration management for Locator-Forge

use crate::extract::strategy::{LocatorStrategy, DEFAULT_PRIORITY};
use crate::{Error, Result};
use serde::Deserialize;
use std::env;

/// Default element selector: likely test targets only
pub const DEFAULT_ELEMENT_SELECTOR: &str = "a, button, input, select, textarea, \
h1, h2, h3, h4, h5, h6, label, [role], [data-testid], [placeholder], [name]";

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Host address to bind to
    pub host: String,

    /// gRPC port
    pub port: u16,

    /// HTTP health-check port
    pub health_port: u16,

    /// Chrome executable path
    pub chrome_path: Option<String>,

    /// Existing DevTools endpoint; when set no local Chrome is launched
    pub cdp_endpoint: Option<String>,

    /// Run Chrome headless
    pub headless: bool,

    /// Pass --disable-dev-shm-usage to Chrome
    pub disable_dev_shm: bool,

    /// Time allowed for Chrome to report its DevTools endpoint, in milliseconds
    pub browser_startup_timeout_ms: u64,

    /// Maximum number of elements processed per request
    pub element_cap: usize,

    /// Navigation timeout in milliseconds
    pub navigation_timeout_ms: u64,

    /// Text snippets must be shorter than this many characters
    pub text_max_len: usize,

    /// Per-element attribute read timeout in milliseconds
    pub attribute_timeout_ms: u64,

    /// Records per chunk for batched delivery
    pub chunk_size: usize,

    /// CSS selector used by the element collector
    pub element_selector: String,

    /// Best-locator priority, highest first
    pub priority: Vec<String>,

    /// Abort image/media/font sub-requests while extracting
    pub block_resources: bool,

    /// Attach Playwright/Selenium snippets to element records
    pub snippets: bool,

    /// Log level
    pub log_level: String,

    /// Issue tracker settings
    pub tracker: TrackerConfig,
}

/// Issue tracker (Jira) settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Base URL, e.g. https://example.atlassian.net
    pub base_url: Option<String>,

    /// Account e-mail for basic auth
    pub email: Option<String>,

    /// API token for basic auth
    pub token: Option<String>,

    /// Issue field holding the acceptance criteria
    pub ac_field: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            email: None,
            token: None,
            ac_field: "description".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 50051,
            health_port: 10000,
            chrome_path: None,
            cdp_endpoint: None,
            headless: true,
            disable_dev_shm: true,
            browser_startup_timeout_ms: 20000,
            element_cap: 150,
            navigation_timeout_ms: 15000,
            text_max_len: 40,
            attribute_timeout_ms: 2000,
            chunk_size: 30,
            element_selector: DEFAULT_ELEMENT_SELECTOR.to_string(),
            priority: DEFAULT_PRIORITY.iter().map(|s| s.key().to_string()).collect(),
            block_resources: true,
            snippets: false,
            log_level: "info".to_string(),
            tracker: TrackerConfig::default(),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::configuration(format!("Invalid {}", name))),
        Err(_) => Ok(None),
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();

        if let Ok(host) = env::var("LOCATOR_HOST") {
            config.host = host;
        }

        if let Some(port) = parse_var("LOCATOR_PORT")? {
            config.port = port;
        }

        // Hosting platforms hand out the public HTTP port as PORT
        if let Some(port) = parse_var("PORT")? {
            config.health_port = port;
        }

        if let Some(port) = parse_var("LOCATOR_HEALTH_PORT")? {
            config.health_port = port;
        }

        if let Ok(chrome_path) = env::var("LOCATOR_CHROME_PATH") {
            config.chrome_path = Some(chrome_path);
        }

        if let Ok(endpoint) = env::var("LOCATOR_CDP_ENDPOINT") {
            config.cdp_endpoint = Some(endpoint);
        }

        if let Some(headless) = parse_var("LOCATOR_HEADLESS")? {
            config.headless = headless;
        }

        if let Some(disable) = parse_var("LOCATOR_DISABLE_DEV_SHM")? {
            config.disable_dev_shm = disable;
        }

        if let Some(timeout) = parse_var("LOCATOR_BROWSER_STARTUP_TIMEOUT")? {
            config.browser_startup_timeout_ms = timeout;
        }

        if let Some(cap) = parse_var("LOCATOR_ELEMENT_CAP")? {
            config.element_cap = cap;
        }

        if let Some(timeout) = parse_var("LOCATOR_NAVIGATION_TIMEOUT")? {
            config.navigation_timeout_ms = timeout;
        }

        if let Some(len) = parse_var("LOCATOR_TEXT_MAX_LEN")? {
            config.text_max_len = len;
        }

        if let Some(timeout) = parse_var("LOCATOR_ATTRIBUTE_TIMEOUT")? {
            config.attribute_timeout_ms = timeout;
        }

        if let Some(size) = parse_var("LOCATOR_CHUNK_SIZE")? {
            config.chunk_size = size;
        }

        if let Ok(selector) = env::var("LOCATOR_ELEMENT_SELECTOR") {
            config.element_selector = selector;
        }

        if let Ok(priority) = env::var("LOCATOR_PRIORITY") {
            config.priority = priority
                .split(',')
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty())
                .collect();
        }

        if let Some(block) = parse_var("LOCATOR_BLOCK_RESOURCES")? {
            config.block_resources = block;
        }

        if let Some(snippets) = parse_var("LOCATOR_SNIPPETS")? {
            config.snippets = snippets;
        }

        if let Ok(log_level) = env::var("LOCATOR_LOG_LEVEL") {
            config.log_level = log_level;
        }

        if let Ok(url) = env::var("JIRA_URL") {
            config.tracker.base_url = Some(url);
        }

        if let Ok(email) = env::var("JIRA_EMAIL") {
            config.tracker.email = Some(email);
        }

        if let Ok(token) = env::var("JIRA_TOKEN") {
            config.tracker.token = Some(token);
        }

        if let Ok(field) = env::var("AC_FIELD") {
            config.tracker.ac_field = field;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::configuration(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::configuration(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.element_cap == 0 {
            return Err(Error::configuration("element_cap must be positive"));
        }
        if self.navigation_timeout_ms == 0 {
            return Err(Error::configuration("navigation_timeout_ms must be positive"));
        }
        if self.attribute_timeout_ms == 0 {
            return Err(Error::configuration("attribute_timeout_ms must be positive"));
        }
        if self.browser_startup_timeout_ms == 0 {
            return Err(Error::configuration("browser_startup_timeout_ms must be positive"));
        }
        if self.text_max_len == 0 {
            return Err(Error::configuration("text_max_len must be positive"));
        }
        if self.chunk_size == 0 {
            return Err(Error::configuration("chunk_size must be positive"));
        }
        if self.element_selector.trim().is_empty() {
            return Err(Error::configuration("element_selector must not be empty"));
        }
        self.priority_order()?;
        Ok(())
    }

    /// Parsed best-locator priority
    pub fn priority_order(&self) -> Result<Vec<LocatorStrategy>> {
        if self.priority.is_empty() {
            return Err(Error::configuration("priority must name at least one strategy"));
        }
        self.priority
            .iter()
            .map(|key| {
                LocatorStrategy::from_key(key)
                    .ok_or_else(|| Error::configuration(format!("Unknown locator strategy: {}", key)))
            })
            .collect()
    }
}
