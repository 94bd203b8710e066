//! Browser startup
//!
//! Either spawns a local headless Chrome and reads its DevTools endpoint from
//! stderr, or attaches to an already running DevTools server.

use super::browser::CdpBrowserImpl;
use super::traits::CdpBrowser;
use crate::config::Config;
use crate::Error;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

const DEVTOOLS_BANNER: &str = "DevTools listening on ";

const CHROME_CANDIDATES: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
    "chrome",
];

/// Starts (or attaches to) a browser and returns its browser-level handle
#[async_trait]
pub trait BrowserLauncher: Send + Sync + std::fmt::Debug {
    /// Start the browser; every failure is a `BrowserInitFailure`
    async fn launch(&self) -> Result<Arc<dyn CdpBrowser>, Error>;
}

/// Options for a locally spawned Chrome
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Chrome executable; searched on PATH when absent
    pub executable: Option<PathBuf>,
    /// Run headless
    pub headless: bool,
    /// Pass --disable-dev-shm-usage
    pub disable_dev_shm: bool,
    /// Time allowed for the DevTools banner to appear
    pub startup_timeout: Duration,
    /// Additional arguments
    pub extra_args: Vec<String>,
    /// Parent of the per-launch profile directories
    pub profile_root: PathBuf,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            executable: None,
            headless: true,
            disable_dev_shm: true,
            startup_timeout: Duration::from_secs(20),
            extra_args: Vec::new(),
            profile_root: std::env::temp_dir(),
        }
    }
}

impl LaunchOptions {
    /// Build launch options from server configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            executable: config.chrome_path.as_ref().map(PathBuf::from),
            headless: config.headless,
            disable_dev_shm: config.disable_dev_shm,
            startup_timeout: Duration::from_millis(config.browser_startup_timeout_ms),
            ..Self::default()
        }
    }

    /// Command-line arguments for Chrome
    pub fn args(&self, user_data_dir: &Path) -> Vec<String> {
        // Sandboxing is unavailable on most restricted hosts
        let mut args = vec![
            "--no-sandbox".to_string(),
            "--remote-debugging-port=0".to_string(),
            format!("--user-data-dir={}", user_data_dir.display()),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            "--disable-gpu".to_string(),
            "--disable-extensions".to_string(),
            "--disable-background-networking".to_string(),
            "--mute-audio".to_string(),
        ];
        if self.headless {
            args.push("--headless=new".to_string());
        }
        if self.disable_dev_shm {
            args.push("--disable-dev-shm-usage".to_string());
        }
        args.extend(self.extra_args.iter().cloned());
        args.push("about:blank".to_string());
        args
    }
}

/// WebSocket URL from a Chrome stderr line, if it is the DevTools banner
pub fn parse_devtools_line(line: &str) -> Option<String> {
    line.trim()
        .strip_prefix(DEVTOOLS_BANNER)
        .map(|url| url.trim().to_string())
        .filter(|url| url.starts_with("ws://") || url.starts_with("wss://"))
}

/// Throwaway Chrome profile directory, removed on drop
#[derive(Debug)]
pub struct ProfileDir {
    path: PathBuf,
}

impl ProfileDir {
    /// Create a fresh `locator-forge-<uuid>` directory under `root`
    pub fn create(root: &Path) -> Result<Self, Error> {
        let path = root.join(format!("locator-forge-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&path)
            .map_err(|e| Error::browser_init_failure(format!("Failed to create profile dir: {}", e)))?;
        Ok(Self { path })
    }

    /// Directory path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ProfileDir {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), "Failed to remove profile dir: {}", e);
            }
        }
    }
}

/// First Chrome-like executable on PATH
pub fn detect_chrome() -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path) {
        for name in CHROME_CANDIDATES {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }

    let mac = PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
    mac.is_file().then_some(mac)
}

/// Spawns a local Chrome process
#[derive(Debug, Clone, Default)]
pub struct ChromeLauncher {
    options: LaunchOptions,
}

impl ChromeLauncher {
    /// Create a launcher
    pub fn new(options: LaunchOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl BrowserLauncher for ChromeLauncher {
    async fn launch(&self) -> Result<Arc<dyn CdpBrowser>, Error> {
        let executable = self
            .options
            .executable
            .clone()
            .or_else(detect_chrome)
            .ok_or_else(|| {
                Error::browser_init_failure("No Chrome executable found; set LOCATOR_CHROME_PATH")
            })?;

        // Every early return below drops the profile after the child
        let profile = ProfileDir::create(&self.options.profile_root)?;

        info!(executable = %executable.display(), profile = %profile.path().display(), "Launching Chrome");

        let mut child = Command::new(&executable)
            .args(self.options.args(profile.path()))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                Error::browser_init_failure(format!("Failed to spawn {}: {}", executable.display(), e))
            })?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::browser_init_failure("Chrome stderr not captured"))?;
        let mut lines = BufReader::new(stderr).lines();

        let banner = tokio::time::timeout(self.options.startup_timeout, async {
            while let Ok(Some(line)) = lines.next_line().await {
                if let Some(ws_url) = parse_devtools_line(&line) {
                    return Some(ws_url);
                }
                debug!(target: "chrome", "{}", line);
            }
            None
        })
        .await;

        let ws_url = match banner {
            Ok(Some(ws_url)) => ws_url,
            Ok(None) => {
                let _ = child.kill().await;
                return Err(Error::browser_init_failure(
                    "Chrome exited before reporting a DevTools endpoint",
                ));
            }
            Err(_) => {
                let _ = child.kill().await;
                return Err(Error::browser_init_failure(format!(
                    "Chrome did not report a DevTools endpoint within {:?}",
                    self.options.startup_timeout
                )));
            }
        };

        // Keep draining so Chrome never blocks on a full pipe
        tokio::spawn(async move {
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(target: "chrome", "{}", line);
            }
        });

        info!(endpoint = %ws_url, "Chrome DevTools endpoint ready");

        let browser = match CdpBrowserImpl::connect(ws_url, Some(child)).await {
            Ok(browser) => browser.with_profile_dir(profile),
            Err(e) => return Err(Error::browser_init_failure(e.to_string())),
        };
        Ok(Arc::new(browser))
    }
}

/// Attaches to an existing DevTools server
#[derive(Debug, Clone)]
pub struct RemoteLauncher {
    endpoint: String,
}

impl RemoteLauncher {
    /// Create a launcher for `endpoint` (e.g. "ws://localhost:9222" or a full browser ws URL)
    pub fn new<S: Into<String>>(endpoint: S) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    /// Resolve the browser-level WebSocket URL
    async fn resolve_ws_url(&self) -> Result<String, Error> {
        if self.endpoint.contains("/devtools/browser/") {
            return Ok(self.endpoint.clone());
        }

        let http_endpoint = self
            .endpoint
            .trim_end_matches('/')
            .replace("ws://", "http://")
            .replace("wss://", "https://");
        let url = format!("{}/json/version", http_endpoint);
        debug!("Fetching browser version from {}", url);

        let version: serde_json::Value = reqwest::get(&url)
            .await
            .map_err(|e| Error::browser_init_failure(format!("Failed to reach {}: {}", url, e)))?
            .json()
            .await
            .map_err(|e| Error::browser_init_failure(format!("Invalid /json/version response: {}", e)))?;

        version
            .get("webSocketDebuggerUrl")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| Error::browser_init_failure("No webSocketDebuggerUrl in /json/version"))
    }
}

#[async_trait]
impl BrowserLauncher for RemoteLauncher {
    async fn launch(&self) -> Result<Arc<dyn CdpBrowser>, Error> {
        let ws_url = self.resolve_ws_url().await?;
        info!(endpoint = %ws_url, "Attaching to DevTools endpoint");

        let browser = CdpBrowserImpl::connect(ws_url, None)
            .await
            .map_err(|e| Error::browser_init_failure(e.to_string()))?;
        Ok(Arc::new(browser))
    }
}

/// Launcher selected by configuration
pub fn launcher_from_config(config: &Config) -> Arc<dyn BrowserLauncher> {
    match &config.cdp_endpoint {
        Some(endpoint) => Arc::new(RemoteLauncher::new(endpoint.clone())),
        None => Arc::new(ChromeLauncher::new(LaunchOptions::from_config(config))),
    }
}
