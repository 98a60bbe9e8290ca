//! Playwright browser automation
//!
//! Each page visit is one generated node script: launch, navigate, wait for
//! the page heading, extract a [`PageSnapshot`], close.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use async_trait::async_trait;
use tokio::process::Command as TokioCommand;
use tracing::{debug, info};

use crate::error::{E2eError, E2eResult};
use crate::selectors::Selectors;
use crate::snapshot::{PageSnapshot, EXTRACT_JS, SNAPSHOT_MARKER};

/// Something that can visit a path of the application and report what it
/// rendered
#[async_trait]
pub trait PageDriver: Send + Sync {
    async fn capture(&self, path: &str, selectors: &Selectors) -> E2eResult<PageSnapshot>;
}

/// Playwright browser handle
pub struct PlaywrightHandle {
    /// Base URL of the application under test
    base_url: String,

    /// Directory for per-visit screenshots, if enabled
    screenshot_dir: Option<PathBuf>,

    /// Viewport dimensions
    viewport_width: u32,
    viewport_height: u32,

    /// Browser type
    browser: Browser,

    headless: bool,

    /// How long to wait for the page heading after navigation
    ready_timeout_ms: u64,

    /// Where node resolves the `playwright` package from
    node_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

impl PlaywrightHandle {
    /// Create a new Playwright handle
    pub fn new(config: PlaywrightConfig) -> E2eResult<Self> {
        Self::check_playwright_installed()?;

        if let Some(dir) = &config.screenshot_dir {
            std::fs::create_dir_all(dir)?;
        }

        Ok(Self::unchecked(config))
    }

    /// Build a handle without probing for the Playwright install
    pub fn unchecked(config: PlaywrightConfig) -> Self {
        Self {
            base_url: config.base_url,
            screenshot_dir: config.screenshot_dir,
            viewport_width: config.viewport_width,
            viewport_height: config.viewport_height,
            browser: config.browser,
            headless: config.headless,
            ready_timeout_ms: config.ready_timeout_ms,
            node_path: config.node_path,
        }
    }

    /// Check if Playwright is installed
    fn check_playwright_installed() -> E2eResult<()> {
        let output = Command::new("npx")
            .args(["playwright", "--version"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match output {
            Ok(status) if status.success() => Ok(()),
            _ => Err(E2eError::PlaywrightNotFound),
        }
    }

    /// Build the capture script for one page visit
    pub fn build_script(&self, path: &str, selectors: &Selectors) -> E2eResult<String> {
        let selectors_json = serde_json::to_string(selectors)?;
        let url_json = serde_json::to_string(&format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            path
        ))?;
        let heading_json = serde_json::to_string(selectors.heading)?;

        let screenshot = match &self.screenshot_dir {
            Some(dir) => {
                let file = dir.join(format!("{}.png", screenshot_name(path)));
                format!(
                    "    await page.screenshot({{ path: {}, fullPage: true }});\n",
                    serde_json::to_string(&file.to_string_lossy())?
                )
            }
            None => String::new(),
        };

        Ok(format!(
            r#"
const {{ chromium, firefox, webkit }} = require('playwright');

(async () => {{
  const browser = await {browser}.launch({{ headless: {headless} }});
  const context = await browser.newContext({{
    viewport: {{ width: {width}, height: {height} }}
  }});
  const page = await context.newPage();

  try {{
    await page.goto({url});
    await page.waitForSelector({heading}, {{ timeout: {timeout} }});
    await page.waitForLoadState('networkidle');
{screenshot}    const snapshot = await page.evaluate({extract}, {selectors});
    console.log('{marker}' + JSON.stringify(snapshot));
  }} catch (error) {{
    console.error(JSON.stringify({{ success: false, error: error.message, stack: error.stack }}));
    process.exit(1);
  }} finally {{
    await browser.close();
  }}
}})();
"#,
            browser = self.browser.as_str(),
            headless = self.headless,
            width = self.viewport_width,
            height = self.viewport_height,
            url = url_json,
            heading = heading_json,
            timeout = self.ready_timeout_ms,
            screenshot = screenshot,
            extract = EXTRACT_JS,
            selectors = selectors_json,
            marker = SNAPSHOT_MARKER,
        ))
    }

    /// Execute a script via node and return its stdout
    pub async fn run_script(&self, script: &str) -> E2eResult<String> {
        let temp_dir = tempfile::tempdir()?;
        let script_path = temp_dir.path().join("capture.js");
        std::fs::write(&script_path, script)?;

        debug!("Running Playwright script: {}", script_path.display());

        let mut cmd = TokioCommand::new("node");
        cmd.arg(&script_path).current_dir(temp_dir.path());
        if let Some(node_path) = &self.node_path {
            cmd.env("NODE_PATH", node_path);
        }

        let output = cmd.output().await?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(E2eError::Playwright(format!(
                "Script failed:\nstdout: {}\nstderr: {}",
                stdout, stderr
            )));
        }

        Ok(stdout)
    }
}

#[async_trait]
impl PageDriver for PlaywrightHandle {
    async fn capture(&self, path: &str, selectors: &Selectors) -> E2eResult<PageSnapshot> {
        info!("Visiting {}", path);
        let script = self.build_script(path, selectors)?;
        let stdout = self.run_script(&script).await?;

        match PageSnapshot::from_output(&stdout) {
            Some(parsed) => Ok(parsed?),
            None => Err(E2eError::Playwright(format!(
                "No page snapshot in output for {}",
                path
            ))),
        }
    }
}

/// File-safe name for a visited path: `/movies/trending/week` -> `movies-trending-week`
fn screenshot_name(path: &str) -> String {
    let name: String = path
        .trim_matches('/')
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    if name.is_empty() {
        "root".to_string()
    } else {
        name
    }
}

/// Configuration for Playwright
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    pub base_url: String,
    pub screenshot_dir: Option<PathBuf>,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub browser: Browser,
    pub headless: bool,
    pub ready_timeout_ms: u64,
    pub node_path: Option<PathBuf>,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            screenshot_dir: None,
            viewport_width: 1280,
            viewport_height: 720,
            browser: Browser::Chromium,
            headless: true,
            ready_timeout_ms: 10_000,
            node_path: None,
        }
    }
}
