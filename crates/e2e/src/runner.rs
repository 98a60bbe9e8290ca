//! Main test runner that orchestrates the front end, TMDB fetches and page checks

use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::assertions::AssertionFailure;
use crate::config::TmdbConfig;
use crate::error::{E2eError, E2eResult};
use crate::playwright::{PageDriver, PlaywrightConfig, PlaywrightHandle};
use crate::reference::GroupContext;
use crate::selectors::SelectorProfile;
use crate::server::{self, ServerConfig, ServerHandle};
use crate::suite::{CaseKind, CaseOptions, ViewGroup};
use crate::tmdb::TmdbClient;

/// Result of running a single test case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub group: String,
    pub name: String,
    pub success: bool,
    /// Set when the group's reference fetch failed and the case never ran
    #[serde(default)]
    pub blocked: bool,
    pub duration_ms: u64,
    #[serde(default)]
    pub failures: Vec<AssertionFailure>,
    pub error: Option<String>,
}

impl TestResult {
    fn blocked(group: ViewGroup, case: CaseKind, page_size: usize, cause: &E2eError) -> Self {
        Self {
            group: group.name().to_string(),
            name: case.title(page_size),
            success: false,
            blocked: true,
            duration_ms: 0,
            failures: vec![],
            error: Some(format!("setup failed: {}", cause)),
        }
    }
}

/// Result of running all groups
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuiteResult {
    pub started_at: DateTime<Utc>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// Failed cases that never ran because setup failed
    pub blocked: usize,
    pub duration_ms: u64,
    pub results: Vec<TestResult>,
}

impl TestSuiteResult {
    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Main E2E test runner
pub struct TestRunner {
    /// Front end spawn configuration; `None` attaches to `base_url`
    server_config: Option<ServerConfig>,

    /// Base URL of the front end
    base_url: String,

    /// Poll `base_url` before running when attaching to an existing app
    wait_for_app: Option<Duration>,

    /// Playwright configuration
    playwright_config: PlaywrightConfig,

    /// Selector set the front end exposes
    selectors: SelectorProfile,

    /// Cards rendered on first load of a list page
    page_size: usize,

    /// Groups to run, in order
    groups: Vec<ViewGroup>,

    /// Output directory for results
    output_dir: PathBuf,

    tmdb: TmdbClient,

    /// Running server handle (if any)
    server: Option<ServerHandle>,

    /// Browser driver; Playwright unless one was injected
    driver: Option<Box<dyn PageDriver>>,
}

impl TestRunner {
    /// Create a test runner with custom configuration
    pub fn with_config(config: RunnerConfig) -> E2eResult<Self> {
        Ok(Self {
            server_config: config.server,
            base_url: config.base_url,
            wait_for_app: config.wait_for_app,
            playwright_config: config.playwright,
            selectors: config.selectors,
            page_size: config.page_size,
            groups: config.groups,
            output_dir: config.output_dir,
            tmdb: TmdbClient::new(config.tmdb)?,
            server: None,
            driver: None,
        })
    }

    /// Use `driver` instead of launching Playwright
    pub fn with_driver(mut self, driver: Box<dyn PageDriver>) -> Self {
        self.driver = Some(driver);
        self
    }

    /// Bring up (or wait for) the front end and the browser driver
    pub async fn start(&mut self) -> E2eResult<()> {
        if self.server.is_none() {
            if let Some(config) = self.server_config.clone() {
                let server = ServerHandle::spawn(config).await?;
                self.base_url = server.base_url().to_string();
                self.server = Some(server);
            } else if let Some(timeout) = self.wait_for_app {
                server::wait_for_ready(&self.base_url, timeout).await?;
            }
        }

        if self.driver.is_none() {
            let config = PlaywrightConfig {
                base_url: self.base_url.clone(),
                ..self.playwright_config.clone()
            };
            self.driver = Some(Box::new(PlaywrightHandle::new(config)?));
        }

        Ok(())
    }

    /// Stop the server
    pub fn stop_server(&mut self) -> E2eResult<()> {
        if let Some(mut server) = self.server.take() {
            server.stop()?;
        }
        Ok(())
    }

    /// Run every configured group
    pub async fn run_all(&mut self) -> E2eResult<TestSuiteResult> {
        let groups = self.groups.clone();
        self.run_groups(&groups).await
    }

    /// Run groups one after another
    pub async fn run_groups(&mut self, groups: &[ViewGroup]) -> E2eResult<TestSuiteResult> {
        let started_at = Utc::now();
        let start = Instant::now();

        self.start().await?;

        info!("Running {} group(s)...", groups.len());

        let mut results = Vec::new();
        for group in groups {
            results.extend(self.run_group(*group).await?);
        }

        let passed = results.iter().filter(|r| r.success).count();
        let failed = results.len() - passed;
        let blocked = results.iter().filter(|r| r.blocked).count();
        let duration_ms = start.elapsed().as_millis() as u64;

        info!("");
        info!(
            "Test Results: {} passed, {} failed ({} blocked) ({} ms)",
            passed, failed, blocked, duration_ms
        );

        Ok(TestSuiteResult {
            started_at,
            total: results.len(),
            passed,
            failed,
            blocked,
            duration_ms,
            results,
        })
    }

    /// Fetch the group's reference data, then run each of its cases. A failed
    /// fetch fails every case without visiting any page.
    pub async fn run_group(&self, group: ViewGroup) -> E2eResult<Vec<TestResult>> {
        info!("{}", group.name());

        let ctx = match group.load_context(&self.tmdb).await {
            Ok(ctx) => ctx,
            Err(e) => {
                error!("✗ {} - setup failed: {}", group.name(), e);
                return Ok(group
                    .cases()
                    .iter()
                    .map(|case| TestResult::blocked(group, *case, self.page_size, &e))
                    .collect());
            }
        };

        let driver = self
            .driver
            .as_deref()
            .ok_or_else(|| E2eError::Playwright("browser driver not started".to_string()))?;

        let mut results = Vec::new();
        for case in group.cases() {
            let result = self.run_case(driver, group, *case, &ctx).await;
            if result.success {
                info!("  ✓ {} ({} ms)", result.name, result.duration_ms);
            } else {
                error!(
                    "  ✗ {} - {}",
                    result.name,
                    result.error.as_deref().unwrap_or("unknown error")
                );
                for failure in &result.failures {
                    warn!("      {}", failure);
                }
            }
            results.push(result);
        }

        Ok(results)
    }

    /// Visit the group's page and evaluate one case
    async fn run_case(
        &self,
        driver: &dyn PageDriver,
        group: ViewGroup,
        case: CaseKind,
        ctx: &GroupContext,
    ) -> TestResult {
        let start = Instant::now();
        let name = case.title(self.page_size);
        debug!("Running test: {}", name);

        let options = CaseOptions {
            selectors: self.selectors.selectors(),
            page_size: self.page_size,
        };

        let outcome = async {
            let path = group.path(ctx)?;
            let page = driver.capture(&path, options.selectors).await?;
            case.evaluate(group, ctx, &page, options)
        }
        .await;

        let duration_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(failures) => {
                let error = match failures.len() {
                    0 => None,
                    1 => Some(failures[0].to_string()),
                    n => Some(format!("{} (and {} more)", failures[0], n - 1)),
                };
                TestResult {
                    group: group.name().to_string(),
                    name,
                    success: failures.is_empty(),
                    blocked: false,
                    duration_ms,
                    failures,
                    error,
                }
            }
            Err(e) => TestResult {
                group: group.name().to_string(),
                name,
                success: false,
                blocked: false,
                duration_ms,
                failures: vec![],
                error: Some(e.to_string()),
            },
        }
    }

    /// Write test results to JSON file
    pub fn write_results(&self, results: &TestSuiteResult) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;

        let path = self.output_dir.join("test-results.json");
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

impl Drop for TestRunner {
    fn drop(&mut self) {
        let _ = self.stop_server();
    }
}

/// Configuration for the test runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub server: Option<ServerConfig>,
    pub base_url: String,
    pub wait_for_app: Option<Duration>,
    pub playwright: PlaywrightConfig,
    pub tmdb: TmdbConfig,
    pub selectors: SelectorProfile,
    pub page_size: usize,
    pub groups: Vec<ViewGroup>,
    pub output_dir: PathBuf,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            server: None,
            base_url: "http://127.0.0.1:3000".to_string(),
            wait_for_app: None,
            playwright: PlaywrightConfig::default(),
            tmdb: TmdbConfig::default(),
            selectors: SelectorProfile::default(),
            page_size: 7,
            groups: ViewGroup::ALL.to_vec(),
            output_dir: PathBuf::from("test-results"),
        }
    }
}
