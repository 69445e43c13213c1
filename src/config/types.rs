use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://book.douban.com";
pub const DEFAULT_TAG: &str = "心理学";
pub const DEFAULT_USER_AGENT: &str = "Mozilla-Firefox5.0";

/// Main configuration structure for Bookrank
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Listing URL of the configured tag, `{base-url}/tag/{tag}`
    pub fn listing_url(&self) -> String {
        format!(
            "{}/tag/{}",
            self.catalog.base_url.trim_end_matches('/'),
            self.catalog.tag
        )
    }

    /// Report destination, `{tag}.md` in the working directory by default
    pub fn output_path(&self) -> PathBuf {
        self.output
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}.md", self.catalog.tag)))
    }
}

/// Which catalog listing to rank
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Root of the catalog site
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Tag whose listing is ranked
    pub tag: String,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            tag: DEFAULT_TAG.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Fetch/parse pipeline tuning
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum number of page fetches in flight
    pub concurrency: usize,

    /// Capacity of the buffer between fetch workers and the parse worker
    #[serde(rename = "buffer-capacity")]
    pub buffer_capacity: usize,

    /// Delay between dispatching consecutive fetch workers (milliseconds)
    #[serde(rename = "stagger-ms")]
    pub stagger_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Extra attempts for a failed page fetch
    pub retries: u32,
}

impl PipelineConfig {
    pub fn stagger(&self) -> Duration {
        Duration::from_millis(self.stagger_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: 8,
            buffer_capacity: 20,
            stagger_ms: 100,
            request_timeout_secs: 30,
            retries: 0,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the markdown report
    pub path: Option<PathBuf>,
}
