use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ErrorKind;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Scraper configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScraperConfig {
    /// Listing endpoint without query string.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_state")]
    pub state: String,

    #[serde(default = "default_category")]
    pub category: String,

    /// Number of listing pages requested, indices `0..page_count`.
    #[serde(default = "default_page_count")]
    pub page_count: u32,

    /// Unset means requests never time out.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    #[serde(default)]
    pub max_retries: u32,

    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    #[serde(default)]
    pub user_agent: Option<String>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
}

/// What the loop does after a page fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Stop requesting pages; whatever was collected is still written.
    #[default]
    Abort,
    /// Drop the failed page and carry on with the next index.
    Skip,
}

/// Pipeline configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub on_network_error: ErrorPolicy,

    #[serde(default)]
    pub on_parse_error: ErrorPolicy,

    #[serde(default)]
    pub on_structure_error: ErrorPolicy,
}

impl PipelineConfig {
    pub fn policy_for(&self, kind: ErrorKind) -> ErrorPolicy {
        match kind {
            ErrorKind::Network => self.on_network_error,
            ErrorKind::Parse => self.on_parse_error,
            ErrorKind::Structure => self.on_structure_error,
        }
    }
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_base_url() -> String {
    "http://house.speakingsame.com/suburbtop.php".to_string()
}
fn default_state() -> String {
    "nsw".to_string()
}
fn default_category() -> String {
    "HomePrice".to_string()
}
fn default_page_count() -> u32 {
    42
}
fn default_retry_delay_ms() -> u64 {
    1000
}
fn default_output_path() -> PathBuf {
    PathBuf::from("sydney_houses_median_value.csv")
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            state: default_state(),
            category: default_category(),
            page_count: default_page_count(),
            timeout_secs: None,
            max_retries: 0,
            retry_delay_ms: default_retry_delay_ms(),
            user_agent: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

// ── Loader ───────────────────────────────────────────────────────────────────

/// `SUBURB__<SECTION>__<KEY>`, e.g. `SUBURB__SCRAPER__PAGE_COUNT=5`.
fn environment() -> config::Environment {
    config::Environment::with_prefix("SUBURB")
        .prefix_separator("__")
        .separator("__")
}

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(environment())
            .build()
            .context("Failed to read configuration sources")?;

        cfg.try_deserialize()
            .context("Invalid configuration")
    }
}
