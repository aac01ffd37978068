use crate::config::ScraperConfig;
use crate::error::{PageError, PageResult};
use anyhow::{Context, Result};
use std::time::Duration;
use tokio_retry::strategy::FixedInterval;
use tokio_retry::RetryIf;
use tracing::{debug, warn};

pub struct HttpClient {
    inner: reqwest::Client,
    config: ScraperConfig,
}

impl HttpClient {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .gzip(true)
            .cookie_store(true);

        if let Some(ua) = &config.user_agent {
            builder = builder.user_agent(ua);
        }
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let inner = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            inner,
            config: config.clone(),
        })
    }

    /// Fetch a URL as text. Transient failures (transport errors, 429, 5xx)
    /// are retried up to `max_retries` extra times; anything else fails at once.
    pub async fn get_text(&self, url: &str) -> PageResult<String> {
        let strategy = FixedInterval::from_millis(self.config.retry_delay_ms)
            .take(self.config.max_retries as usize);

        let mut attempt = 0u32;
        RetryIf::start(
            strategy,
            || self.get_once(url),
            |e: &PageError| {
                attempt += 1;
                let retry = e.is_transient() && attempt <= self.config.max_retries;
                if retry {
                    warn!("GET {} failed on attempt {}: {}", url, attempt, e);
                }
                retry
            },
        )
        .await
    }

    async fn get_once(&self, url: &str) -> PageResult<String> {
        debug!("GET {}", url);

        let resp = self.inner.get(url).send().await.map_err(|source| PageError::Network {
            url: url.to_string(),
            source,
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PageError::Status {
                url: url.to_string(),
                status,
            });
        }

        resp.text().await.map_err(|source| PageError::Network {
            url: url.to_string(),
            source,
        })
    }
}
