pub mod cleaner;
pub mod http_client;
pub mod parsers;

use crate::config::ScraperConfig;
use crate::error::PageResult;
use crate::models::Row;
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use self::http_client::HttpClient;
use self::parsers::parse_listing_page;

// ── Source trait ──────────────────────────────────────────────────────────────

/// Swappable listing source, one call per page index.
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn fetch_page(&self, page: u32) -> PageResult<Vec<Row>>;
}

// ── speakingsame.com scraper ──────────────────────────────────────────────────

pub struct SuburbTopScraper {
    client: HttpClient,
    base_url: String,
    state: String,
    category: String,
}

impl SuburbTopScraper {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        url::Url::parse(&config.base_url)
            .with_context(|| format!("Invalid base_url {:?}", config.base_url))?;

        Ok(Self {
            client: HttpClient::new(config)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            state: config.state.clone(),
            category: config.category.clone(),
        })
    }

    /// URL for a ranking page. Page 0 carries no page parameter.
    pub fn listing_url(&self, page: u32) -> String {
        if page == 0 {
            format!("{}?sta={}&cat={}&name", self.base_url, self.state, self.category)
        } else {
            format!(
                "{}?sta={}&cat={}&name=&page={}",
                self.base_url, self.state, self.category, page
            )
        }
    }
}

#[async_trait]
impl ListingSource for SuburbTopScraper {
    async fn fetch_page(&self, page: u32) -> PageResult<Vec<Row>> {
        let url = self.listing_url(page);
        debug!("Fetching ranking page {} ({})", page, url);

        let html = self.client.get_text(&url).await?;
        parse_listing_page(&html)
    }
}
