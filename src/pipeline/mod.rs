//! Pipeline orchestrator: ties scraper → storage together.
//!
//! Pages are requested strictly one after another, `0..page_count`. Rows
//! accumulate in a single [`Dataset`] which is written once the loop ends,
//! whether it ran to completion or stopped on a failed page.
//!
//! What a failed page does is decided per error kind by the configured
//! [`ErrorPolicy`]: `abort` ends the loop (the default for every kind),
//! `skip` drops that page and moves to the next index.

use crate::config::{AppConfig, ErrorPolicy, PipelineConfig};
use crate::models::Dataset;
use crate::scraper::{ListingSource, SuburbTopScraper};
use crate::storage;
use anyhow::{Context, Result};
use tracing::{error, info, warn};

pub struct Pipeline {
    config: AppConfig,
}

impl Pipeline {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub async fn run(&self) -> Result<RunStats> {
        let scraper = SuburbTopScraper::new(&self.config.scraper)
            .context("Failed to build scraper")?;

        let (data, stats) =
            collect(&scraper, self.config.scraper.page_count, &self.config.pipeline).await;

        storage::save_dataset(&self.config.output.path, &data)?;

        match stats.stopped_at {
            Some(page) => warn!(
                "=== Stopped at page {}: {} of {} pages | {} rows ===",
                page, stats.pages_ok, stats.pages_requested, stats.rows
            ),
            None => info!(
                "=== Done: {} of {} pages | {} skipped | {} rows ===",
                stats.pages_ok, stats.pages_requested, stats.pages_skipped, stats.rows
            ),
        }

        Ok(stats)
    }
}

/// Run the fetch-parse-accumulate loop against `source`.
pub async fn collect<S: ListingSource + ?Sized>(
    source: &S,
    page_count: u32,
    policy: &PipelineConfig,
) -> (Dataset, RunStats) {
    let mut data = Dataset::new();
    let mut stats = RunStats {
        pages_requested: page_count,
        ..RunStats::default()
    };

    for page in 0..page_count {
        stats.pages_attempted += 1;

        match source.fetch_page(page).await {
            Ok(rows) => {
                info!("Page {}: {} rows", page, rows.len());
                stats.pages_ok += 1;
                stats.rows += rows.len();
                data.extend(rows);
            }
            Err(e) => {
                error!(
                    "Error on page {}: {} (webpage has probably changed, update the listing path accordingly)",
                    page, e
                );
                match policy.policy_for(e.kind()) {
                    ErrorPolicy::Abort => {
                        stats.stopped_at = Some(page);
                        break;
                    }
                    ErrorPolicy::Skip => stats.pages_skipped += 1,
                }
            }
        }
    }

    (data, stats)
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub pages_requested: u32,
    pub pages_attempted: u32,
    pub pages_ok: u32,
    pub pages_skipped: u32,
    pub rows: usize,
    /// Page whose failure ended the run early.
    pub stopped_at: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScraperConfig;
    use crate::error::{PageError, PageResult};
    use crate::models::Row;
    use crate::scraper::parsers::fixtures::listing_page;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use tokio_test::{assert_err, assert_ok};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn page_rows(page: u32, n: usize) -> Vec<Row> {
        (0..n)
            .map(|i| {
                let rank = page as usize * 10 + i + 1;
                Row::new(rank.to_string(), format!("Suburb {}", rank), format!("${},000", 900 - rank))
            })
            .collect()
    }

    /// In-memory source: pages absent from the map fail with a structure error.
    struct FakeSource {
        pages: HashMap<u32, Vec<Row>>,
        garbled: Vec<u32>,
    }

    #[async_trait]
    impl ListingSource for FakeSource {
        async fn fetch_page(&self, page: u32) -> PageResult<Vec<Row>> {
            if self.garbled.contains(&page) {
                return Err(PageError::Parse(format!("page {} garbled", page)));
            }
            self.pages
                .get(&page)
                .cloned()
                .ok_or(PageError::MissingElement { step: "table[6]".into(), found: 0 })
        }
    }

    #[tokio::test]
    async fn abort_keeps_rows_before_the_failing_page() {
        let source = FakeSource {
            pages: (0..2).map(|p| (p, page_rows(p, 3))).chain([(3, page_rows(3, 3))]).collect(),
            garbled: vec![],
        };

        let (data, stats) = collect(&source, 5, &PipelineConfig::default()).await;

        let mut expected = page_rows(0, 3);
        expected.extend(page_rows(1, 3));
        assert_eq!(data.rows(), expected.as_slice());
        assert_eq!(stats.stopped_at, Some(2));
        assert_eq!(stats.pages_attempted, 3);
        assert_eq!(stats.pages_ok, 2);
        assert_eq!(stats.rows, 6);
    }

    #[tokio::test]
    async fn skip_policy_continues_past_structure_errors() {
        let source = FakeSource {
            pages: [(0, page_rows(0, 2)), (2, page_rows(2, 1))].into_iter().collect(),
            garbled: vec![],
        };
        let policy = PipelineConfig {
            on_structure_error: ErrorPolicy::Skip,
            ..PipelineConfig::default()
        };

        let (data, stats) = collect(&source, 3, &policy).await;

        assert_eq!(data.len(), 3);
        assert_eq!(data.rows()[2], page_rows(2, 1)[0]);
        assert_eq!(stats.pages_skipped, 1);
        assert_eq!(stats.stopped_at, None);
    }

    #[tokio::test]
    async fn policy_is_chosen_per_error_kind() {
        let source = FakeSource {
            pages: (0..4).map(|p| (p, page_rows(p, 1))).collect(),
            garbled: vec![2],
        };
        let policy = PipelineConfig {
            on_structure_error: ErrorPolicy::Skip,
            ..PipelineConfig::default()
        };

        let (data, stats) = collect(&source, 4, &policy).await;

        assert_eq!(data.len(), 2);
        assert_eq!(stats.stopped_at, Some(2));
    }

    // ── Against a mock site ───────────────────────────────────────────────────

    async fn mount_page(server: &MockServer, page: Option<u32>, body: String) {
        let response = ResponseTemplate::new(200).set_body_string(body);
        let base = Mock::given(method("GET")).and(path("/suburbtop.php"));
        // Page 0 has no page parameter, so it doubles as the fallback.
        let mock = match page {
            Some(p) => base
                .and(query_param("page", p.to_string()))
                .respond_with(response)
                .with_priority(1),
            None => base.respond_with(response),
        };
        mock.mount(server).await;
    }

    fn config_for(server: &MockServer, pages: u32, out: &std::path::Path) -> AppConfig {
        AppConfig {
            scraper: ScraperConfig {
                base_url: format!("{}/suburbtop.php", server.uri()),
                page_count: pages,
                ..ScraperConfig::default()
            },
            output: crate::config::OutputConfig { path: out.to_path_buf() },
            pipeline: PipelineConfig::default(),
        }
    }

    #[tokio::test]
    async fn writes_rows_from_every_page_in_order() {
        let server = MockServer::start().await;
        mount_page(&server, None, listing_page(&page_rows(0, 2))).await;
        mount_page(&server, Some(1), listing_page(&page_rows(1, 2))).await;
        mount_page(&server, Some(2), listing_page(&page_rows(2, 1))).await;

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("prices.csv");
        let stats = assert_ok!(Pipeline::new(config_for(&server, 3, &out)).run().await);

        assert_eq!(stats.rows, 5);
        assert_eq!(stats.stopped_at, None);

        let written = std::fs::read_to_string(&out).unwrap();
        let mut lines = written.lines();
        assert_eq!(lines.next(), Some("rank,suburb,median_value_aud"));
        assert_eq!(lines.next(), Some("1,Suburb 1,\"$899,000\""));
        assert_eq!(lines.next(), Some("2,Suburb 2,\"$898,000\""));
        assert_eq!(lines.next(), Some("11,Suburb 11,\"$889,000\""));
        assert_eq!(written.lines().count(), 6);
    }

    #[tokio::test]
    async fn first_page_failure_writes_header_only() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("prices.csv");
        let stats = assert_ok!(Pipeline::new(config_for(&server, 42, &out)).run().await);

        assert_eq!(stats.stopped_at, Some(0));
        assert_eq!(stats.pages_attempted, 1);
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "rank,suburb,median_value_aud\n");
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn changed_layout_stops_the_run() {
        let server = MockServer::start().await;
        mount_page(&server, None, listing_page(&page_rows(0, 2))).await;
        mount_page(&server, Some(1), "<html><body><p>redesigned</p></body></html>".into()).await;
        mount_page(&server, Some(2), listing_page(&page_rows(2, 2))).await;

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("prices.csv");
        let stats = assert_ok!(Pipeline::new(config_for(&server, 3, &out)).run().await);

        assert_eq!(stats.stopped_at, Some(1));
        let written = std::fs::read_to_string(&out).unwrap();
        assert_eq!(written.lines().count(), 3);
        assert!(!written.contains("Suburb 21"));
    }

    #[tokio::test]
    async fn reruns_produce_identical_files() {
        let server = MockServer::start().await;
        mount_page(&server, None, listing_page(&page_rows(0, 3))).await;
        mount_page(&server, Some(1), listing_page(&page_rows(1, 3))).await;

        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.csv");
        let second = dir.path().join("b.csv");
        assert_ok!(Pipeline::new(config_for(&server, 2, &first)).run().await);
        assert_ok!(Pipeline::new(config_for(&server, 2, &second)).run().await);

        assert_eq!(std::fs::read(&first).unwrap(), std::fs::read(&second).unwrap());
    }

    #[tokio::test]
    async fn empty_page_can_be_skipped_as_a_parse_error() {
        let server = MockServer::start().await;
        mount_page(&server, None, listing_page(&page_rows(0, 2))).await;
        mount_page(&server, Some(1), String::new()).await;
        mount_page(&server, Some(2), listing_page(&page_rows(2, 1))).await;

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("prices.csv");
        let mut config = config_for(&server, 3, &out);
        config.pipeline.on_parse_error = ErrorPolicy::Skip;

        let stats = assert_ok!(Pipeline::new(config).run().await);

        assert_eq!(stats.pages_skipped, 1);
        assert_eq!(stats.stopped_at, None);
        assert_eq!(stats.rows, 3);
        assert!(std::fs::read_to_string(&out).unwrap().contains("Suburb 21"));
    }

    #[tokio::test]
    async fn bad_base_url_fails_before_any_request() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.scraper.base_url = "::nope::".into();
        config.output.path = dir.path().join("prices.csv");

        assert_err!(Pipeline::new(config.clone()).run().await);
        assert!(!config.output.path.exists());
    }
}
