//! Crawl driver: walks the listing pages and files every matching report.
//!
//! Work is strictly sequential. Any fetch error ends the run; date
//! resolution problems never do.

use crate::config::HarvestConfig;
use crate::dates::{effective_title, resolve_title_date, TitleDate};
use crate::error::HarvestResult;
use crate::fetch::HttpClient;
use crate::listing::parse_listing;
use crate::naming::{Persisted, ReportNaming};
use crate::pdf::{resolve_content_date, LopdfExtractor, PageTextExtractor};
use crate::types::{CandidateLink, DateKey};
use serde::Serialize;
use std::path::PathBuf;
use url::Url;

/// Suffix a document link must end with, compared case-sensitively.
const PDF_SUFFIX: &str = ".pdf";

/// What happened to a single link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// Not a report link.
    Filtered,
    /// The title resolved and the report is already on disk.
    AlreadyPresent(PathBuf),
    /// The title resolved and the report was downloaded.
    Saved(PathBuf),
    /// Dated from the document body and stored.
    FallbackSaved { path: PathBuf, defaulted: bool },
    /// Dated from the document body, but that month was already on disk.
    FallbackDiscarded { path: PathBuf, defaulted: bool },
}

/// Counters for one crawl.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlSummary {
    pub pages_checked: u32,
    pub links_seen: usize,
    pub candidates: usize,
    pub saved: usize,
    pub already_present: usize,
    pub fallback_saved: usize,
    pub fallback_discarded: usize,
    /// Fallback resolutions that ended on the current month.
    pub defaulted_dates: usize,
}

impl CrawlSummary {
    fn record(&mut self, outcome: &LinkOutcome) {
        self.links_seen += 1;
        match outcome {
            LinkOutcome::Filtered => return,
            LinkOutcome::AlreadyPresent(_) => self.already_present += 1,
            LinkOutcome::Saved(_) => self.saved += 1,
            LinkOutcome::FallbackSaved { defaulted, .. } => {
                self.fallback_saved += 1;
                self.defaulted_dates += usize::from(*defaulted);
            }
            LinkOutcome::FallbackDiscarded { defaulted, .. } => {
                self.fallback_discarded += 1;
                self.defaulted_dates += usize::from(*defaulted);
            }
        }
        self.candidates += 1;
    }

    /// Number of files written by the run.
    pub fn files_written(&self) -> usize {
        self.saved + self.fallback_saved
    }
}

/// True when the link text carries the keyword and the raw `href` names a PDF.
pub fn is_report_link(link: &CandidateLink, keyword: &str) -> bool {
    link.visible_text.contains(keyword) && link.target_url.ends_with(PDF_SUFFIX)
}

/// Runs crawls against one reading room.
pub struct Harvester {
    config: HarvestConfig,
    base_url: Url,
    client: HttpClient,
    naming: ReportNaming,
    extractor: Box<dyn PageTextExtractor + Send + Sync>,
    clock: fn() -> DateKey,
}

impl Harvester {
    /// Build a harvester with the `lopdf` extractor and the system clock.
    pub fn new(config: HarvestConfig) -> HarvestResult<Self> {
        config.validate()?;
        let base_url = Url::parse(&config.base_url)?;
        let client = HttpClient::new(config.timeout_ms, config.max_retries, &config.user_agent)?;
        let naming = ReportNaming::new(&config.output_dir, &config.file_prefix);

        Ok(Self {
            config,
            base_url,
            client,
            naming,
            extractor: Box::new(LopdfExtractor),
            clock: DateKey::today,
        })
    }

    /// Replace the PDF text extractor.
    pub fn with_extractor(
        mut self,
        extractor: impl PageTextExtractor + Send + Sync + 'static,
    ) -> Self {
        self.extractor = Box::new(extractor);
        self
    }

    /// Replace the source of "current month" used when a document has no date.
    pub fn with_clock(mut self, clock: fn() -> DateKey) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    pub fn naming(&self) -> &ReportNaming {
        &self.naming
    }

    /// Visit every listing page in the horizon and process its links.
    pub async fn run(&self) -> HarvestResult<CrawlSummary> {
        self.naming.ensure_dir()?;
        let mut summary = CrawlSummary::default();

        for page in 0..self.config.pages {
            tracing::info!("checking page {page}");
            let html = self
                .client
                .get_text(self.base_url.as_str(), &[("page", page.to_string())])
                .await?;
            summary.pages_checked += 1;

            let links = parse_listing(&html);
            if links.is_empty() && self.config.stop_on_empty_page {
                tracing::info!("page {page} has no links, stopping");
                break;
            }

            for link in &links {
                let outcome = self.process_link(link).await?;
                summary.record(&outcome);
            }
        }

        tracing::info!(
            "crawl finished: {} page(s), {} candidate(s), {} file(s) written, {} already present",
            summary.pages_checked,
            summary.candidates,
            summary.files_written(),
            summary.already_present + summary.fallback_discarded
        );
        Ok(summary)
    }

    /// Decide and act on a single link.
    pub async fn process_link(&self, link: &CandidateLink) -> HarvestResult<LinkOutcome> {
        if !is_report_link(link, &self.config.keyword) {
            return Ok(LinkOutcome::Filtered);
        }

        let document_url = self.base_url.join(&link.target_url)?.to_string();
        let title = effective_title(
            &document_url,
            &link.visible_text,
            &self.config.title_overrides,
        );

        match resolve_title_date(title) {
            TitleDate::Resolved(key) => self.fetch_dated(&document_url, key).await,
            TitleDate::Unparsable => {
                tracing::warn!(
                    "title parsing failed for {:?}, downloading {document_url} to read its date",
                    title.trim()
                );
                self.fetch_undated(&document_url).await
            }
        }
    }

    async fn fetch_dated(&self, document_url: &str, key: DateKey) -> HarvestResult<LinkOutcome> {
        let dest = self.naming.destination(key);
        if dest.exists() {
            tracing::debug!("{} already present, skipping", dest.display());
            return Ok(LinkOutcome::AlreadyPresent(dest));
        }

        tracing::info!("downloading {document_url}");
        let bytes = self.client.get_bytes(document_url).await?;
        match self.naming.save(&bytes, key)? {
            Persisted::Saved(path) => {
                tracing::info!("saved {}", path.display());
                Ok(LinkOutcome::Saved(path))
            }
            Persisted::AlreadyPresent(path) => Ok(LinkOutcome::AlreadyPresent(path)),
        }
    }

    async fn fetch_undated(&self, document_url: &str) -> HarvestResult<LinkOutcome> {
        let bytes = self.client.get_bytes(document_url).await?;
        let temp = self.naming.write_temp(&bytes)?;

        let date = resolve_content_date(temp.path(), self.extractor.as_ref(), (self.clock)());
        let defaulted = date.is_defaulted();

        match self.naming.persist(temp, date.key())? {
            Persisted::Saved(path) => {
                tracing::info!("saved {}", path.display());
                Ok(LinkOutcome::FallbackSaved { path, defaulted })
            }
            Persisted::AlreadyPresent(path) => {
                tracing::debug!("{} already present, discarding download", path.display());
                Ok(LinkOutcome::FallbackDiscarded { path, defaulted })
            }
        }
    }
}
