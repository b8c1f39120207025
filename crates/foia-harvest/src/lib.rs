//! Collects monthly PDF reports from a FOIA reading room and files each
//! one under the month it covers.
//!
//! The report month comes from the link title when it ends in
//! "<Month> <Year>", and from a `MM/YYYY` date on the document's first page
//! otherwise.

pub mod config;
pub mod crawl;
pub mod dates;
pub mod error;
pub mod fetch;
pub mod listing;
pub mod naming;
pub mod pdf;
pub mod schedule;
pub mod types;

pub use config::{ConfigOverrides, HarvestConfig, TitleOverrides};
pub use crawl::{is_report_link, CrawlSummary, Harvester, LinkOutcome};
pub use dates::{effective_title, find_month_year, resolve_title_date, TitleDate};
pub use error::{HarvestError, HarvestResult};
pub use naming::{Persisted, ReportNaming};
pub use pdf::{resolve_content_date, ContentDate, LopdfExtractor, PageTextExtractor};
pub use types::{CandidateLink, DateKey};
