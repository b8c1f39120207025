//! Error types for the harvester.

use std::path::PathBuf;

/// Everything that can stop a harvest run.
///
/// Title and content date failures are not errors; they are expressed by
/// [`crate::dates::TitleDate`] and [`crate::pdf::ContentDate`].
#[derive(Debug, thiserror::Error)]
pub enum HarvestError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("PDF has no pages: {0}")]
    EmptyPdf(PathBuf),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

/// Convenience result type.
pub type HarvestResult<T> = Result<T, HarvestError>;
