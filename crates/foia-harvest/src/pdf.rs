//! First-page text extraction and the content-based date fallback.

use crate::dates::find_month_year;
use crate::error::{HarvestError, HarvestResult};
use crate::types::DateKey;
use lopdf::Document;
use std::path::Path;

/// Reads the text of the first page of a PDF on disk.
pub trait PageTextExtractor {
    fn first_page_text(&self, path: &Path) -> HarvestResult<String>;
}

/// Extractor backed by `lopdf`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfExtractor;

impl PageTextExtractor for LopdfExtractor {
    fn first_page_text(&self, path: &Path) -> HarvestResult<String> {
        let doc = Document::load(path)?;
        let first = doc
            .get_pages()
            .keys()
            .next()
            .copied()
            .ok_or_else(|| HarvestError::EmptyPdf(path.to_path_buf()))?;
        Ok(doc.extract_text(&[first])?)
    }
}

/// Outcome of reading the report month out of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentDate {
    Resolved(DateKey),
    /// No usable date in the document; `key` is the fallback month.
    Defaulted { key: DateKey, reason: String },
}

impl ContentDate {
    pub fn key(&self) -> DateKey {
        match self {
            Self::Resolved(key) | Self::Defaulted { key, .. } => *key,
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, Self::Defaulted { .. })
    }
}

/// Find the report month in the first page of the PDF at `path`.
///
/// Never fails: when the text has no `MM/YYYY` or cannot be extracted at
/// all, `fallback` is returned as [`ContentDate::Defaulted`].
pub fn resolve_content_date(
    path: &Path,
    extractor: &dyn PageTextExtractor,
    fallback: DateKey,
) -> ContentDate {
    let reason = match extractor.first_page_text(path) {
        Ok(text) => match find_month_year(&text) {
            Some(key) => return ContentDate::Resolved(key),
            None => "no MM/YYYY date on first page".to_string(),
        },
        Err(e) => e.to_string(),
    };

    tracing::warn!(
        "failed to extract date from {}: {reason}; using {fallback}",
        path.display()
    );
    ContentDate::Defaulted {
        key: fallback,
        reason,
    }
}
