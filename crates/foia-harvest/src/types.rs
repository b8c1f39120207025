//! Core data types shared by the listing, date and crawl modules.

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An anchor found on a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateLink {
    /// Concatenated text content of the anchor.
    pub visible_text: String,
    /// Raw `href` value, absolute or relative.
    pub target_url: String,
}

/// The month a report covers. This is the identity of a report on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DateKey {
    year: u16,
    month: u8,
}

impl DateKey {
    /// Build a key, rejecting months outside 1..=12 and years above 9999.
    pub fn new(year: u16, month: u8) -> Option<Self> {
        if !(1..=12).contains(&month) || year > 9999 {
            return None;
        }
        Some(Self { year, month })
    }

    /// The current local year and month.
    pub fn today() -> Self {
        let now = chrono::Local::now();
        Self {
            year: now.year() as u16,
            month: now.month() as u8,
        }
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
