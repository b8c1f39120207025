//! Destination paths and on-disk persistence.
//!
//! A report's file name is derived from its month alone. The file existing
//! is the only record that the report was harvested.

use crate::error::HarvestResult;
use crate::types::DateKey;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Result of moving a downloaded document to its destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persisted {
    Saved(PathBuf),
    /// The destination already existed; the download was discarded.
    AlreadyPresent(PathBuf),
}

/// Naming scheme for harvested reports: `<dir>/<prefix>-<year>-<MM>.pdf`.
#[derive(Debug, Clone)]
pub struct ReportNaming {
    output_dir: PathBuf,
    prefix: String,
}

impl ReportNaming {
    pub fn new(output_dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            prefix: prefix.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Destination path for a report month.
    pub fn destination(&self, key: DateKey) -> PathBuf {
        self.output_dir.join(format!(
            "{}-{:04}-{:02}.pdf",
            self.prefix,
            key.year(),
            key.month()
        ))
    }

    /// Create the output directory if needed.
    pub fn ensure_dir(&self) -> HarvestResult<()> {
        std::fs::create_dir_all(&self.output_dir)?;
        Ok(())
    }

    /// Write bytes to a fresh temporary file in the output directory.
    ///
    /// Names are unique per call; the file is removed when dropped unless
    /// persisted.
    pub fn write_temp(&self, bytes: &[u8]) -> HarvestResult<NamedTempFile> {
        let mut file = tempfile::Builder::new()
            .prefix(&format!("{}-", self.prefix))
            .suffix("-temp.pdf")
            .tempfile_in(&self.output_dir)?;
        file.write_all(bytes)?;
        file.flush()?;
        Ok(file)
    }

    /// Move a temporary file to the destination for `key` without ever
    /// replacing an existing file.
    pub fn persist(&self, temp: NamedTempFile, key: DateKey) -> HarvestResult<Persisted> {
        let dest = self.destination(key);
        if dest.exists() {
            return Ok(Persisted::AlreadyPresent(dest));
        }

        match temp.persist_noclobber(&dest) {
            Ok(_) => Ok(Persisted::Saved(dest)),
            Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => {
                Ok(Persisted::AlreadyPresent(dest))
            }
            Err(e) => Err(e.error.into()),
        }
    }

    /// Write bytes straight to the destination for `key`.
    pub fn save(&self, bytes: &[u8], key: DateKey) -> HarvestResult<Persisted> {
        let temp = self.write_temp(bytes)?;
        self.persist(temp, key)
    }
}
