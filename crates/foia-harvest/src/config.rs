//! Configuration loading and resolution.

use crate::error::{HarvestError, HarvestResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Literal document URL → corrected title.
pub type TitleOverrides = BTreeMap<String, String>;

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "FOIA_HARVEST_CONFIG";

/// Config file picked up from the working directory when nothing else is given.
pub const LOCAL_CONFIG_FILE: &str = "foia-harvest.json";

const DEFAULT_KEYWORD: &str = "Contact Center";
const DEFAULT_BASE_URL: &str = "https://www.tsa.gov/foia/readingroom";
const DEFAULT_OUTPUT_DIR: &str = "pdfs";
const DEFAULT_FILE_PREFIX: &str = "tsa-contact-center-traveler-complaints-report";
const DEFAULT_PAGES: u32 = 25;
const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_MAX_RETRIES: u32 = 2;

/// Known documents whose link text has no usable "<Month> <Year>".
const KNOWN_TITLE_FIXES: &[(&str, &str)] = &[(
    "https://www.tsa.gov/sites/default/files/foia-readingroom/tsa_contact_center_traveler_complaints_report_septermber.pdf",
    "September 2019",
)];

/// Everything a harvest run needs to know.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HarvestConfig {
    /// Substring the link text must contain.
    pub keyword: String,
    /// Listing page URL; pages are requested as `?page=<n>`.
    pub base_url: String,
    /// Directory receiving the reports.
    pub output_dir: PathBuf,
    /// File name prefix; files are `<prefix>-<year>-<MM>.pdf`.
    pub file_prefix: String,
    /// Number of listing pages to visit, starting at page 0.
    pub pages: u32,
    /// Corrected titles keyed by absolute document URL.
    pub title_overrides: TitleOverrides,
    /// Per-request timeout.
    pub timeout_ms: u64,
    /// Retries for transient HTTP failures. 0 disables retrying.
    pub max_retries: u32,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
    /// End the crawl at the first listing page without any anchors.
    pub stop_on_empty_page: bool,
    /// Repeat the crawl on this period when set.
    pub interval_secs: Option<u64>,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            keyword: DEFAULT_KEYWORD.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            pages: DEFAULT_PAGES,
            title_overrides: KNOWN_TITLE_FIXES
                .iter()
                .map(|(url, title)| (url.to_string(), title.to_string()))
                .collect(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            user_agent: format!("foia-harvest/{}", env!("CARGO_PKG_VERSION")),
            stop_on_empty_page: false,
            interval_secs: None,
        }
    }
}

impl HarvestConfig {
    /// Read a JSON config file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> HarvestResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            HarvestError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Load the config from the explicit path, the env var, the local file,
    /// or fall back to defaults, in that order.
    pub fn load(explicit: Option<&Path>) -> HarvestResult<Self> {
        let env_path = std::env::var(CONFIG_ENV).ok();
        match resolve_config_path(explicit, env_path.as_deref(), Path::new(".")) {
            Some(path) => {
                tracing::debug!("loading config from {}", path.display());
                Self::from_file(&path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Reject values the crawl cannot work with.
    pub fn validate(&self) -> HarvestResult<()> {
        if self.keyword.is_empty() {
            return Err(HarvestError::Config("keyword must not be empty".into()));
        }
        if self.pages == 0 {
            return Err(HarvestError::Config("pages must be at least 1".into()));
        }
        if self.file_prefix.is_empty() {
            return Err(HarvestError::Config("file_prefix must not be empty".into()));
        }
        url::Url::parse(&self.base_url)
            .map_err(|e| HarvestError::Config(format!("base_url {:?}: {e}", self.base_url)))?;
        for key in self.title_overrides.keys() {
            url::Url::parse(key).map_err(|_| {
                HarvestError::Config(format!("title override key is not an absolute URL: {key}"))
            })?;
        }
        Ok(())
    }
}

/// Values given on the command line; each one set replaces the file value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub output_dir: Option<PathBuf>,
    pub pages: Option<u32>,
    pub keyword: Option<String>,
    pub base_url: Option<String>,
    /// Only ever switches early stopping on.
    pub stop_on_empty_page: bool,
    pub interval_secs: Option<u64>,
}

impl ConfigOverrides {
    pub fn apply(self, mut cfg: HarvestConfig) -> HarvestConfig {
        if let Some(dir) = self.output_dir {
            cfg.output_dir = dir;
        }
        if let Some(pages) = self.pages {
            cfg.pages = pages;
        }
        if let Some(keyword) = self.keyword {
            cfg.keyword = keyword;
        }
        if let Some(base_url) = self.base_url {
            cfg.base_url = base_url;
        }
        if self.stop_on_empty_page {
            cfg.stop_on_empty_page = true;
        }
        if self.interval_secs.is_some() {
            cfg.interval_secs = self.interval_secs;
        }
        cfg
    }
}

/// Pick the config file: explicit path, then the env var value, then
/// `foia-harvest.json` in `cwd`.
fn resolve_config_path(
    explicit: Option<&Path>,
    env_path: Option<&str>,
    cwd: &Path,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Some(env_path) = env_path.filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(env_path));
    }

    let local = cwd.join(LOCAL_CONFIG_FILE);
    local.exists().then_some(local)
}
