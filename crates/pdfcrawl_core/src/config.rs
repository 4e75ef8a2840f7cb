use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::{CrawlScope, Denylist, NormalizedUrl};

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid {field}: {source}")]
    InvalidUrl {
        field: &'static str,
        #[source]
        source: url::ParseError,
    },
    #[error("domain marker must not be empty")]
    EmptyDomainMarker,
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Everything a crawl run needs, fixed at start.
///
/// Defaults reproduce the single site this tool was written for; a RON file
/// only needs to list the fields it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    pub seed_url: String,
    /// Base for resolving relative hrefs.
    pub base_url: String,
    /// Substring a link's host must contain to be followed.
    pub domain_marker: String,
    pub denylist: Vec<String>,
    /// Directory downloaded documents are written to.
    pub destination_dir: PathBuf,
    /// Fixed `last_updated` stamp (`DD-MM-YYYY`); the run date when unset.
    pub last_updated: Option<String>,
    pub output: OutputConfig,
    pub http: HttpConfig,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            seed_url: "https://www.cncbinternational.com/home/en/index.jsp".to_string(),
            base_url: "https://www.cncbinternational.com".to_string(),
            domain_marker: "www.cncbinternational.com".to_string(),
            denylist: ["fragment", "tc/", "sc/", ".doc", ".jpg", ".png", ".apk"]
                .into_iter()
                .map(String::from)
                .collect(),
            destination_dir: PathBuf::from("pdf_files"),
            last_updated: None,
            output: OutputConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl CrawlConfig {
    pub fn seed(&self) -> Result<NormalizedUrl, ConfigError> {
        NormalizedUrl::parse(&self.seed_url).map_err(|source| ConfigError::InvalidUrl {
            field: "seed_url",
            source,
        })
    }

    pub fn scope(&self) -> Result<CrawlScope, ConfigError> {
        let base = Url::parse(self.base_url.trim()).map_err(|source| ConfigError::InvalidUrl {
            field: "base_url",
            source,
        })?;
        let marker = self.domain_marker.trim();
        if marker.is_empty() {
            return Err(ConfigError::EmptyDomainMarker);
        }
        Ok(CrawlScope::new(base, marker, Denylist::new(&self.denylist)))
    }

    /// Check everything that would otherwise fail halfway through a run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.seed()?;
        self.scope()?;
        self.http.validate()
    }
}

/// Where the run's artifacts land.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub pdf_links_file: String,
    pub traversed_links_file: String,
    pub download_results_file: String,
    pub metadata_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            pdf_links_file: "pdf_links.csv".to_string(),
            traversed_links_file: "traversed_links.csv".to_string(),
            download_results_file: "result_dl.json".to_string(),
            metadata_file: "danswer_metadata.json".to_string(),
        }
    }
}

impl OutputConfig {
    pub fn pdf_links_path(&self) -> PathBuf {
        self.dir.join(&self.pdf_links_file)
    }

    pub fn traversed_links_path(&self) -> PathBuf {
        self.dir.join(&self.traversed_links_file)
    }

    pub fn download_results_path(&self) -> PathBuf {
        self.dir.join(&self.download_results_file)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.dir.join(&self.metadata_file)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Timeouts and retry knobs for the two HTTP paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub page_timeout_secs: u64,
    pub resolve_timeout_secs: u64,
    pub download_timeout_secs: u64,
    pub redirect_limit: usize,
    /// Download attempts, including the first.
    pub download_attempts: u32,
    pub backoff_base_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            page_timeout_secs: 5,
            resolve_timeout_secs: 10,
            download_timeout_secs: 10,
            redirect_limit: 10,
            download_attempts: 3,
            backoff_base_ms: 300,
        }
    }
}

impl HttpConfig {
    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }

    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_secs(self.resolve_timeout_secs)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.page_timeout_secs == 0 {
            return Err(ConfigError::Zero("http.page_timeout_secs"));
        }
        if self.resolve_timeout_secs == 0 {
            return Err(ConfigError::Zero("http.resolve_timeout_secs"));
        }
        if self.download_timeout_secs == 0 {
            return Err(ConfigError::Zero("http.download_timeout_secs"));
        }
        if self.download_attempts == 0 {
            return Err(ConfigError::Zero("http.download_attempts"));
        }
        Ok(())
    }
}
