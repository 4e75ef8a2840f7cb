//! Loading the crawl configuration from RON.

use std::fs;
use std::path::{Path, PathBuf};

use engine_logging::engine_info;
use pdfcrawl_core::{ConfigError, CrawlConfig};
use thiserror::Error;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "pdfcrawl.ron";

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

/// Read the config named on the command line, or the default file if it
/// exists, or fall back to built-in defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<CrawlConfig, ConfigLoadError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !default.exists() {
                return Ok(CrawlConfig::default());
            }
            default
        }
    };

    let content = fs::read_to_string(&path).map_err(|source| ConfigLoadError::Read {
        path: path.clone(),
        source,
    })?;
    let config: CrawlConfig = ron::from_str(&content).map_err(|source| ConfigLoadError::Parse {
        path: path.clone(),
        source,
    })?;
    engine_info!("Loaded config from {:?}", path);
    Ok(config)
}
