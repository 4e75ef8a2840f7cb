//! pdfcrawl core: pure crawl state, URL rules and result transforms.
mod config;
mod filename;
mod normalize;
mod record;
mod scope;
mod traversal;
mod url_set;

pub use config::{ConfigError, CrawlConfig, HttpConfig, OutputConfig};
pub use filename::{candidate_filename, is_valid_pdf_filename, FilenameAllocator};
pub use normalize::NormalizedUrl;
pub use record::{ingestion_metadata, DownloadRecord, IngestionMetadata, LAST_UPDATED_FORMAT};
pub use scope::{CrawlScope, Denylist};
pub use traversal::{Classification, RoundPlan, TraversalOutcome, TraversalState};
pub use url_set::UrlSet;
