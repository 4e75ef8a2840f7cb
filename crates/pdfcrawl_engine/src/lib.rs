//! pdfcrawl engine: HTTP, HTML and filesystem side of a crawl run.
mod artifacts;
mod decode;
mod discovery;
mod fetch;
mod links;
mod materialize;
mod persist;
mod retry;
mod types;

pub use artifacts::{
    read_download_records, read_link_table, write_download_records, write_ingestion_metadata,
    write_link_table, ArtifactError, PDF_LINK_COLUMN, TRAVERSED_LINK_COLUMN,
};
pub use decode::{decode_html, DecodeError};
pub use discovery::Discovery;
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use links::extract_hrefs;
pub use materialize::{DownloadSettings, Materializer, WRITE_CHUNK_BYTES};
pub use persist::{ensure_output_dir, write_atomic, PersistError};
pub use retry::{classify_http_status, ErrorKind, RetryDecision, RetryPolicy};
pub use types::{FetchError, FetchedPage};
