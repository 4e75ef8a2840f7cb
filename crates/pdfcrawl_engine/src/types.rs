use url::Url;

/// A page body as received, before charset decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// Where the request ended up after redirects.
    pub final_url: Url,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

/// Why a page fetch or destination resolution produced nothing.
///
/// Discovery logs these and drops the URL; none of them abort a run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("cannot request {url}: {reason}")]
    BadRequest { url: String, reason: String },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
    #[error("timed out waiting for {url}")]
    Timeout { url: String },
    #[error("too many redirects starting at {url}")]
    RedirectLoop { url: String },
    #[error("{url} is larger than {limit} bytes")]
    TooLarge { url: String, limit: u64 },
    #[error("connection to {url} failed: {reason}")]
    Connection { url: String, reason: String },
    #[error("http client setup failed: {0}")]
    ClientSetup(String),
}

impl FetchError {
    pub(crate) fn from_reqwest(url: &Url, err: reqwest::Error) -> Self {
        let url = url.to_string();
        if err.is_timeout() {
            Self::Timeout { url }
        } else if err.is_redirect() {
            Self::RedirectLoop { url }
        } else if err.is_builder() {
            Self::BadRequest {
                url,
                reason: err.to_string(),
            }
        } else {
            Self::Connection {
                url,
                reason: err.to_string(),
            }
        }
    }
}
