use std::time::Duration;

use futures_util::StreamExt;
use pdfcrawl_core::HttpConfig;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::{FetchError, FetchedPage};

const USER_AGENT: &str = concat!("pdfcrawl/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    /// Whole-request timeout for page fetches.
    pub page_timeout: Duration,
    /// Whole-request timeout for destination resolution.
    pub resolve_timeout: Duration,
    pub redirect_limit: usize,
    pub max_page_bytes: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self::from(&HttpConfig::default())
    }
}

impl From<&HttpConfig> for FetchSettings {
    fn from(config: &HttpConfig) -> Self {
        Self {
            connect_timeout: config.page_timeout(),
            page_timeout: config.page_timeout(),
            resolve_timeout: config.resolve_timeout(),
            redirect_limit: config.redirect_limit,
            max_page_bytes: 20 * 1024 * 1024,
        }
    }
}

/// Network access used by discovery. Neither call is retried.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// GET a page with redirects followed; error statuses are failures.
    async fn fetch_page(&self, url: &Url) -> Result<FetchedPage, FetchError>;

    /// GET with redirects followed and report where the request ended up.
    ///
    /// The body is not read and the status is not inspected.
    async fn resolve_destination(&self, url: &Url) -> Result<Url, FetchError>;
}

/// [`Fetcher`] over two reqwest clients, one per timeout budget.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    max_page_bytes: u64,
    pages: reqwest::Client,
    resolver: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        Ok(Self {
            max_page_bytes: settings.max_page_bytes,
            pages: client_with_timeout(&settings, settings.page_timeout)?,
            resolver: client_with_timeout(&settings, settings.resolve_timeout)?,
        })
    }

    async fn read_limited(&self, url: &Url, response: reqwest::Response) -> Result<Vec<u8>, FetchError> {
        let too_large = || FetchError::TooLarge {
            url: url.to_string(),
            limit: self.max_page_bytes,
        };
        if response
            .content_length()
            .is_some_and(|len| len > self.max_page_bytes)
        {
            return Err(too_large());
        }

        let mut body = Vec::new();
        let mut chunks = response.bytes_stream();
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk.map_err(|err| FetchError::from_reqwest(url, err))?;
            if (body.len() + chunk.len()) as u64 > self.max_page_bytes {
                return Err(too_large());
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

fn client_with_timeout(
    settings: &FetchSettings,
    timeout: Duration,
) -> Result<reqwest::Client, FetchError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(settings.connect_timeout)
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit))
        .build()
        .map_err(|err| FetchError::ClientSetup(err.to_string()))
}

#[async_trait::async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch_page(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let response = self
            .pages
            .get(url.clone())
            .send()
            .await
            .map_err(|err| FetchError::from_reqwest(url, err))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }
        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = self.read_limited(url, response).await?;

        Ok(FetchedPage {
            final_url,
            status,
            content_type,
            body,
        })
    }

    async fn resolve_destination(&self, url: &Url) -> Result<Url, FetchError> {
        let response = self
            .resolver
            .get(url.clone())
            .send()
            .await
            .map_err(|err| FetchError::from_reqwest(url, err))?;
        Ok(response.url().clone())
    }
}
