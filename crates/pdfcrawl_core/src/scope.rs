use url::Url;

use crate::NormalizedUrl;

/// Case-insensitive substring denylist applied before any network access.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Denylist {
    patterns: Vec<String>,
}

impl Denylist {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| p.as_ref().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        Self { patterns }
    }

    pub fn matches(&self, url: &str) -> bool {
        let lower = url.to_lowercase();
        self.patterns.iter().any(|p| lower.contains(p.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// The site a crawl is confined to and how its links are resolved.
#[derive(Debug, Clone)]
pub struct CrawlScope {
    base_url: Url,
    domain_marker: String,
    denylist: Denylist,
}

impl CrawlScope {
    pub fn new(base_url: Url, domain_marker: impl Into<String>, denylist: Denylist) -> Self {
        Self {
            base_url,
            domain_marker: domain_marker.into().to_ascii_lowercase(),
            denylist,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn domain_marker(&self) -> &str {
        &self.domain_marker
    }

    /// Host contains the configured domain marker.
    pub fn in_domain(&self, url: &NormalizedUrl) -> bool {
        url.host()
            .map(|host| host.to_ascii_lowercase().contains(&self.domain_marker))
            .unwrap_or(false)
    }

    pub fn is_denied(&self, url: &NormalizedUrl) -> bool {
        self.denylist.matches(url.as_str())
    }

    /// Turn an anchor href into a normalized absolute URL.
    ///
    /// Empty hrefs and any href carrying a fragment marker yield `None`, as do
    /// hrefs that cannot be joined onto the base URL.
    pub fn resolve_href(&self, href: &str) -> Option<NormalizedUrl> {
        let trimmed = href.trim();
        if trimmed.is_empty() || trimmed.contains('#') {
            return None;
        }
        self.base_url.join(trimmed).ok().map(NormalizedUrl::from_url)
    }
}
