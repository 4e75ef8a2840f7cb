use std::fmt;

use url::Url;

/// Absolute URL reduced to scheme, authority and path.
///
/// Query string and fragment are dropped on construction, so two links that
/// differ only in those parts compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedUrl(Url);

impl NormalizedUrl {
    pub fn from_url(mut url: Url) -> Self {
        url.set_query(None);
        url.set_fragment(None);
        Self(url)
    }

    pub fn parse(raw: &str) -> Result<Self, url::ParseError> {
        Url::parse(raw.trim()).map(Self::from_url)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    /// Path ends in `.pdf`, ignoring case.
    pub fn is_pdf(&self) -> bool {
        self.0.path().to_ascii_lowercase().ends_with(".pdf")
    }
}

impl fmt::Display for NormalizedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Url> for NormalizedUrl {
    fn from(url: Url) -> Self {
        Self::from_url(url)
    }
}

impl From<NormalizedUrl> for String {
    fn from(url: NormalizedUrl) -> Self {
        url.0.into()
    }
}
