use std::collections::HashSet;

use crate::NormalizedUrl;

/// Insertion-ordered set of normalized URLs.
///
/// Order is kept so persisted link tables list URLs in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlSet {
    order: Vec<NormalizedUrl>,
    members: HashSet<NormalizedUrl>,
}

impl UrlSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the URL was already present.
    pub fn insert(&mut self, url: NormalizedUrl) -> bool {
        if self.members.contains(&url) {
            return false;
        }
        self.members.insert(url.clone());
        self.order.push(url);
        true
    }

    pub fn contains(&self, url: &NormalizedUrl) -> bool {
        self.members.contains(url)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NormalizedUrl> {
        self.order.iter()
    }

    pub fn into_vec(self) -> Vec<NormalizedUrl> {
        self.order
    }
}

impl FromIterator<NormalizedUrl> for UrlSet {
    fn from_iter<I: IntoIterator<Item = NormalizedUrl>>(iter: I) -> Self {
        let mut set = UrlSet::new();
        for url in iter {
            set.insert(url);
        }
        set
    }
}

impl IntoIterator for UrlSet {
    type Item = NormalizedUrl;
    type IntoIter = std::vec::IntoIter<NormalizedUrl>;

    fn into_iter(self) -> Self::IntoIter {
        self.order.into_iter()
    }
}

impl Extend<NormalizedUrl> for UrlSet {
    fn extend<I: IntoIterator<Item = NormalizedUrl>>(&mut self, iter: I) {
        for url in iter {
            self.insert(url);
        }
    }
}
