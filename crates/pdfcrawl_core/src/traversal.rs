use std::collections::HashMap;

use crate::{CrawlScope, NormalizedUrl, UrlSet};

/// Outcome of classifying a URL taken from the frontier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Denylisted or outside the target domain; never fetched.
    Pruned,
    /// Collected as a document; never fetched as a page.
    Pdf,
    /// Fetched and expanded for further links.
    Page,
}

/// Work for one breadth-first round, produced from the current frontier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundPlan {
    pub round: usize,
    /// PDF links first seen in this round.
    pub new_pdfs: Vec<NormalizedUrl>,
    /// Pages to fetch, none of them visited yet.
    pub pages: Vec<NormalizedUrl>,
}

/// Final sets handed to the driver for persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalOutcome {
    pub pdf_links: Vec<NormalizedUrl>,
    pub visited: Vec<NormalizedUrl>,
    pub rounds: usize,
}

/// Crawl context owned by a single discovery run.
///
/// Holds the frontier, the visited set and the PDF link set. Nothing here
/// performs IO; the engine asks for a [`RoundPlan`], fetches the pages, and
/// feeds the resolved links back through [`TraversalState::set_frontier`].
#[derive(Debug, Clone)]
pub struct TraversalState {
    scope: CrawlScope,
    frontier: UrlSet,
    visited: UrlSet,
    pdf_links: UrlSet,
    classified: HashMap<NormalizedUrl, Classification>,
    round: usize,
}

impl TraversalState {
    pub fn new(scope: CrawlScope, seed: NormalizedUrl) -> Self {
        let mut frontier = UrlSet::new();
        frontier.insert(seed);
        Self {
            scope,
            frontier,
            visited: UrlSet::new(),
            pdf_links: UrlSet::new(),
            classified: HashMap::new(),
            round: 0,
        }
    }

    pub fn frontier(&self) -> &UrlSet {
        &self.frontier
    }

    pub fn visited(&self) -> &UrlSet {
        &self.visited
    }

    pub fn pdf_links(&self) -> &UrlSet {
        &self.pdf_links
    }

    pub fn is_visited(&self, url: &NormalizedUrl) -> bool {
        self.visited.contains(url)
    }

    pub fn classification(&self, url: &NormalizedUrl) -> Option<Classification> {
        self.classified.get(url).copied()
    }

    pub fn classifications(&self) -> impl Iterator<Item = (&NormalizedUrl, Classification)> {
        self.classified.iter().map(|(url, class)| (url, *class))
    }

    /// Drain the frontier into the next round's plan.
    ///
    /// Returns `None` once the frontier is empty, which is the only way a
    /// traversal ends.
    pub fn next_round(&mut self) -> Option<RoundPlan> {
        if self.frontier.is_empty() {
            return None;
        }
        self.round += 1;
        let frontier = std::mem::take(&mut self.frontier);

        let mut new_pdfs = Vec::new();
        let mut pages = Vec::new();
        for url in frontier {
            if self.scope.is_denied(&url) || !self.scope.in_domain(&url) {
                self.classify(&url, Classification::Pruned);
                continue;
            }
            if self.visited.contains(&url) {
                continue;
            }
            if url.is_pdf() {
                self.classify(&url, Classification::Pdf);
                if self.pdf_links.insert(url.clone()) {
                    new_pdfs.push(url);
                }
                continue;
            }
            self.classify(&url, Classification::Page);
            pages.push(url);
        }

        Some(RoundPlan {
            round: self.round,
            new_pdfs,
            pages,
        })
    }

    /// Record that a page is about to be fetched.
    ///
    /// Returns `false` if it was already visited, in which case it must not be
    /// fetched again.
    pub fn mark_visited(&mut self, url: &NormalizedUrl) -> bool {
        self.visited.insert(url.clone())
    }

    /// Resolve hrefs from a fetched page into next-round candidates.
    ///
    /// Keeps in-domain links that have not been visited; `candidates`
    /// deduplicates across all pages of the round.
    pub fn collect_links<'a, I>(&self, hrefs: I, candidates: &mut UrlSet) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut added = 0;
        for href in hrefs {
            let Some(url) = self.scope.resolve_href(href) else {
                continue;
            };
            if !self.scope.in_domain(&url) || self.visited.contains(&url) {
                continue;
            }
            if candidates.insert(url) {
                added += 1;
            }
        }
        added
    }

    /// Install the next frontier; already-visited URLs are left out.
    pub fn set_frontier<I>(&mut self, urls: I)
    where
        I: IntoIterator<Item = NormalizedUrl>,
    {
        let visited = &self.visited;
        self.frontier = urls.into_iter().filter(|url| !visited.contains(url)).collect();
    }

    pub fn rounds(&self) -> usize {
        self.round
    }

    pub fn finish(self) -> TraversalOutcome {
        TraversalOutcome {
            pdf_links: self.pdf_links.into_vec(),
            visited: self.visited.into_vec(),
            rounds: self.round,
        }
    }

    fn classify(&mut self, url: &NormalizedUrl, class: Classification) {
        self.classified.entry(url.clone()).or_insert(class);
    }
}
