use engine_logging::{engine_debug, engine_info, engine_warn};
use pdfcrawl_core::{CrawlScope, NormalizedUrl, TraversalOutcome, TraversalState, UrlSet};

use crate::{decode_html, extract_hrefs, Fetcher};

/// Same-domain breadth-first link discovery.
///
/// Each round drains the frontier, records PDF links, fetches every new page
/// once and gathers its in-domain links. The gathered links are then passed
/// through destination resolution so redirect aliases collapse into one URL
/// before they become the next frontier. Runs until a round produces no
/// frontier. Every network failure drops the URL involved and nothing else.
pub struct Discovery<'a> {
    fetcher: &'a dyn Fetcher,
    state: TraversalState,
}

impl<'a> Discovery<'a> {
    pub fn new(fetcher: &'a dyn Fetcher, scope: CrawlScope, seed: NormalizedUrl) -> Self {
        Self {
            fetcher,
            state: TraversalState::new(scope, seed),
        }
    }

    pub async fn run(mut self) -> TraversalOutcome {
        while let Some(plan) = self.state.next_round() {
            engine_info!(
                "Round {}: processing {} pages, {} PDF links found so far",
                plan.round,
                plan.pages.len(),
                self.state.pdf_links().len()
            );
            for pdf in &plan.new_pdfs {
                engine_info!("pdf {} has been added", pdf);
            }

            let mut candidates = UrlSet::new();
            for page in &plan.pages {
                self.expand_page(page, &mut candidates).await;
            }

            let next = self.resolve_destinations(candidates).await;
            self.state.set_frontier(next);
        }

        let outcome = self.state.finish();
        engine_info!(
            "Discovery finished after {} rounds: {} pages visited, {} PDF links",
            outcome.rounds,
            outcome.visited.len(),
            outcome.pdf_links.len()
        );
        outcome
    }

    async fn expand_page(&mut self, page: &NormalizedUrl, candidates: &mut UrlSet) {
        if !self.state.mark_visited(page) {
            return;
        }

        let fetched = match self.fetcher.fetch_page(page.as_url()).await {
            Ok(fetched) => fetched,
            Err(err) => {
                engine_info!("Could not fetch {}: {}", page, err);
                return;
            }
        };
        if fetched.final_url != *page.as_url() {
            engine_debug!("{} was served from {}", page, fetched.final_url);
        }
        if fetched.status != 200 {
            engine_info!("Not expanding {}: status {}", page, fetched.status);
            return;
        }

        let html = match decode_html(&fetched.body, fetched.content_type.as_deref()) {
            Ok(html) => html,
            Err(err) => {
                engine_warn!("Skipping links of {}: {}", page, err);
                return;
            }
        };

        let hrefs = extract_hrefs(&html);
        let added = self
            .state
            .collect_links(hrefs.iter().map(String::as_str), candidates);
        engine_debug!("{}: {} anchors, {} new candidates", page, hrefs.len(), added);
    }

    async fn resolve_destinations(&self, candidates: UrlSet) -> UrlSet {
        let mut resolved = UrlSet::new();
        for candidate in candidates {
            match self.fetcher.resolve_destination(candidate.as_url()).await {
                Ok(final_url) => {
                    let destination = NormalizedUrl::from_url(final_url);
                    if destination != candidate {
                        engine_debug!("{} resolves to {}", candidate, destination);
                    }
                    resolved.insert(destination);
                }
                Err(err) => engine_info!("Error accessing {}: {}", candidate, err),
            }
        }
        resolved
    }
}
