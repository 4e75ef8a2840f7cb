use std::collections::HashMap;
use std::sync::{Mutex, Once};

use pdfcrawl_core::{CrawlScope, Denylist, NormalizedUrl};
use pdfcrawl_engine::{
    Discovery, FetchError, FetchSettings, FetchedPage, Fetcher, ReqwestFetcher,
};
use pretty_assertions::assert_eq;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><body>{body}</body></html>"),
        "text/html; charset=utf-8",
    )
}

fn local_scope(server: &MockServer, denylist: &[&str]) -> CrawlScope {
    CrawlScope::new(
        Url::parse(&server.uri()).unwrap(),
        "127.0.0.1",
        Denylist::new(denylist),
    )
}

fn at(server: &MockServer, p: &str) -> NormalizedUrl {
    NormalizedUrl::parse(&format!("{}{}", server.uri(), p)).unwrap()
}

async fn hits(server: &MockServer, p: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|req| req.url.path() == p)
        .count()
}

#[tokio::test]
async fn seed_links_are_partitioned_and_expanded() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/home"))
        .respond_with(html(
            r##"<a href="/a">A</a>
                <a href="/a.pdf">PDF</a>
                <a href="https://other-domain.example/x.pdf">elsewhere</a>
                <a href="#section">jump</a>"##,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html(r#"<a href="/home">home</a><a href="/b">B</a><a href="/c?x=1">C</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/a.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("%PDF-1.4", "application/pdf"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/c"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("Location", format!("{}/b?ref=c", server.uri())),
        )
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default()).unwrap();
    let discovery = Discovery::new(&fetcher, local_scope(&server, &[]), at(&server, "/home"));
    let outcome = discovery.run().await;

    assert_eq!(outcome.pdf_links, vec![at(&server, "/a.pdf")]);
    assert_eq!(
        outcome.visited,
        vec![at(&server, "/home"), at(&server, "/a"), at(&server, "/b")]
    );
    assert_eq!(outcome.rounds, 3);

    assert_eq!(hits(&server, "/home").await, 1);
    // Resolution only; never fetched as a page.
    assert_eq!(hits(&server, "/a.pdf").await, 1);
    // /c aliases /b, so /b is resolved twice (directly and via the redirect)
    // and fetched once; its failure is not retried.
    assert_eq!(hits(&server, "/c").await, 1);
    assert_eq!(hits(&server, "/b").await, 3);
}

#[tokio::test]
async fn denylisted_and_unreachable_links_are_dropped() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/home"))
        .respond_with(html(
            r#"<a href="/home/tc/index.jsp">zh</a>
               <a href="/img/banner.JPG">img</a>
               <a href="/gone">gone</a>
               <a href="/docs/report.pdf">report</a>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/home/tc/index.jsp"))
        .respond_with(html(""))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/img/banner.JPG"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/docs/report.pdf"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    // No mock for /gone: wiremock answers 404, which resolution ignores.

    let fetcher = ReqwestFetcher::new(FetchSettings::default()).unwrap();
    let scope = local_scope(&server, &["tc/", ".jpg"]);
    let outcome = Discovery::new(&fetcher, scope, at(&server, "/home")).run().await;

    assert_eq!(outcome.pdf_links, vec![at(&server, "/docs/report.pdf")]);
    assert_eq!(outcome.visited, vec![at(&server, "/home"), at(&server, "/gone")]);
    // Resolution still touches denylisted links; the page fetch never does.
    assert_eq!(hits(&server, "/home/tc/index.jsp").await, 1);
    assert_eq!(hits(&server, "/gone").await, 2);
}

#[tokio::test]
async fn unreachable_seed_ends_the_crawl() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/home"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default()).unwrap();
    let outcome = Discovery::new(&fetcher, local_scope(&server, &[]), at(&server, "/home"))
        .run()
        .await;

    assert!(outcome.pdf_links.is_empty());
    assert_eq!(outcome.visited, vec![at(&server, "/home")]);
    assert_eq!(outcome.rounds, 1);
    assert_eq!(hits(&server, "/home").await, 1);
}

fn raw_page(bytes: &[u8], content_type: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(bytes.to_vec(), content_type)
}

#[tokio::test]
async fn stray_invalid_byte_does_not_cost_the_page_its_links() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/home"))
        .respond_with(raw_page(
            b"<html><body><a href=\"/docs/annual.pdf\">Annual</a>\
              <a href=\"/about\">About</a><p>Caf\xe9</p></body></html>",
            "text/html; charset=utf-8",
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(html("<p>about us</p>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/docs/annual.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("%PDF-1.4", "application/pdf"))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default()).unwrap();
    let outcome = Discovery::new(&fetcher, local_scope(&server, &[]), at(&server, "/home"))
        .run()
        .await;

    assert_eq!(outcome.pdf_links, vec![at(&server, "/docs/annual.pdf")]);
    assert_eq!(outcome.visited, vec![at(&server, "/home"), at(&server, "/about")]);
}

#[tokio::test]
async fn failed_extraction_skips_that_page_but_not_its_siblings() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/home"))
        .respond_with(html(r#"<a href="/broken">broken</a><a href="/healthy">healthy</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(raw_page(
            b"\x00\x00\x00<a href=\"/from-broken\">hidden</a>",
            "text/html",
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/healthy"))
        .respond_with(html(r#"<a href="/next">next</a><a href="/docs/h.pdf">h</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/next"))
        .respond_with(html("<p>end</p>"))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default()).unwrap();
    let outcome = Discovery::new(&fetcher, local_scope(&server, &[]), at(&server, "/home"))
        .run()
        .await;

    assert_eq!(
        outcome.visited,
        vec![
            at(&server, "/home"),
            at(&server, "/broken"),
            at(&server, "/healthy"),
            at(&server, "/next"),
        ]
    );
    assert_eq!(outcome.pdf_links, vec![at(&server, "/docs/h.pdf")]);
    assert_eq!(outcome.rounds, 3);
    assert_eq!(hits(&server, "/from-broken").await, 0);
}

/// In-memory site: page bodies, redirects, and a log of every call.
#[derive(Default)]
struct FakeSite {
    pages: HashMap<String, String>,
    redirects: HashMap<String, String>,
    page_fetches: Mutex<Vec<String>>,
}

impl FakeSite {
    fn page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }

    fn redirect(mut self, from: &str, to: &str) -> Self {
        self.redirects.insert(from.to_string(), to.to_string());
        self
    }

    fn fetched(&self) -> Vec<String> {
        self.page_fetches.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Fetcher for FakeSite {
    async fn fetch_page(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        self.page_fetches.lock().unwrap().push(url.to_string());
        let body = self.pages.get(url.as_str()).ok_or_else(|| FetchError::Status {
            url: url.to_string(),
            status: 404,
        })?;
        Ok(FetchedPage {
            final_url: url.clone(),
            status: 200,
            content_type: Some("text/html".to_string()),
            body: body.clone().into_bytes(),
        })
    }

    async fn resolve_destination(&self, url: &Url) -> Result<Url, FetchError> {
        let target = self.redirects.get(url.as_str()).map(String::as_str);
        Ok(Url::parse(target.unwrap_or(url.as_str())).unwrap())
    }
}

#[tokio::test]
async fn redirect_aliases_collapse_and_no_page_is_fetched_twice() {
    init_logging();
    let site = FakeSite::default()
        .page(
            "https://www.site.example/",
            r#"<a href="/p1">1</a><a href="/p1-old">old</a><a href="/P1?ref=nav">case</a>"#,
        )
        .page(
            "https://www.site.example/p1",
            r#"<a href="/">home</a><a href="/p2">2</a><a href="/files/doc.pdf">doc</a>"#,
        )
        .page(
            "https://www.site.example/p2",
            r#"<a href="/p1">1</a><a href="/p1-old">old</a><a href="/files/doc.pdf?dl=1">doc</a>"#,
        )
        .page("https://www.site.example/P1", "<p>case-sensitive path</p>")
        .redirect("https://www.site.example/p1-old", "https://www.site.example/p1?from=old");

    let scope = CrawlScope::new(
        Url::parse("https://www.site.example").unwrap(),
        "www.site.example",
        Denylist::default(),
    );
    let seed = NormalizedUrl::parse("https://www.site.example/").unwrap();
    let outcome = Discovery::new(&site, scope, seed).run().await;

    assert_eq!(
        site.fetched(),
        vec![
            "https://www.site.example/",
            "https://www.site.example/p1",
            "https://www.site.example/P1",
            "https://www.site.example/p2",
        ]
    );
    let pdfs: Vec<_> = outcome.pdf_links.iter().map(|u| u.as_str()).collect();
    assert_eq!(pdfs, vec!["https://www.site.example/files/doc.pdf"]);
}
