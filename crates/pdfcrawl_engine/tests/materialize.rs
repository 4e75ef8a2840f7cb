use std::fs;
use std::sync::Once;
use std::time::Duration;

use pdfcrawl_core::DownloadRecord;
use pdfcrawl_engine::{DownloadSettings, Materializer, RetryPolicy};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn fast_settings() -> DownloadSettings {
    DownloadSettings {
        retry: RetryPolicy {
            base_delay: Duration::from_millis(10),
            ..RetryPolicy::default()
        },
        ..DownloadSettings::default()
    }
}

fn pdf(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "application/pdf")
}

fn record(url: String, name: &str, ok: bool) -> DownloadRecord {
    DownloadRecord {
        original_url: url,
        file_name: name.to_string(),
        dl_status: ok,
    }
}

#[tokio::test]
async fn downloads_into_destination_with_url_basename() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/report.pdf"))
        .respond_with(pdf("%PDF-1.7 report"))
        .mount(&server)
        .await;

    let dest = TempDir::new().unwrap();
    let mut materializer = Materializer::new(dest.path().to_path_buf(), fast_settings()).unwrap();
    let url = format!("{}/files/report.pdf", server.uri());

    let records = materializer.download_all([url.as_str()]).await;

    assert_eq!(records, vec![record(url, "report.pdf", true)]);
    assert_eq!(
        fs::read_to_string(dest.path().join("report.pdf")).unwrap(),
        "%PDF-1.7 report"
    );
}

#[tokio::test]
async fn existing_file_is_skipped_without_request_or_record() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(pdf("new content"))
        .mount(&server)
        .await;

    let dest = TempDir::new().unwrap();
    fs::write(dest.path().join("report.pdf"), "old content").unwrap();
    let mut materializer = Materializer::new(dest.path().to_path_buf(), fast_settings()).unwrap();

    let records = materializer
        .download_all([format!("{}/other/dir/report.pdf", server.uri())])
        .await;

    assert!(records.is_empty());
    assert!(server.received_requests().await.unwrap().is_empty());
    assert_eq!(
        fs::read_to_string(dest.path().join("report.pdf")).unwrap(),
        "old content"
    );
}

#[tokio::test]
async fn server_errors_are_retried_until_success() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky.pdf"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky.pdf"))
        .respond_with(pdf("%PDF finally"))
        .mount(&server)
        .await;

    let dest = TempDir::new().unwrap();
    let mut materializer = Materializer::new(dest.path().to_path_buf(), fast_settings()).unwrap();
    let url = format!("{}/flaky.pdf", server.uri());

    let records = materializer.download_all([url.clone()]).await;

    assert_eq!(records, vec![record(url, "flaky.pdf", true)]);
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn persistent_server_error_gives_up_after_three_attempts() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/down.pdf"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let dest = TempDir::new().unwrap();
    let mut materializer = Materializer::new(dest.path().to_path_buf(), fast_settings()).unwrap();
    let url = format!("{}/down.pdf", server.uri());

    let records = materializer.download_all([url.clone()]).await;

    assert_eq!(records, vec![record(url, "down.pdf", false)]);
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
    assert!(!dest.path().join("down.pdf").exists());
}

#[tokio::test]
async fn client_error_fails_without_retry() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing.pdf"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dest = TempDir::new().unwrap();
    let mut materializer = Materializer::new(dest.path().to_path_buf(), fast_settings()).unwrap();
    let url = format!("{}/missing.pdf", server.uri());

    let records = materializer.download_all([url.clone()]).await;

    assert_eq!(records, vec![record(url, "missing.pdf", false)]);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
    assert!(!dest.path().join("missing.pdf").exists());
}

#[tokio::test]
async fn empty_body_counts_as_failure_and_leaves_no_file() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/empty.pdf"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let dest = TempDir::new().unwrap();
    let mut materializer = Materializer::new(dest.path().to_path_buf(), fast_settings()).unwrap();
    let url = format!("{}/empty.pdf", server.uri());

    let records = materializer.download_all([url.clone()]).await;

    assert_eq!(records, vec![record(url, "empty.pdf", false)]);
    assert!(!dest.path().join("empty.pdf").exists());
}

#[tokio::test]
async fn unsafe_names_get_run_scoped_placeholders() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(pdf("%PDF"))
        .mount(&server)
        .await;

    let dest = TempDir::new().unwrap();
    let mut materializer = Materializer::new(dest.path().to_path_buf(), fast_settings()).unwrap();
    let urls = vec![
        format!("{}/docs/report%20(1).pdf", server.uri()),
        format!("{}/docs/plain.pdf", server.uri()),
        format!("{}/docs/r%C3%A9sum%C3%A9.pdf", server.uri()),
    ];

    let records = materializer.download_all(&urls).await;

    let names: Vec<_> = records.iter().map(|r| r.file_name.as_str()).collect();
    assert_eq!(names, vec!["tmp_fn_0.pdf", "plain.pdf", "tmp_fn_1.pdf"]);
    assert!(records.iter().all(|r| r.dl_status));
    assert!(dest.path().join("tmp_fn_1.pdf").exists());
}

#[tokio::test]
async fn one_failure_does_not_stop_the_batch() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ok.pdf"))
        .respond_with(pdf("%PDF ok"))
        .mount(&server)
        .await;

    let dest = TempDir::new().unwrap();
    let mut materializer = Materializer::new(dest.path().to_path_buf(), fast_settings()).unwrap();
    let urls = vec![
        "not a url/broken.pdf".to_string(),
        format!("{}/ok.pdf", server.uri()),
    ];

    let records = materializer.download_all(&urls).await;

    assert_eq!(
        records,
        vec![
            record(urls[0].clone(), "broken.pdf", false),
            record(urls[1].clone(), "ok.pdf", true),
        ]
    );
}
