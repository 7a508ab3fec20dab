//! Integration tests for on-demand downloads

use pdf_trawl::config::Config;
use pdf_trawl::{CrawlController, PdfStatus, StartRequest, TrawlError};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PDF_BYTES: &[u8] = b"%PDF-1.7\n%\xe2\xe3\xcf\xd3\n1 0 obj\n<<>>\nendobj\n%%EOF\n";

fn controller() -> CrawlController {
    let mut config = Config::default();
    config.download.timeout_secs = 5;
    CrawlController::new(config).unwrap()
}

fn pdf() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(PDF_BYTES.to_vec(), "application/pdf")
}

#[tokio::test]
async fn test_download_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/report.pdf"))
        .respond_with(pdf())
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let controller = controller();
    let url = format!("{}/files/report.pdf", server.uri());

    let first = controller.download_pdf(&url, dir.path()).await.unwrap();
    assert!(first.ok);
    assert_eq!(first.status, PdfStatus::Downloaded);
    assert_eq!(first.filename, "report.pdf");
    assert_eq!(first.path, dir.path().join("report.pdf"));
    assert_eq!(first.size, Some(PDF_BYTES.len() as u64));
    assert_eq!(std::fs::read(&first.path).unwrap(), PDF_BYTES);

    // Same URL, same path, no second fetch
    let second = controller.download_pdf(&url, dir.path()).await.unwrap();
    assert_eq!(second.status, PdfStatus::AlreadyExists);
    assert_eq!(second.path, first.path);
    assert_eq!(second.size, None);
}

#[tokio::test]
async fn test_colliding_names_are_suffixed() {
    let server = MockServer::start().await;
    for at in ["/2023/report.pdf", "/2024/report.pdf"] {
        Mock::given(method("GET"))
            .and(path(at))
            .respond_with(pdf())
            .mount(&server)
            .await;
    }

    let dir = TempDir::new().unwrap();
    let controller = controller();

    let a = controller
        .download_pdf(&format!("{}/2023/report.pdf", server.uri()), dir.path())
        .await
        .unwrap();
    let b = controller
        .download_pdf(&format!("{}/2024/report.pdf", server.uri()), dir.path())
        .await
        .unwrap();

    assert_eq!(a.filename, "report.pdf");
    assert_eq!(b.filename, "report-1.pdf");
    assert_eq!(b.status, PdfStatus::Downloaded);
    assert!(dir.path().join("report.pdf").exists());
    assert!(dir.path().join("report-1.pdf").exists());
}

#[tokio::test]
async fn test_http_error_is_download_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let result = controller()
        .download_pdf(&format!("{}/missing.pdf", server.uri()), dir.path())
        .await;

    match result {
        Err(TrawlError::DownloadFailure { message, .. }) => assert_eq!(message, "HTTP 404"),
        other => panic!("expected download failure, got {:?}", other),
    }
    assert!(!dir.path().join("missing.pdf").exists());
}

#[tokio::test]
async fn test_non_pdf_response_rejected_for_unconfirmed_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download/thing"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html></html>", "text/html"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let result = controller()
        .download_pdf(&format!("{}/download/thing", server.uri()), dir.path())
        .await;

    match result {
        Err(TrawlError::DownloadFailure { message, .. }) => {
            assert!(message.contains("not a PDF"), "{}", message)
        }
        other => panic!("expected download failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_url_rejected() {
    let dir = TempDir::new().unwrap();
    let result = controller()
        .download_pdf("javascript:alert(1)", dir.path())
        .await;
    assert!(matches!(result, Err(TrawlError::InvalidUrl(_))));
}

#[tokio::test]
async fn test_download_updates_session_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<html><body><a href="/download/annual">Annual report</a></body></html>"#,
            "text/html",
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/download/annual"))
        .respond_with(pdf())
        .mount(&server)
        .await;

    let mut config = Config::default();
    config.crawler.probe_unverified = false;
    let controller = CrawlController::new(config).unwrap();

    controller
        .start_crawl(StartRequest {
            website_url: server.uri(),
            max_depth: 1,
            download_dir: None,
            auto_download: false,
        })
        .await
        .unwrap();
    tokio::time::timeout(Duration::from_secs(10), controller.wait())
        .await
        .expect("crawl did not finish in time");

    let before = controller.results();
    assert_eq!(before.len(), 1);
    assert_eq!(before[0].status, PdfStatus::Unverified);

    let dir = TempDir::new().unwrap();
    let report = controller
        .download_pdf(&before[0].url, dir.path())
        .await
        .unwrap();
    assert_eq!(report.status, PdfStatus::Downloaded);

    let after = controller.results();
    assert_eq!(after[0].status, PdfStatus::Downloaded);
    assert_eq!(after[0].size, Some(PDF_BYTES.len() as u64));
    assert_eq!(after[0].local_path.as_deref(), Some(report.path.as_path()));
    assert_eq!(after[0].content_type.as_deref(), Some("application/pdf"));
}

#[tokio::test]
async fn test_download_all_after_crawl() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<html><body>
                <a href="/a.pdf">a</a>
                <a href="/download/b">b</a>
                <a href="/download/c">c</a>
            </body></html>"#,
            "text/html",
        ))
        .mount(&server)
        .await;
    for at in ["/a.pdf", "/download/b"] {
        Mock::given(method("GET"))
            .and(path(at))
            .respond_with(pdf())
            .expect(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/download/c"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html></html>", "text/html"))
        .mount(&server)
        .await;

    let mut config = Config::default();
    config.crawler.probe_unverified = false;
    config.download.concurrency = 2;
    let controller = CrawlController::new(config).unwrap();

    controller
        .start_crawl(StartRequest {
            website_url: server.uri(),
            max_depth: 1,
            download_dir: None,
            auto_download: false,
        })
        .await
        .unwrap();
    tokio::time::timeout(Duration::from_secs(10), controller.wait())
        .await
        .expect("crawl did not finish in time");
    assert_eq!(controller.status().urls_visited, 1);

    let dir = TempDir::new().unwrap();
    let attempted = controller.download_all(dir.path()).await.unwrap();
    assert_eq!(attempted.len(), 3);

    let by_suffix = |suffix: &str| {
        attempted
            .iter()
            .find(|r| r.url.ends_with(suffix))
            .cloned()
            .unwrap()
    };

    let a = by_suffix("/a.pdf");
    assert_eq!(a.status, PdfStatus::Downloaded);
    assert_eq!(std::fs::read(dir.path().join("a.pdf")).unwrap(), PDF_BYTES);

    let b = by_suffix("/download/b");
    assert_eq!(b.status, PdfStatus::Downloaded);
    assert_eq!(b.size, Some(PDF_BYTES.len() as u64));

    let c = by_suffix("/download/c");
    assert_eq!(c.status, PdfStatus::DownloadFailed);
    assert!(c.error.as_deref().unwrap_or("").contains("not a PDF"));
    assert!(c.local_path.is_none());

    // The session's records carry the same outcomes
    assert_eq!(controller.results(), attempted);

    // Nothing is left untried, so a second pass fetches nothing
    assert!(controller.download_all(dir.path()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_download_all_rejected_while_running() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html></html>", "text/html")
                .set_delay(Duration::from_secs(30)),
        )
        .mount(&server)
        .await;

    let controller = controller();
    controller
        .start_crawl(StartRequest {
            website_url: server.uri(),
            max_depth: 1,
            download_dir: None,
            auto_download: false,
        })
        .await
        .unwrap();

    let dir = TempDir::new().unwrap();
    assert!(matches!(
        controller.download_all(dir.path()).await,
        Err(TrawlError::AlreadyRunning)
    ));

    controller.stop_crawl().await;
}
