//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and drive full crawl
//! sessions through the public controller API.

use pdf_trawl::config::Config;
use pdf_trawl::{CrawlController, PdfStatus, StartRequest, TrawlError};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PDF_BYTES: &[u8] = b"%PDF-1.4\n1 0 obj\n<<>>\nendobj\ntrailer\n<<>>\n%%EOF\n";

/// Creates a test configuration with short timeouts
fn create_test_config() -> Config {
    let mut config = Config::default();
    config.crawler.concurrency = 4;
    config.crawler.request_timeout_secs = 5;
    config.user_agent.crawler_name = "TestBot".to_string();
    config
}

fn request(server: &MockServer, max_depth: u32) -> StartRequest {
    StartRequest {
        website_url: server.uri(),
        max_depth,
        download_dir: None,
        auto_download: false,
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><head><title>Test</title></head><body>{}</body></html>", body),
        "text/html",
    )
}

fn pdf() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(PDF_BYTES.to_vec(), "application/pdf")
}

async fn mount_page(server: &MockServer, at: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(html(body))
        .mount(server)
        .await;
}

/// Waits for the session to finish on its own
async fn wait_for_completion(controller: &CrawlController) {
    tokio::time::timeout(Duration::from_secs(15), controller.wait())
        .await
        .expect("crawl did not finish in time");
    assert!(!controller.status().is_running);
}

#[tokio::test]
async fn test_full_crawl_finds_pdfs() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"
        <a href="/page1">Page 1</a>
        <a href="/docs/report.pdf">Report</a>
        <a href="/download/brochure">Brochure</a>
        <a href="/page2#top">Page 2</a>
        "#,
    )
    .await;
    mount_page(
        &server,
        "/page1",
        r#"
        <a href="/page3">Page 3</a>
        <embed src="/files/guide.pdf">
        <a href="mailto:someone@example.com">Mail</a>
        "#,
    )
    .await;
    mount_page(&server, "/page2", r#"<a href="/">Home</a><a href="/page1">P1</a>"#).await;
    mount_page(&server, "/page3", "nothing here").await;

    Mock::given(method("HEAD"))
        .and(path("/download/brochure"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "application/pdf"))
        .expect(1)
        .mount(&server)
        .await;

    let controller = CrawlController::new(create_test_config()).unwrap();
    controller.start_crawl(request(&server, 3)).await.unwrap();
    wait_for_completion(&controller).await;

    let status = controller.status();
    assert_eq!(status.urls_processed, 4);
    assert_eq!(status.urls_visited, 4);
    assert_eq!(status.current_depth, 2);
    assert_eq!(status.pdfs_found, 3);
    assert!(status.error.is_none());

    let results = controller.results();
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r.status == PdfStatus::Found));

    let brochure = results
        .iter()
        .find(|r| r.url.ends_with("/download/brochure"))
        .expect("brochure recorded");
    assert_eq!(brochure.filename, "brochure.pdf");
    assert_eq!(brochure.content_type.as_deref(), Some("application/pdf"));
    assert_eq!(brochure.source_url, format!("{}/", server.uri()));

    let guide = results
        .iter()
        .find(|r| r.url.ends_with("/files/guide.pdf"))
        .expect("embedded pdf recorded");
    assert_eq!(guide.source_url, format!("{}/page1", server.uri()));
}

#[tokio::test]
async fn test_depth_bound_respected() {
    let server = MockServer::start().await;

    let links: String = (0..50)
        .map(|i| format!(r#"<a href="/p{}">p{}</a>"#, i, i))
        .collect();
    mount_page(&server, "/", &links).await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/p\d+$"))
        .respond_with(html(r#"<a href="/deep/1">deeper</a>"#))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/deep/"))
        .respond_with(html(""))
        .expect(0)
        .mount(&server)
        .await;

    let controller = CrawlController::new(create_test_config()).unwrap();
    controller.start_crawl(request(&server, 1)).await.unwrap();
    wait_for_completion(&controller).await;

    let status = controller.status();
    assert_eq!(status.urls_processed, 51);
    assert_eq!(status.current_depth, 1);
}

#[tokio::test]
async fn test_second_start_rejected_while_running() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("slow").set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let controller = CrawlController::new(create_test_config()).unwrap();
    controller.start_crawl(request(&server, 2)).await.unwrap();

    let second = controller.start_crawl(request(&server, 2)).await;
    assert!(matches!(second, Err(TrawlError::AlreadyRunning)));
    assert!(controller.status().is_running);

    controller.stop_crawl().await;
    assert!(!controller.status().is_running);
}

#[tokio::test]
async fn test_stop_interrupts_slow_fetches() {
    let server = MockServer::start().await;

    let links: String = (0..5)
        .map(|i| format!(r#"<a href="/slow{}">slow</a>"#, i))
        .collect();
    mount_page(&server, "/", &links).await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/slow\d$"))
        .respond_with(html("late").set_delay(Duration::from_secs(30)))
        .mount(&server)
        .await;

    let mut config = create_test_config();
    config.crawler.concurrency = 5;
    config.crawler.request_timeout_secs = 60;

    let controller = CrawlController::new(config).unwrap();
    controller.start_crawl(request(&server, 2)).await.unwrap();

    // Wait until every worker is stuck in a slow fetch
    let deadline = Instant::now() + Duration::from_secs(5);
    while controller.status().urls_processed < 6 {
        assert!(Instant::now() < deadline, "workers never picked up the slow pages");
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    let started = Instant::now();
    controller.stop_crawl().await;
    assert!(started.elapsed() < Duration::from_secs(3));

    let status = controller.status();
    assert!(!status.is_running);
    assert!(status.error.is_none());

    // Stopping again is a no-op
    controller.stop_crawl().await;
}

#[tokio::test]
async fn test_failed_page_still_counts() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/ok">ok</a><a href="/broken">broken</a>"#).await;
    mount_page(&server, "/ok", r#"<a href="/ok.pdf">pdf</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let controller = CrawlController::new(create_test_config()).unwrap();
    controller.start_crawl(request(&server, 2)).await.unwrap();
    wait_for_completion(&controller).await;

    let status = controller.status();
    assert_eq!(status.urls_processed, 3);
    assert_eq!(status.pdfs_found, 1);
    assert!(status.error.is_none());
}

#[tokio::test]
async fn test_new_session_starts_fresh() {
    let first = MockServer::start().await;
    mount_page(&first, "/", r#"<a href="/a.pdf">a</a><a href="/next">next</a>"#).await;
    mount_page(&first, "/next", "").await;

    let second = MockServer::start().await;
    mount_page(&second, "/", "no documents").await;

    let controller = CrawlController::new(create_test_config()).unwrap();

    controller.start_crawl(request(&first, 2)).await.unwrap();
    wait_for_completion(&controller).await;
    assert_eq!(controller.status().urls_processed, 2);
    assert_eq!(controller.results().len(), 1);

    controller.start_crawl(request(&second, 2)).await.unwrap();
    wait_for_completion(&controller).await;
    assert_eq!(controller.status().urls_processed, 1);
    assert_eq!(controller.status().pdfs_found, 0);
    assert!(controller.results().is_empty());
}

#[tokio::test]
async fn test_invalid_start_arguments() {
    let controller = CrawlController::new(create_test_config()).unwrap();

    for depth in [0, 11] {
        let result = controller
            .start_crawl(StartRequest {
                website_url: "example.com".to_string(),
                max_depth: depth,
                download_dir: None,
                auto_download: false,
            })
            .await;
        assert!(matches!(result, Err(TrawlError::InvalidArgument(_))));
    }

    let result = controller
        .start_crawl(StartRequest {
            website_url: "example.com".to_string(),
            max_depth: 2,
            download_dir: None,
            auto_download: true,
        })
        .await;
    assert!(matches!(result, Err(TrawlError::InvalidArgument(_))));

    let result = controller
        .start_crawl(StartRequest {
            website_url: "   ".to_string(),
            max_depth: 2,
            download_dir: None,
            auto_download: false,
        })
        .await;
    assert!(matches!(result, Err(TrawlError::InvalidUrl(_))));

    assert!(!controller.status().is_running);
    assert_eq!(controller.status().urls_processed, 0);
}

#[tokio::test]
async fn test_auto_download_during_crawl() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<a href="/a.pdf">a</a><a href="/download/b">b</a><a href="/download/c">c</a>"#,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/a.pdf"))
        .respond_with(pdf())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/download/b"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "application/pdf"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/download/b"))
        .respond_with(pdf())
        .mount(&server)
        .await;
    // Probe fails, so c stays unverified and its download must check the type
    Mock::given(method("HEAD"))
        .and(path("/download/c"))
        .respond_with(ResponseTemplate::new(405))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/download/c"))
        .respond_with(html("not a document"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let controller = CrawlController::new(create_test_config()).unwrap();
    controller
        .start_crawl(StartRequest {
            website_url: server.uri(),
            max_depth: 1,
            download_dir: Some(dir.path().to_path_buf()),
            auto_download: true,
        })
        .await
        .unwrap();
    wait_for_completion(&controller).await;

    let results = controller.results();
    assert_eq!(results.len(), 3);

    for name in ["a.pdf", "b.pdf"] {
        let record = results.iter().find(|r| r.filename == name).unwrap();
        assert_eq!(record.status, PdfStatus::Downloaded, "{}", name);
        assert_eq!(record.size, Some(PDF_BYTES.len() as u64));
        let local: &PathBuf = record.local_path.as_ref().unwrap();
        assert_eq!(std::fs::read(local).unwrap(), PDF_BYTES);
    }

    let rejected = results.iter().find(|r| r.url.ends_with("/download/c")).unwrap();
    assert_eq!(rejected.status, PdfStatus::DownloadFailed);
    assert!(rejected.error.as_deref().unwrap().contains("not a PDF"));
    assert!(!dir.path().join("c.pdf").exists());
}

#[tokio::test]
async fn test_unverified_without_probe() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/download/report">report</a>"#).await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config();
    config.crawler.probe_unverified = false;

    let controller = CrawlController::new(config).unwrap();
    controller.start_crawl(request(&server, 2)).await.unwrap();
    wait_for_completion(&controller).await;

    let results = controller.results();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].status, PdfStatus::Unverified);
    assert_eq!(results[0].filename, "report.pdf");
}

#[tokio::test]
async fn test_offsite_pages_not_followed() {
    let server = MockServer::start().await;
    let other = MockServer::start().await;

    // Both servers share the 127.0.0.1 host, so point at localhost instead
    let offsite = other.uri().replace("127.0.0.1", "localhost");
    mount_page(
        &server,
        "/",
        &format!(
            r#"<a href="{0}/elsewhere">away</a><a href="{0}/remote.pdf">remote pdf</a>"#,
            offsite
        ),
    )
    .await;
    Mock::given(method("GET"))
        .respond_with(html(""))
        .expect(0)
        .mount(&other)
        .await;

    let controller = CrawlController::new(create_test_config()).unwrap();
    controller.start_crawl(request(&server, 2)).await.unwrap();
    wait_for_completion(&controller).await;

    assert_eq!(controller.status().urls_processed, 1);
    // PDFs are recorded wherever they are hosted
    assert_eq!(controller.results().len(), 1);
}

#[tokio::test]
async fn test_redirect_to_claimed_page_not_parsed_twice() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/old">old</a><a href="/target">target</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("Location", "/target#section"),
        )
        .mount(&server)
        .await;
    mount_page(&server, "/target", r#"<a href="/download/doc">doc</a>"#).await;

    // A slow confirmation would overlap with a second parse of /target
    Mock::given(method("HEAD"))
        .and(path("/download/doc"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "application/pdf")
                .set_delay(Duration::from_millis(500)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let controller = CrawlController::new(create_test_config()).unwrap();
    controller.start_crawl(request(&server, 2)).await.unwrap();
    wait_for_completion(&controller).await;

    let status = controller.status();
    assert_eq!(status.urls_processed, 3);
    assert_eq!(status.urls_visited, 3);
    assert_eq!(status.pdfs_found, 1);

    let results = controller.results();
    assert_eq!(results[0].status, PdfStatus::Found);
    assert!(results[0].source_url.ends_with("/target"));
}

#[tokio::test]
async fn test_stop_waits_even_when_another_task_is_waiting() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html("").set_delay(Duration::from_secs(30)))
        .mount(&server)
        .await;

    let controller = CrawlController::new(create_test_config()).unwrap();
    controller.start_crawl(request(&server, 1)).await.unwrap();

    let waiter = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.wait().await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    tokio::time::timeout(Duration::from_secs(3), controller.stop_crawl())
        .await
        .expect("stop did not return in time");

    // stop_crawl only returns once the session has left Stopping
    let status = controller.status();
    assert!(!status.is_running);
    assert!(status.error.is_none());

    tokio::time::timeout(Duration::from_secs(1), waiter)
        .await
        .expect("waiter should be released")
        .unwrap();
}
