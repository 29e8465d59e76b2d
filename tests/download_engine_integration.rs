//! Integration tests for the download engine.
//!
//! These tests drive `DownloadEngine` with a real `Downloader` against mock HTTP
//! servers and real input files.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use batchget::{DownloadEngine, Downloader, HttpClient, UrlSources, WaitStrategy};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Respond, ResponseTemplate};

/// Responder that records the peak number of requests being served at once.
///
/// Uses a blocking sleep so overlapping requests keep the counter elevated.
struct ConcurrencyTrackingResponder {
    current: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    delay_ms: u64,
}

impl ConcurrencyTrackingResponder {
    fn new(current: Arc<AtomicUsize>, peak: Arc<AtomicUsize>, delay_ms: u64) -> Self {
        Self {
            current,
            peak,
            delay_ms,
        }
    }
}

impl Respond for ConcurrencyTrackingResponder {
    fn respond(&self, _request: &wiremock::Request) -> ResponseTemplate {
        let current_count = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(current_count, Ordering::SeqCst);

        std::thread::sleep(Duration::from_millis(self.delay_ms));

        self.current.fetch_sub(1, Ordering::SeqCst);
        ResponseTemplate::new(200).set_body_bytes(b"content".to_vec())
    }
}

fn url_list(server: &MockServer, names: &[&str]) -> String {
    names
        .iter()
        .map(|name| format!("{}/{name}\n", server.uri()))
        .collect()
}

fn quiet_engine(concurrency: usize) -> DownloadEngine {
    DownloadEngine::new(concurrency, WaitStrategy::None).with_success_reports(false)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrency_cap_limits_in_flight_downloads() -> Result<(), Box<dyn std::error::Error>>
{
    let current = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ConcurrencyTrackingResponder::new(
            Arc::clone(&current),
            Arc::clone(&peak),
            100,
        ))
        .mount(&mock_server)
        .await;

    let names: Vec<String> = (0..10).map(|i| format!("file{i}.txt")).collect();
    let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let input = url_list(&mock_server, &name_refs);

    let output_dir = TempDir::new()?;
    let downloader = Downloader::new(HttpClient::new()?, output_dir.path());
    let stats = quiet_engine(3)
        .run(input.as_bytes(), Arc::new(downloader))
        .await;

    assert_eq!(stats.dispatched(), 10);
    assert_eq!(stats.completed(), 10);
    assert_eq!(stats.failed(), 0);

    let observed_peak = peak.load(Ordering::SeqCst);
    assert!(
        observed_peak <= 3,
        "peak concurrency {observed_peak} exceeded the cap of 3"
    );
    assert!(observed_peak >= 1);

    let saved = std::fs::read_dir(output_dir.path())?.count();
    assert_eq!(saved, 10);
    Ok(())
}

#[tokio::test]
async fn test_zero_concurrency_downloads_one_at_a_time() -> Result<(), Box<dyn std::error::Error>> {
    let current = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ConcurrencyTrackingResponder::new(
            Arc::clone(&current),
            Arc::clone(&peak),
            20,
        ))
        .mount(&mock_server)
        .await;

    let input = url_list(&mock_server, &["a.txt", "b.txt", "c.txt"]);
    let output_dir = TempDir::new()?;
    let downloader = Downloader::new(HttpClient::new()?, output_dir.path());

    let engine = quiet_engine(0);
    assert_eq!(engine.concurrency(), 1);
    let stats = engine.run(input.as_bytes(), Arc::new(downloader)).await;

    assert_eq!(stats.completed(), 3);
    assert_eq!(peak.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn test_input_files_dispatch_in_order() -> Result<(), Box<dyn std::error::Error>> {
    let mock_server = MockServer::start().await;
    for name in ["/x", "/y"] {
        Mock::given(method("GET"))
            .and(path(name))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(name.as_bytes().to_vec()))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let lists = TempDir::new()?;
    let a = lists.path().join("a.txt");
    let b = lists.path().join("b.txt");
    std::fs::write(&a, format!("{}/x\n", mock_server.uri()))?;
    std::fs::write(&b, format!("{}/y\n", mock_server.uri()))?;

    let output_dir = TempDir::new()?;
    let downloader = Downloader::new(HttpClient::new()?, output_dir.path());
    let input = UrlSources::new().with_files([a, b]).open().await;

    let stats = quiet_engine(1).run(input, Arc::new(downloader)).await;

    assert_eq!(stats.dispatched(), 2);
    assert_eq!(stats.completed(), 2);

    let requests = mock_server
        .received_requests()
        .await
        .ok_or("request recording disabled")?;
    let paths: Vec<&str> = requests.iter().map(|r| r.url.path()).collect();
    assert_eq!(paths, vec!["/x", "/y"]);
    Ok(())
}

#[tokio::test]
async fn test_failed_urls_do_not_stop_the_run() -> Result<(), Box<dyn std::error::Error>> {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/good.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"good".to_vec()))
        .mount(&mock_server)
        .await;

    let input = format!(
        "ftp://example.com/nope\n\n   \n{}/good.txt\nnot a url\n",
        mock_server.uri()
    );
    let output_dir = TempDir::new()?;
    let downloader = Downloader::new(HttpClient::new()?, output_dir.path());

    let stats = quiet_engine(2)
        .run(input.as_bytes(), Arc::new(downloader))
        .await;

    assert_eq!(stats.dispatched(), 3);
    assert_eq!(stats.completed(), 1);
    assert_eq!(stats.failed(), 2);
    assert_eq!(std::fs::read(output_dir.path().join("good.txt"))?, b"good");
    Ok(())
}

#[tokio::test]
async fn test_duplicate_urls_under_concurrency_get_unique_names()
-> Result<(), Box<dyn std::error::Error>> {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/same.bin"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"payload".to_vec())
                .set_delay(Duration::from_millis(30)),
        )
        .mount(&mock_server)
        .await;

    let input = url_list(&mock_server, &["same.bin"; 6]);
    let output_dir = TempDir::new()?;
    let downloader = Downloader::new(HttpClient::new()?, output_dir.path());

    let stats = quiet_engine(6)
        .run(input.as_bytes(), Arc::new(downloader))
        .await;

    assert_eq!(stats.completed(), 6);
    let mut names: Vec<String> = std::fs::read_dir(output_dir.path())?
        .filter_map(Result::ok)
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "same-1.bin",
            "same-2.bin",
            "same-3.bin",
            "same-4.bin",
            "same-5.bin",
            "same.bin"
        ]
    );
    Ok(())
}
