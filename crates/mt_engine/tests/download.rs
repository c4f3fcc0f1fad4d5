use std::sync::Arc;

use mt_engine::{
    AssetFetcher, AssetRequest, AssetSink, DownloadQueue, DownloadStats, FailureKind,
    FetchSettings, ReqwestAssetFetcher,
};
use tempfile::TempDir;
use tokio::runtime::Handle;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn queue() -> DownloadQueue {
    let fetcher = Arc::new(ReqwestAssetFetcher::new(FetchSettings::default()));
    DownloadQueue::new(fetcher, Handle::current())
}

#[tokio::test(flavor = "multi_thread")]
async fn scheduled_download_lands_in_nested_dir() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/img/2010/a.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"\x89PNG-bytes".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let dest_dir = temp.path().join("assets").join("img").join("2010");
    let queue = queue();
    queue.schedule(AssetRequest {
        url: format!("{}/img/2010/a.png", server.uri()),
        dest_dir: dest_dir.clone(),
        file_name: "a.png".to_string(),
    });

    let stats = queue.drain().await;
    assert_eq!(
        stats,
        DownloadStats {
            scheduled: 1,
            completed: 1,
            failed: 0
        }
    );
    assert_eq!(std::fs::read(dest_dir.join("a.png")).unwrap(), b"\x89PNG-bytes");
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_download_is_counted_and_leaves_no_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing.gif"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let queue = queue();
    queue.schedule(AssetRequest {
        url: format!("{}/missing.gif", server.uri()),
        dest_dir: temp.path().to_path_buf(),
        file_name: "missing.gif".to_string(),
    });

    let stats = queue.drain().await;
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.completed, 0);
    assert!(!temp.path().join("missing.gif").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn requests_after_drain_are_dropped() {
    let temp = TempDir::new().unwrap();
    let queue = queue();
    queue.drain().await;
    queue.schedule(AssetRequest {
        url: "http://127.0.0.1:9/never.png".to_string(),
        dest_dir: temp.path().to_path_buf(),
        file_name: "never.png".to_string(),
    });
    assert_eq!(queue.stats().scheduled, 0);
    assert_eq!(queue.in_flight(), 0);
}

#[tokio::test]
async fn fetcher_rejects_too_large_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/large.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_string("01234567890"))
        .mount(&server)
        .await;

    let settings = FetchSettings {
        max_bytes: 10,
        ..FetchSettings::default()
    };
    let fetcher = ReqwestAssetFetcher::new(settings);
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("large.jpg");

    let err = fetcher
        .fetch_to(&format!("{}/large.jpg", server.uri()), &target)
        .await
        .unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::TooLarge {
            max_bytes: 10,
            actual: Some(11)
        }
    );
    assert!(!target.exists());
}

#[tokio::test]
async fn fetcher_rejects_relative_url() {
    let fetcher = ReqwestAssetFetcher::new(FetchSettings::default());
    let temp = TempDir::new().unwrap();
    let err = fetcher
        .fetch_to("/img/a.png", &temp.path().join("a.png"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}
