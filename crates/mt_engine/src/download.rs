use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use mt_logging::{mt_debug, mt_warn};
use tokio::runtime::Handle;
use tokio_util::task::TaskTracker;

use crate::fetch::AssetFetcher;
use crate::FetchError;

/// An asset to download into `dest_dir/file_name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
    pub url: String,
    pub dest_dir: PathBuf,
    pub file_name: String,
}

impl AssetRequest {
    pub fn target(&self) -> PathBuf {
        self.dest_dir.join(&self.file_name)
    }
}

/// Receives download requests discovered while rewriting post text.
///
/// `schedule` must not block on the download itself.
pub trait AssetSink: Send + Sync {
    fn schedule(&self, request: AssetRequest);
}

#[derive(Debug, Default)]
struct Counters {
    scheduled: AtomicUsize,
    completed: AtomicUsize,
    failed: AtomicUsize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadStats {
    pub scheduled: usize,
    pub completed: usize,
    pub failed: usize,
}

/// Fire-and-forget download queue running on a tokio runtime.
///
/// Every scheduled download is tracked so the caller may wait for all of
/// them with [`DownloadQueue::drain`] before exiting.
pub struct DownloadQueue {
    fetcher: Arc<dyn AssetFetcher>,
    runtime: Handle,
    tracker: TaskTracker,
    counters: Arc<Counters>,
}

impl DownloadQueue {
    pub fn new(fetcher: Arc<dyn AssetFetcher>, runtime: Handle) -> Self {
        Self {
            fetcher,
            runtime,
            tracker: TaskTracker::new(),
            counters: Arc::new(Counters::default()),
        }
    }

    /// Number of downloads that have not finished yet.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    pub fn stats(&self) -> DownloadStats {
        DownloadStats {
            scheduled: self.counters.scheduled.load(Ordering::Relaxed),
            completed: self.counters.completed.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }

    /// Stop accepting downloads and wait for the in-flight ones.
    pub async fn drain(&self) -> DownloadStats {
        self.tracker.close();
        self.tracker.wait().await;
        self.stats()
    }
}

impl AssetSink for DownloadQueue {
    fn schedule(&self, request: AssetRequest) {
        if self.tracker.is_closed() {
            mt_warn!("Download queue closed; dropping {}", request.url);
            return;
        }
        mt_debug!("Scheduling download {} -> {:?}", request.url, request.target());
        self.counters.scheduled.fetch_add(1, Ordering::Relaxed);

        let fetcher = self.fetcher.clone();
        let counters = self.counters.clone();
        self.tracker.spawn_on(
            async move {
                match download(fetcher.as_ref(), &request).await {
                    Ok(bytes) => {
                        mt_debug!("Downloaded {} ({} bytes)", request.url, bytes);
                        counters.completed.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(err) => {
                        mt_warn!("Download of {} failed: {}", request.url, err);
                        counters.failed.fetch_add(1, Ordering::Relaxed);
                    }
                }
            },
            &self.runtime,
        );
    }
}

async fn download(fetcher: &dyn AssetFetcher, request: &AssetRequest) -> Result<u64, FetchError> {
    tokio::fs::create_dir_all(&request.dest_dir).await?;
    fetcher.fetch_to(&request.url, &request.target()).await
}
