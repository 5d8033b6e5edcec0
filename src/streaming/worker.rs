//! Background generation worker with versioned requests

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::core::error::Error;
use crate::core::types::Result;
use crate::generation::{ChunkGenerator, GenerationRequest, GenerationResponse};

/// Runs generation passes off the caller's thread.
///
/// Every submitted request gets a version. Requests still queued when a newer
/// one arrives are skipped, and responses older than the newest submitted
/// version are discarded on both sides of the channel.
pub struct GenerationWorker {
    /// Channel for sending requests to the worker loop
    request_tx: mpsc::UnboundedSender<GenerationRequest>,
    /// Channel for receiving finished passes
    result_rx: mpsc::UnboundedReceiver<GenerationResponse>,
    /// Newest submitted version, shared with the worker loop
    latest: Arc<AtomicU64>,
    /// Version of the last response handed to the caller
    delivered: u64,
    runtime: Option<Runtime>,
}

impl GenerationWorker {
    /// Start a worker on a dedicated runtime with `threads` worker threads
    pub fn new(threads: usize) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(threads.max(1))
            .thread_name("voxterra-gen")
            .enable_time()
            .build()?;

        let (request_tx, request_rx) = mpsc::unbounded_channel::<GenerationRequest>();
        let (result_tx, result_rx) = mpsc::unbounded_channel::<GenerationResponse>();
        let latest = Arc::new(AtomicU64::new(0));

        let loop_latest = Arc::clone(&latest);
        runtime.spawn(async move {
            Self::worker_loop(request_rx, result_tx, loop_latest).await;
        });

        Ok(Self {
            request_tx,
            result_rx,
            latest,
            delivered: 0,
            runtime: Some(runtime),
        })
    }

    /// Worker loop: one pass at a time, only the newest queued request survives
    async fn worker_loop(
        mut request_rx: mpsc::UnboundedReceiver<GenerationRequest>,
        result_tx: mpsc::UnboundedSender<GenerationResponse>,
        latest: Arc<AtomicU64>,
    ) {
        let mut active: JoinSet<GenerationResponse> = JoinSet::new();
        let mut queued: Option<GenerationRequest> = None;

        loop {
            tokio::select! {
                Some(request) = request_rx.recv() => {
                    if let Some(old) = queued.replace(request) {
                        log::debug!("Generation v{} superseded before start", old.version);
                    }
                }

                Some(joined) = active.join_next(), if !active.is_empty() => {
                    match joined {
                        Ok(response) => {
                            if response.version < latest.load(Ordering::Acquire) {
                                log::debug!("Discarding stale generation v{}", response.version);
                            } else if result_tx.send(response).is_err() {
                                break;
                            }
                        }
                        Err(e) => log::error!("Generation task failed: {}", e),
                    }
                }

                else => break,
            }

            if active.is_empty() {
                if let Some(request) = queued.take() {
                    if request.version < latest.load(Ordering::Acquire) {
                        log::debug!("Skipping stale generation v{}", request.version);
                    } else {
                        active.spawn_blocking(move || ChunkGenerator::generate(&request));
                    }
                }
            }
        }
    }

    /// Queue a request, returning the version assigned to it
    pub fn submit(&mut self, mut request: GenerationRequest) -> Result<u64> {
        let version = self.latest.load(Ordering::Acquire) + 1;
        request.version = version;
        self.latest.store(version, Ordering::Release);

        self.request_tx
            .send(request)
            .map_err(|_| Error::Generation("generation worker stopped".into()))?;
        Ok(version)
    }

    /// Newest response for the newest request, if one has arrived (non-blocking)
    pub fn poll(&mut self) -> Option<GenerationResponse> {
        let mut newest = None;
        while let Ok(response) = self.result_rx.try_recv() {
            if let Some(current) = self.accept(response) {
                newest = Some(current);
            }
        }
        newest
    }

    /// Block until the response for the newest request arrives or `timeout` elapses
    pub fn wait(&mut self, timeout: Duration) -> Option<GenerationResponse> {
        let deadline = Instant::now() + timeout;
        let runtime = self.runtime.as_ref()?;
        let rx = &mut self.result_rx;

        loop {
            let remaining = deadline.checked_duration_since(Instant::now())?;
            let response = runtime
                .block_on(async { tokio::time::timeout(remaining, rx.recv()).await })
                .ok()
                .flatten()?;

            let latest = self.latest.load(Ordering::Acquire);
            if response.version >= latest {
                self.delivered = response.version;
                return Some(response);
            }
            log::debug!("Discarding stale generation v{}", response.version);
        }
    }

    fn accept(&mut self, response: GenerationResponse) -> Option<GenerationResponse> {
        if response.version < self.latest_version() {
            log::debug!("Discarding stale generation v{}", response.version);
            return None;
        }
        self.delivered = response.version;
        Some(response)
    }

    /// Newest version submitted so far (0 before the first submit)
    pub fn latest_version(&self) -> u64 {
        self.latest.load(Ordering::Acquire)
    }

    /// A submitted request has not been answered yet
    pub fn is_pending(&self) -> bool {
        self.delivered < self.latest_version()
    }
}

impl Drop for GenerationWorker {
    fn drop(&mut self) {
        // Do not block the caller on a pass that is still running
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}
