use std::sync::Arc;
use std::time::Duration;

use chainidx_models::{BlockBundle, BlockRange};
use chainidx_queue::WorkQueue;
use chainidx_rpc::Fetcher;
use chainidx_store::BlockRepository;
use chainidx_coordination::CoordinationStore;
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{error, info, instrument, warn};

use crate::errors::PipelineError;
use crate::stop::StopSignal;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);
const FAIL_BACKOFF: Duration = Duration::from_secs(2);

/// One worker's IDLE → LEASED → ACK/FAIL loop. Owns its dedicated blocking
/// queue connection via [`WorkQueue`] and fans out per-height fetches
/// under a bounded concurrency limit before persisting the whole range in
/// a single store transaction.
pub struct WorkerLoop {
    id: u32,
    queue: WorkQueue,
    coordination: CoordinationStore,
    fetcher: Arc<Fetcher>,
    repository: Arc<BlockRepository>,
    max_concurrent_fetches: usize,
    lease_ttl: Duration,
    stop: StopSignal,
}

impl WorkerLoop {
    pub fn new(
        id: u32,
        queue: WorkQueue,
        coordination: CoordinationStore,
        fetcher: Arc<Fetcher>,
        repository: Arc<BlockRepository>,
        max_concurrent_fetches: usize,
        lease_ttl: Duration,
        stop: StopSignal,
    ) -> Self {
        Self { id, queue, coordination, fetcher, repository, max_concurrent_fetches, lease_ttl, stop }
    }

    #[instrument(skip(self), fields(worker_id = self.id))]
    pub async fn run(mut self) {
        info!(worker_id = self.id, "worker loop starting");
        loop {
            if self.stop.is_stopping() {
                info!(worker_id = self.id, "stop signal observed, exiting worker loop");
                return;
            }

            let range = match self.queue.next().await {
                Ok(range) => range,
                Err(err) => {
                    error!(worker_id = self.id, error = %err, "next() failed, retrying after backoff");
                    tokio::time::sleep(FAIL_BACKOFF).await;
                    continue;
                }
            };

            self.process_range(range).await;
        }
    }

    async fn process_range(&mut self, range: BlockRange) {
        info!(worker_id = self.id, range = %range, "leased range");
        let heartbeat = self.spawn_heartbeat(range);

        let outcome = self.fetch_and_persist(range).await;
        heartbeat.abort();

        match outcome {
            Ok(()) => {
                if let Err(err) = self.queue.complete(range).await {
                    error!(worker_id = self.id, range = %range, error = %err, "complete() failed");
                }
                info!(worker_id = self.id, range = %range, "range acknowledged");
            }
            Err(err) => {
                warn!(worker_id = self.id, range = %range, error = %err, "range failed, requeueing");
                if let Err(fail_err) = self.queue.fail(range).await {
                    error!(worker_id = self.id, range = %range, error = %fail_err, "fail() itself failed");
                }
                tokio::time::sleep(FAIL_BACKOFF).await;
            }
        }
    }

    async fn fetch_and_persist(&self, range: BlockRange) -> Result<(), PipelineError> {
        let fetcher = self.fetcher.clone();
        let bundles: Vec<BlockBundle> = stream::iter(range.heights())
            .map(|height| {
                let fetcher = fetcher.clone();
                async move { fetcher.fetch(height).await }
            })
            .buffer_unordered(self.max_concurrent_fetches)
            .try_collect()
            .await?;

        let (blocks, transactions, logs) = BlockBundle::flatten(bundles);
        self.repository.save(&blocks, &transactions, &logs).await?;
        Ok(())
    }

    fn spawn_heartbeat(&self, range: BlockRange) -> tokio::task::JoinHandle<()> {
        let store = self.coordination.clone();
        let lease_ttl_seconds = self.lease_ttl.as_secs();
        let worker_id = self.id;
        let lease_key = chainidx_queue::keys::lease_key(&range);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(HEARTBEAT_INTERVAL);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match store.refresh_ttl(&lease_key, lease_ttl_seconds).await {
                    Ok(true) => {}
                    Ok(false) => warn!(worker_id, %lease_key, "heartbeat found lease already expired"),
                    Err(err) => error!(worker_id, %lease_key, error = %err, "heartbeat refresh failed"),
                }
            }
        })
    }
}
