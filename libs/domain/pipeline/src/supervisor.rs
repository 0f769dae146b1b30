use std::sync::Arc;
use std::time::Duration;

use chainidx_coordination::{BlockingConnection, CoordinationStore};
use chainidx_queue::WorkQueue;
use chainidx_ratelimit::RateLimiter;
use chainidx_rpc::{Fetcher, RpcClient};
use chainidx_store::{BlockRepository, StoreClient};
use tracing::info;

use crate::config::Config;
use crate::errors::PipelineError;
use crate::janitor::Janitor;
use crate::seeder::Seeder;
use crate::stop;
use crate::worker::WorkerLoop;

const RATE_LIMIT_KEY: &str = "ratelimit:global";
const RPC_TIMEOUT: Duration = Duration::from_secs(20);

/// Assembles every long-lived component from [`Config`] and runs them to
/// completion. Returns once every worker, the Seeder and the Janitor have
/// exited following a shutdown signal.
pub struct Supervisor;

impl Supervisor {
    pub async fn run(config: Config) -> Result<(), PipelineError> {
        let stop = stop::install();

        let coordination = CoordinationStore::connect(&config.coordination_url).await?;
        let store = StoreClient::connect(&config.database_url, config.store_pool_size).await?;
        let repository = Arc::new(BlockRepository::new(store));

        let limiter = Arc::new(RateLimiter::new(
            coordination.clone(),
            RATE_LIMIT_KEY,
            config.rpc_calls_per_sec,
            Duration::from_secs(1),
        ));
        let rpc_client = RpcClient::new(config.rpc_url.clone(), RPC_TIMEOUT);
        let fetcher = Arc::new(Fetcher::new(rpc_client, limiter, config.max_retries));

        let mut handles = Vec::new();

        for worker_id in 0..config.worker_count {
            let blocking = BlockingConnection::connect(coordination.client()).await?;
            let queue = WorkQueue::new(
                coordination.clone(),
                blocking,
                config.batch_size,
                config.min_block,
                config.lease_ttl.as_secs(),
            );
            let worker = WorkerLoop::new(
                worker_id,
                queue,
                coordination.clone(),
                fetcher.clone(),
                repository.clone(),
                config.max_blocks_concurrent,
                config.lease_ttl,
                stop.clone(),
            );
            handles.push(tokio::spawn(worker.run()));
        }

        let seeder_blocking = BlockingConnection::connect(coordination.client()).await?;
        let seeder_queue = WorkQueue::new(
            coordination.clone(),
            seeder_blocking,
            config.batch_size,
            config.min_block,
            config.lease_ttl.as_secs(),
        );
        let seeder_rpc = RpcClient::new(config.rpc_url.clone(), RPC_TIMEOUT);
        handles.push(tokio::spawn(Seeder::new(seeder_queue, seeder_rpc, stop.clone()).run()));

        let janitor_blocking = BlockingConnection::connect(coordination.client()).await?;
        let janitor_queue = WorkQueue::new(
            coordination.clone(),
            janitor_blocking,
            config.batch_size,
            config.min_block,
            config.lease_ttl.as_secs(),
        );
        handles.push(tokio::spawn(Janitor::new(janitor_queue, stop.clone()).run()));

        info!(workers = config.worker_count, "supervisor online");

        for handle in handles {
            let _ = handle.await;
        }

        info!("supervisor shut down cleanly");
        Ok(())
    }
}
