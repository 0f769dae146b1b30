use std::time::Duration;

use chainidx_queue::WorkQueue;
use chainidx_rpc::RpcClient;
use tracing::{error, info, instrument};

use crate::stop::StopSignal;

const TICK_INTERVAL: Duration = Duration::from_secs(10);

/// Every tick, queries the chain tip and seeds new ranges up to it.
/// Multiple Seeders are tolerated — `seed` is idempotent via the
/// `last_queued` watermark — but only one should normally run.
pub struct Seeder {
    queue: WorkQueue,
    rpc: RpcClient,
    stop: StopSignal,
}

impl Seeder {
    pub fn new(queue: WorkQueue, rpc: RpcClient, stop: StopSignal) -> Self {
        Self { queue, rpc, stop }
    }

    #[instrument(skip(self))]
    pub async fn run(self) {
        info!("seeder starting");
        let mut ticker = tokio::time::interval(TICK_INTERVAL);
        loop {
            ticker.tick().await;
            if self.stop.is_stopping() {
                info!("stop signal observed, exiting seeder");
                return;
            }

            match self.rpc.block_number().await {
                Ok(tip) => {
                    if let Err(err) = self.queue.seed(tip).await {
                        error!(error = %err, "seed() failed");
                    }
                }
                Err(err) => error!(error = %err, "failed to query chain tip"),
            }
        }
    }
}
