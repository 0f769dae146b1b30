use std::time::Duration;

use chainidx_queue::WorkQueue;
use tracing::{error, info, instrument, warn};

use crate::stop::StopSignal;

const TICK_INTERVAL: Duration = Duration::from_secs(10);

/// Every tick, scans `processing` for zombies (ranges whose lease has
/// expired) and returns them to `work`. Multiple Janitors are tolerated;
/// the underlying multi-op is atomic so recovery never double-fires.
pub struct Janitor {
    queue: WorkQueue,
    stop: StopSignal,
}

impl Janitor {
    pub fn new(queue: WorkQueue, stop: StopSignal) -> Self {
        Self { queue, stop }
    }

    #[instrument(skip(self))]
    pub async fn run(self) {
        info!("janitor starting");
        let mut ticker = tokio::time::interval(TICK_INTERVAL);
        loop {
            ticker.tick().await;
            if self.stop.is_stopping() {
                info!("stop signal observed, exiting janitor");
                return;
            }

            match self.queue.recover_zombies().await {
                Ok(0) => {}
                Ok(count) => warn!(count, "recovered zombie ranges"),
                Err(err) => error!(error = %err, "recover_zombies() failed"),
            }
        }
    }
}
