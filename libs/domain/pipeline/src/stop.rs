use tokio::sync::watch;
use tracing::info;

/// A process-wide stop flag checked between loop iterations by the worker,
/// Seeder and Janitor. Cloning shares the same underlying signal.
#[derive(Clone)]
pub struct StopSignal {
    receiver: watch::Receiver<bool>,
}

impl StopSignal {
    pub fn is_stopping(&self) -> bool {
        *self.receiver.borrow()
    }

    pub async fn changed(&mut self) {
        let _ = self.receiver.changed().await;
    }
}

/// Spawns the signal listener and returns a [`StopSignal`] handle. On
/// SIGINT or SIGTERM the flag flips once and stays flipped; callers should
/// treat the transition as terminal, not a toggle.
pub fn install() -> StopSignal {
    let (sender, receiver) = watch::channel(false);

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            let mut terminate = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
            tokio::select! {
                _ = ctrl_c => info!("received SIGINT, shutting down"),
                _ = terminate.recv() => info!("received SIGTERM, shutting down"),
            }
        }
        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
            info!("received ctrl-c, shutting down");
        }

        let _ = sender.send(true);
    });

    StopSignal { receiver }
}
