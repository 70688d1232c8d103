//! Periodic eviction of expired store entries.

use super::SessionStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Background task calling [`SessionStore::sweep`] on a fixed interval.
///
/// The task stops on [`Sweeper::shutdown`] or when the handle is dropped.
pub struct Sweeper {
    stop: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Sweeper {
    /// Spawn the sweep loop. Must be called inside a Tokio runtime.
    pub fn start(store: Arc<SessionStore>, every: Duration) -> Self {
        let every = every.max(Duration::from_millis(1));
        let (stop_tx, mut stop_rx) = oneshot::channel();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        let stats = store.sweep();
                        if stats.sessions + stats.transcripts > 0 {
                            info!(
                                "Evicted {} expired sessions and {} expired transcripts",
                                stats.sessions, stats.transcripts
                            );
                        }
                    }
                }
            }
            debug!("Sweeper stopped");
        });

        Self {
            stop: Some(stop_tx),
            handle: Some(handle),
        }
    }

    /// Stop the loop and wait for it to finish.
    pub async fn shutdown(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
