use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::session::handle::SessionHandle;

/// Background progress driver.
///
/// Owns the repeating timer that advances task progress.  The timer's
/// lifetime follows the queue, not any UI surface: the loop ticks while at
/// least one record is `Processing`, parks when none remain, and resumes
/// the moment a new record is enqueued.  Ticks are strictly sequential —
/// the loop is a single task, so two ticks can never overlap.
#[derive(Debug)]
pub struct ProgressDriver {
    shutdown_tx: watch::Sender<bool>,
    handle: tokio::task::JoinHandle<()>,
}

impl ProgressDriver {
    /// Spawn the tick loop for `session`, advancing progress every
    /// `tick_interval`.
    pub fn spawn(session: SessionHandle, tick_interval: Duration) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(run_loop(session, tick_interval, shutdown_rx));
        Self {
            shutdown_tx,
            handle,
        }
    }

    /// Signal shutdown and wait for the loop to exit.
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.handle.await;
        info!("progress driver stopped");
    }
}

async fn run_loop(
    session: SessionHandle,
    tick_interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        // Park until a record is processing or shutdown is requested.
        while session.processing_count().await == 0 {
            tokio::select! {
                _ = session.work_available() => {}
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        return;
                    }
                }
            }
        }

        debug!("progress driver ticking");
        let mut interval = tokio::time::interval(tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first interval tick fires immediately; consume it so the
        // first advance lands a full period after work arrives.
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if session.tick().await == 0 {
                        debug!("queue drained; progress driver parked");
                        break;
                    }
                }
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        return;
                    }
                }
            }
        }
    }
}
