//! Periodic expiry sweep.
//!
//! Stores never schedule their own cleanup. The owning process starts an
//! [`ExpirySweeper`] which, on a fixed cadence, captures the current time once
//! and asks the store to drop everything that expired at or before it.
//! A failed sweep is logged and the next tick tries again; there is no retry
//! within a tick.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::errors::SessionStoreError;
use super::store::SessionStore;

/// Shortest interval the sweeper will tick at.
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

/// Configuration for the expiry sweeper.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Interval between sweeps (default: 60s). Zero is raised to [`MIN_SWEEP_INTERVAL`].
    pub interval: Duration,

    /// Run one sweep as soon as the task starts instead of waiting a full interval
    pub sweep_on_start: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self { interval: Duration::from_secs(60), sweep_on_start: true }
    }
}

/// Run a single sweep with `now` captured once, up front.
pub async fn sweep_once<P, S>(store: &S) -> Result<u64, SessionStoreError>
where
    P: Send + Sync,
    S: SessionStore<P> + ?Sized,
{
    let now = Utc::now();
    store.remove_expired(now).await
}

/// A handle to the running sweeper task.
///
/// When this handle is dropped, the sweeper task will be stopped.
#[derive(Debug)]
pub struct ExpirySweeper {
    shutdown_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl ExpirySweeper {
    /// Spawn the sweeper on the current tokio runtime.
    pub fn start<P>(store: Arc<dyn SessionStore<P>>, mut config: SweepConfig) -> Self
    where
        P: Send + Sync + 'static,
    {
        if config.interval < MIN_SWEEP_INTERVAL {
            warn!(interval_ms = config.interval.as_millis() as u64, "sweep interval too short, using minimum");
            config.interval = MIN_SWEEP_INTERVAL;
        }
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        info!(interval_ms = config.interval.as_millis() as u64, "session expiry sweeper started");
        let task = tokio::spawn(sweeper_loop(store, config, shutdown_rx));
        Self { shutdown_tx, task: Some(task) }
    }

    /// Signal the task to stop. Called automatically on drop.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Signal the task to stop and wait until an in-flight sweep has finished.
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "session expiry sweeper task ended abnormally");
            }
        }
        info!("session expiry sweeper stopped");
    }
}

impl Drop for ExpirySweeper {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn sweeper_loop<P>(
    store: Arc<dyn SessionStore<P>>,
    config: SweepConfig,
    mut shutdown_rx: watch::Receiver<bool>,
) where
    P: Send + Sync + 'static,
{
    let mut ticker = tokio::time::interval(config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    if !config.sweep_on_start {
        // the first tick completes immediately
        ticker.tick().await;
    }

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            result = shutdown_rx.changed() => {
                if result.is_err() || *shutdown_rx.borrow() {
                    debug!("session expiry sweeper received shutdown signal");
                    return;
                }
                continue;
            }
        }

        match sweep_once::<P, _>(store.as_ref()).await {
            Ok(0) => debug!("no expired sessions"),
            Ok(removed) => info!(removed, "expired sessions removed"),
            Err(e) => warn!(error = %e, code = e.code(), "session expiry sweep failed"),
        }
    }
}
