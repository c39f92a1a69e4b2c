//! Background topology refresh
//!
//! One task per [`Master`](crate::master::Master). Every tick it fetches
//! `/dir/status`, flattens it and swaps the result into the cache. A failed
//! tick keeps the previous snapshot.
//!
//! Shutdown is a rendezvous: `stop` hands the task a reply channel, the task
//! leaves its loop and answers on it. The task never interrupts an in-flight
//! status call, so stopping can take as long as the HTTP client timeout when
//! the master is slow.

use crate::common::Result;
use crate::master::directory::DirectoryClient;
use crate::master::topology::TopologyCache;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

type StopSignal = oneshot::Sender<()>;

/// Handle to a running refresh task
#[derive(Debug)]
pub struct RefreshHandle {
    stop_tx: Option<oneshot::Sender<StopSignal>>,
    task: JoinHandle<()>,
}

impl RefreshHandle {
    /// Start refreshing `cache` from `directory` every `period`.
    ///
    /// The first refresh happens one period after the call.
    pub fn spawn(directory: DirectoryClient, cache: Arc<TopologyCache>, period: Duration) -> Self {
        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(run(directory, cache, period, stop_rx));
        Self {
            stop_tx: Some(stop_tx),
            task,
        }
    }

    /// Ask the task to exit and wait until it has.
    pub async fn stop(mut self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if let Some(stop_tx) = self.stop_tx.take() {
            if stop_tx.send(ack_tx).is_ok() && ack_rx.await.is_err() {
                tracing::warn!("Topology refresh exited without acknowledging stop");
            }
        }
        if let Err(e) = (&mut self.task).await {
            tracing::error!("Topology refresh task failed: {}", e);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

async fn run(
    directory: DirectoryClient,
    cache: Arc<TopologyCache>,
    period: Duration,
    mut stop_rx: oneshot::Receiver<StopSignal>,
) {
    tracing::info!(
        "Topology refresh started for {} (every {:?})",
        directory.addr(),
        period
    );

    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let ack = loop {
        tokio::select! {
            biased;
            signal = &mut stop_rx => {
                // A dropped sender means the owning Master is gone.
                break signal.ok();
            }
            _ = ticker.tick() => {}
        }

        if let Err(e) = refresh_once(&directory, &cache).await {
            tracing::warn!("Topology refresh from {} failed: {}", directory.addr(), e);
        }
    };

    tracing::info!("Topology refresh stopped for {}", directory.addr());
    if let Some(ack) = ack {
        let _ = ack.send(());
    }
}

/// Run one refresh cycle. On error the cache is left untouched.
pub async fn refresh_once(directory: &DirectoryClient, cache: &TopologyCache) -> Result<()> {
    let status = directory.status().await?;
    let nodes = status.datacenter_map();
    tracing::debug!(
        "Topology refreshed: {} nodes in {} datacenters (master {})",
        nodes.len(),
        status.topology.data_centers.len(),
        status.version
    );
    cache.replace(nodes);
    Ok(())
}
