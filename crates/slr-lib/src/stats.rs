//! Usage statistics aggregation
//!
//! Request paths never touch the counters directly. Each request holds a
//! [`RequestTracker`] that hands its delta to a single consumer task when it
//! is dropped; the consumer is the only writer of [`UsageStats`], and readers
//! take a copy under a short read lock.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, RwLock};
use tracing::{debug, warn};

/// All-time request counters for the process
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStats {
    pub total_requests: u64,
    pub succeeded_requests: u64,
    pub total_instances: u64,
}

impl UsageStats {
    fn apply(&mut self, stat: RequestStat) {
        self.total_requests += 1;
        if stat.succeeded {
            self.succeeded_requests += 1;
        }
        self.total_instances += stat.instances;
    }
}

/// Contribution of one finished request
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RequestStat {
    pub succeeded: bool,
    pub instances: u64,
}

enum StatsEvent {
    Completed(RequestStat),
    Flush(oneshot::Sender<()>),
}

/// Owner of the consumer task
pub struct StatsAggregator;

impl StatsAggregator {
    /// Spawn the consumer task and return a handle for producers
    ///
    /// The task exits once every [`StatsRecorder`] clone has been dropped.
    pub fn spawn() -> StatsRecorder {
        let (sender, receiver) = mpsc::unbounded_channel();
        let stats = Arc::new(RwLock::new(UsageStats::default()));

        tokio::spawn(Self::run(receiver, stats.clone()));

        StatsRecorder { sender, stats }
    }

    async fn run(
        mut receiver: mpsc::UnboundedReceiver<StatsEvent>,
        stats: Arc<RwLock<UsageStats>>,
    ) {
        while let Some(event) = receiver.recv().await {
            match event {
                StatsEvent::Completed(stat) => stats.write().await.apply(stat),
                StatsEvent::Flush(done) => {
                    let _ = done.send(());
                }
            }
        }
        debug!("Stats aggregator stopped");
    }
}

/// Producer handle for the stats aggregator
#[derive(Clone)]
pub struct StatsRecorder {
    sender: mpsc::UnboundedSender<StatsEvent>,
    stats: Arc<RwLock<UsageStats>>,
}

impl StatsRecorder {
    /// Hand a finished request's delta to the aggregator without waiting
    pub fn record(&self, stat: RequestStat) {
        if self.sender.send(StatsEvent::Completed(stat)).is_err() {
            warn!(
                succeeded = stat.succeeded,
                instances = stat.instances,
                "Stats aggregator is gone, dropping request stat"
            );
        }
    }

    /// Start tracking a request; its stat is recorded when the tracker drops
    pub fn track(&self) -> RequestTracker {
        RequestTracker {
            recorder: self.clone(),
            stat: RequestStat::default(),
        }
    }

    /// Copy of the counters as applied so far
    pub async fn snapshot(&self) -> UsageStats {
        *self.stats.read().await
    }

    /// Wait until every delta sent before this call has been applied
    pub async fn flush(&self) {
        let (done, applied) = oneshot::channel();
        if self.sender.send(StatsEvent::Flush(done)).is_ok() {
            let _ = applied.await;
        }
    }

    pub fn is_running(&self) -> bool {
        !self.sender.is_closed()
    }
}

/// Per-request stat guard
///
/// Defaults to a failed request with zero instances, so early returns are
/// counted without any extra bookkeeping.
pub struct RequestTracker {
    recorder: StatsRecorder,
    stat: RequestStat,
}

impl RequestTracker {
    pub fn add_instances(&mut self, count: usize) {
        self.stat.instances += count as u64;
    }

    pub fn succeed(&mut self) {
        self.stat.succeeded = true;
    }
}

impl Drop for RequestTracker {
    fn drop(&mut self) {
        self.recorder.record(self.stat);
    }
}
