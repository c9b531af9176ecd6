// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Monitor Scheduler
//!
//! Timer loop that drives `check_case` for every active case whose
//! `next_check_at` has passed. Due cases are checked concurrently; per-case
//! serialization is enforced by the monitor itself. A failed check is
//! logged and naturally retried at the next scheduled interval.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::application::clock::Clock;
use crate::application::monitor::CaseMonitor;

pub struct MonitorScheduler {
    monitor: Arc<CaseMonitor>,
    clock: Arc<dyn Clock>,
    poll_interval: Duration,
}

impl MonitorScheduler {
    pub fn new(monitor: Arc<CaseMonitor>, clock: Arc<dyn Clock>, poll_interval: Duration) -> Self {
        Self {
            monitor,
            clock,
            poll_interval,
        }
    }

    pub async fn run(self, shutdown: CancellationToken) {
        info!(poll_interval = ?self.poll_interval, "monitor scheduler started");
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("monitor scheduler stopped");
                    return;
                }
                _ = ticker.tick() => {
                    self.sweep().await;
                }
            }
        }
    }

    /// One pass over the active set.
    pub async fn sweep(&self) {
        let due = self.monitor.due_cases(self.clock.now());
        if due.is_empty() {
            return;
        }
        debug!(due = due.len(), "running scheduled case checks");

        let mut handles = Vec::with_capacity(due.len());
        for case_id in due {
            let monitor = Arc::clone(&self.monitor);
            handles.push(tokio::spawn(async move {
                match monitor.check_case(case_id).await {
                    Ok(status) => {
                        debug!(case_id = %case_id, tier = %status.risk_tier, "scheduled check complete");
                    }
                    Err(e) => {
                        // Retried at the next scheduled interval.
                        warn!(case_id = %case_id, error = %e, "scheduled check failed");
                    }
                }
            }));
        }
        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "check task panicked");
            }
        }
    }
}
