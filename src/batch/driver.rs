//! Batch-at-a-time execution with a barrier and pacing pause between batches.

use futures::future::join_all;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::outcome::{AttemptResult, RunOutcome};
use super::plan::{BatchPlan, WorkItem};
use crate::config::StressConfig;
use crate::error::{HarnessError, HarnessResult};
use crate::logging::log_batch_operation;

/// Validated parameters of a batched run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSettings {
    plan: BatchPlan,
    inter_batch_delay: Duration,
    per_item_timeout: Duration,
}

impl BatchSettings {
    pub fn new(
        total_count: usize,
        batch_size: usize,
        inter_batch_delay: Duration,
        per_item_timeout: Duration,
    ) -> HarnessResult<Self> {
        if total_count == 0 {
            return Err(HarnessError::config_error(
                "total_count must be greater than zero",
            ));
        }
        if batch_size == 0 {
            return Err(HarnessError::config_error(
                "batch_size must be greater than zero",
            ));
        }
        if per_item_timeout.is_zero() {
            return Err(HarnessError::config_error(
                "per_item_timeout must be greater than zero",
            ));
        }

        let plan = BatchPlan::new(total_count, batch_size).ok_or_else(|| {
            HarnessError::config_error("total_count and batch_size must be positive")
        })?;

        Ok(Self {
            plan,
            inter_batch_delay,
            per_item_timeout,
        })
    }

    pub fn from_stress_config(config: &StressConfig) -> HarnessResult<Self> {
        Self::new(
            config.total_posts,
            config.batch_size,
            config.inter_batch_delay(),
            config.per_item_timeout(),
        )
    }

    pub fn plan(&self) -> BatchPlan {
        self.plan
    }

    pub fn inter_batch_delay(&self) -> Duration {
        self.inter_batch_delay
    }

    pub fn per_item_timeout(&self) -> Duration {
        self.per_item_timeout
    }
}

/// Lifecycle of a driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    NotStarted,
    Running { batch_index: usize },
    Completed,
}

/// Runs `total_count` work items in sequential batches of concurrent items
///
/// Items of one batch are joined on the calling task rather than spawned, so a
/// batch is concurrent but never parallel. A failing item is counted and
/// otherwise ignored; the run always reaches [`DriverState::Completed`].
#[derive(Debug)]
pub struct BatchRequestDriver {
    settings: BatchSettings,
    state: DriverState,
}

impl BatchRequestDriver {
    pub fn new(settings: BatchSettings) -> Self {
        Self {
            settings,
            state: DriverState::NotStarted,
        }
    }

    pub fn settings(&self) -> &BatchSettings {
        &self.settings
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Execute the run, invoking `work` once per item
    ///
    /// Each item is bounded by the per-item timeout; an elapsed timeout is
    /// recorded as a network-or-timeout failure. A driver runs at most once.
    pub async fn run<F, Fut>(&mut self, work: F) -> HarnessResult<RunOutcome>
    where
        F: Fn(WorkItem) -> Fut,
        Fut: Future<Output = AttemptResult>,
    {
        if self.state != DriverState::NotStarted {
            return Err(HarnessError::InvalidInput(format!(
                "batch driver already used (state: {:?})",
                self.state
            )));
        }

        let plan = self.settings.plan;
        let num_batches = plan.num_batches();
        let per_item_timeout = self.settings.per_item_timeout;
        let mut outcome = RunOutcome::new();

        info!(
            total_count = plan.total_count(),
            batch_size = plan.batch_size(),
            num_batches = num_batches,
            inter_batch_delay_ms = self.settings.inter_batch_delay.as_millis() as u64,
            per_item_timeout_ms = per_item_timeout.as_millis() as u64,
            "Starting batched run"
        );

        for batch in plan.batches() {
            self.state = DriverState::Running {
                batch_index: batch.index,
            };
            debug!(
                batch = batch.index + 1,
                num_batches = num_batches,
                first_item = batch.range.start + 1,
                last_item = batch.range.end,
                "Processing batch"
            );

            let started = Instant::now();
            let in_flight = batch.items().map(|item| {
                let attempt = work(item);
                async move {
                    let result = match tokio::time::timeout(per_item_timeout, attempt).await {
                        Ok(result) => result,
                        Err(_) => AttemptResult::network_or_timeout(format!(
                            "timed out after {}ms",
                            per_item_timeout.as_millis()
                        )),
                    };
                    (item, result)
                }
            });
            let results = join_all(in_flight).await;

            let (succeeded, failed) = Self::account(&mut outcome, &results);
            log_batch_operation(
                batch.index,
                num_batches,
                batch.range.start + 1,
                batch.range.end,
                succeeded,
                failed,
                started.elapsed().as_millis() as u64,
            );

            let is_last = batch.index + 1 == num_batches;
            if !is_last && !self.settings.inter_batch_delay.is_zero() {
                tokio::time::sleep(self.settings.inter_batch_delay).await;
            }
        }

        self.state = DriverState::Completed;
        info!(
            succeeded = outcome.succeeded(),
            failed = outcome.failed(),
            total_count = plan.total_count(),
            "Batched run completed"
        );

        Ok(outcome)
    }

    /// Post-barrier accounting: the only place the outcome is mutated
    fn account(outcome: &mut RunOutcome, results: &[(WorkItem, AttemptResult)]) -> (usize, usize) {
        let mut succeeded = 0;
        let mut failed = 0;
        for (item, result) in results {
            outcome.record(result);
            match result {
                AttemptResult::Success { .. } => succeeded += 1,
                AttemptResult::Failure(cause) => {
                    failed += 1;
                    warn!(item = item.index() + 1, cause = %cause, "Work item failed");
                }
            }
        }
        (succeeded, failed)
    }
}
