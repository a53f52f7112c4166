//! # Batched Request Driver
//!
//! Bounded-concurrency execution of a large number of remote-effecting work
//! items with aggregated outcome accounting.
//!
//! A run is split into fixed-size batches by [`BatchPlan`]. Every item of a
//! batch is driven concurrently on the current task, the batch is awaited to
//! completion (the batch barrier), results are folded into a [`RunOutcome`],
//! and the driver pauses before the next batch.
//!
//! ```rust
//! use social_harness::batch::{AttemptResult, BatchRequestDriver, BatchSettings};
//! use std::time::Duration;
//!
//! # async fn example() -> social_harness::HarnessResult<()> {
//! let settings = BatchSettings::new(300, 150, Duration::ZERO, Duration::from_secs(10))?;
//! let mut driver = BatchRequestDriver::new(settings);
//! let outcome = driver
//!     .run(|item| async move { AttemptResult::success(201) })
//!     .await?;
//! assert_eq!(outcome.succeeded(), 300);
//! # Ok(())
//! # }
//! ```

pub mod driver;
pub mod outcome;
pub mod plan;

pub use driver::{BatchRequestDriver, BatchSettings, DriverState};
pub use outcome::{AttemptResult, FailureCause, RunOutcome};
pub use plan::{Batch, BatchPlan, BatchRanges, WorkItem};
