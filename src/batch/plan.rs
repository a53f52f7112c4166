//! Partitioning of `[0, total_count)` into ordered, fixed-size batches.

use std::iter::FusedIterator;
use std::ops::Range;

/// One unit of work, identified by its sequence index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkItem(pub usize);

impl WorkItem {
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for WorkItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One batch of a plan: its position and the half-open range of item indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub index: usize,
    pub range: Range<usize>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// Work items of this batch in index order
    pub fn items(&self) -> impl Iterator<Item = WorkItem> {
        self.range.clone().map(WorkItem)
    }
}

/// Batch layout derived from a total item count and a batch size
///
/// The ranges produced by [`BatchPlan::batches`] are contiguous, ordered and
/// cover `[0, total_count)` exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPlan {
    total_count: usize,
    batch_size: usize,
}

impl BatchPlan {
    /// Build a plan; `None` when either argument is zero
    pub fn new(total_count: usize, batch_size: usize) -> Option<Self> {
        if total_count == 0 || batch_size == 0 {
            return None;
        }
        Some(Self {
            total_count,
            batch_size,
        })
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// `ceil(total_count / batch_size)`
    pub fn num_batches(&self) -> usize {
        self.total_count.div_ceil(self.batch_size)
    }

    /// Index range of batch `b`, or `None` past the last batch
    pub fn range(&self, b: usize) -> Option<Range<usize>> {
        let start = b.checked_mul(self.batch_size)?;
        if start >= self.total_count {
            return None;
        }
        let end = start.saturating_add(self.batch_size).min(self.total_count);
        Some(start..end)
    }

    /// Lazy, restartable sequence of the plan's batches
    pub fn batches(&self) -> BatchRanges {
        BatchRanges {
            plan: *self,
            next: 0,
        }
    }
}

impl IntoIterator for BatchPlan {
    type Item = Batch;
    type IntoIter = BatchRanges;

    fn into_iter(self) -> Self::IntoIter {
        self.batches()
    }
}

/// Iterator over the batches of a [`BatchPlan`]
#[derive(Debug, Clone)]
pub struct BatchRanges {
    plan: BatchPlan,
    next: usize,
}

impl Iterator for BatchRanges {
    type Item = Batch;

    fn next(&mut self) -> Option<Self::Item> {
        let range = self.plan.range(self.next)?;
        let batch = Batch {
            index: self.next,
            range,
        };
        self.next += 1;
        Some(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.plan.num_batches().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BatchRanges {}

impl FusedIterator for BatchRanges {}
