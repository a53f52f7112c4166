//! Per-item results and the run-wide accumulator.

use serde::{Deserialize, Serialize};

use crate::error::HarnessError;

/// Why a single work item failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FailureCause {
    /// The remote answered with a status outside the expected set
    UnexpectedStatus(u16),
    /// Connection failure, transport error or per-item timeout
    NetworkOrTimeout(String),
    /// The request was never sent: it could not be built from its inputs
    InvalidRequest(String),
}

impl std::fmt::Display for FailureCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureCause::UnexpectedStatus(code) => write!(f, "unexpected status {code}"),
            FailureCause::NetworkOrTimeout(detail) => write!(f, "network or timeout: {detail}"),
            FailureCause::InvalidRequest(detail) => write!(f, "invalid request: {detail}"),
        }
    }
}

/// Terminal outcome of one work item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttemptResult {
    Success { status: u16 },
    Failure(FailureCause),
}

impl AttemptResult {
    pub fn success(status: u16) -> Self {
        Self::Success { status }
    }

    pub fn unexpected_status(status: u16) -> Self {
        Self::Failure(FailureCause::UnexpectedStatus(status))
    }

    pub fn network_or_timeout(detail: impl Into<String>) -> Self {
        Self::Failure(FailureCause::NetworkOrTimeout(detail.into()))
    }

    /// Classify a received status against the status the caller expects
    pub fn from_status(status: u16, expected: u16) -> Self {
        if status == expected {
            Self::success(status)
        } else {
            Self::unexpected_status(status)
        }
    }

    pub fn invalid_request(detail: impl Into<String>) -> Self {
        Self::Failure(FailureCause::InvalidRequest(detail.into()))
    }

    /// Classify the result of a raw-status client call
    ///
    /// Only transport errors count as network failures; errors raised before
    /// anything was sent are invalid requests.
    pub fn from_call(result: Result<u16, HarnessError>, expected: u16) -> Self {
        match result {
            Ok(status) => Self::from_status(status, expected),
            Err(HarnessError::UnexpectedStatus { status, .. }) => Self::unexpected_status(status),
            Err(e) if e.is_transport() => Self::network_or_timeout(e.to_string()),
            Err(e) => Self::invalid_request(e.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AttemptResult::Success { .. })
    }
}

/// Aggregate success/failure counters of a batched run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutcome {
    succeeded: usize,
    failed: usize,
}

impl RunOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one item result into the counters
    pub fn record(&mut self, result: &AttemptResult) {
        match result {
            AttemptResult::Success { .. } => self.succeeded += 1,
            AttemptResult::Failure(_) => self.failed += 1,
        }
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Items resolved so far
    pub fn resolved(&self) -> usize {
        self.succeeded + self.failed
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }

    /// Acceptance check applied by callers to the final counts
    pub fn meets_threshold(&self, min_successes: usize) -> bool {
        self.succeeded >= min_successes
    }
}

impl std::fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} succeeded, {} failed ({} resolved)",
            self.succeeded,
            self.failed,
            self.resolved()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_counts_each_result_once() {
        let mut outcome = RunOutcome::new();
        outcome.record(&AttemptResult::success(201));
        outcome.record(&AttemptResult::unexpected_status(500));
        outcome.record(&AttemptResult::network_or_timeout("connection refused"));

        assert_eq!(outcome.succeeded(), 1);
        assert_eq!(outcome.failed(), 2);
        assert_eq!(outcome.resolved(), 3);
        assert!(!outcome.all_succeeded());
    }

    #[test]
    fn test_status_classification() {
        assert_eq!(AttemptResult::from_status(201, 201), AttemptResult::success(201));
        assert_eq!(
            AttemptResult::from_status(200, 201),
            AttemptResult::Failure(FailureCause::UnexpectedStatus(200))
        );
    }

    #[test]
    fn test_call_classification() {
        let err = HarnessError::unexpected_status("create post", 503, "busy");
        assert_eq!(
            AttemptResult::from_call(Err(err), 201),
            AttemptResult::unexpected_status(503)
        );

        let err = HarnessError::InvalidInput("Invalid media content type 'bad'".to_string());
        let result = AttemptResult::from_call(Err(err), 201);
        assert!(matches!(
            result,
            AttemptResult::Failure(FailureCause::InvalidRequest(_))
        ));
        assert!(!result.is_success());

        let err = HarnessError::config_error("Failed to construct URL");
        assert!(matches!(
            AttemptResult::from_call(Err(err), 201),
            AttemptResult::Failure(FailureCause::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_threshold() {
        let mut outcome = RunOutcome::new();
        for _ in 0..9 {
            outcome.record(&AttemptResult::success(201));
        }
        outcome.record(&AttemptResult::unexpected_status(400));

        assert!(outcome.meets_threshold(9));
        assert!(!outcome.meets_threshold(10));
        assert_eq!(outcome.to_string(), "9 succeeded, 1 failed (10 resolved)");
    }
}
