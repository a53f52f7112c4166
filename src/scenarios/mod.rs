//! # End-to-End Scenarios
//!
//! Scripted flows against the running services. Each step is recorded in a
//! [`ScenarioReport`]; a failing step is terminal for that step only and the
//! flow carries on, with dependent steps failing on their missing inputs.

pub mod report;
pub mod stress;
pub mod user_flow;

pub use report::{ScenarioRecorder, ScenarioReport, StepOutcome, StepReport};
pub use stress::{run_stress_flow, StressReport};
pub use user_flow::run_user_flow;

use reqwest::StatusCode;
use uuid::Uuid;

use crate::api_clients::ApiResponse;
use crate::error::{HarnessError, HarnessResult};

/// Assert the exact status of a response
pub(crate) fn expect_status(
    step: &str,
    response: ApiResponse,
    expected: StatusCode,
) -> HarnessResult<ApiResponse> {
    if response.status == expected {
        Ok(response)
    } else {
        Err(HarnessError::assertion(
            step,
            format!(
                "expected HTTP {}, got HTTP {} ({})",
                expected.as_u16(),
                response.status.as_u16(),
                truncate(&response.body, 200)
            ),
        ))
    }
}

/// Unwrap a value produced by an earlier step
pub(crate) fn require(step: &str, value: Option<Uuid>, what: &str) -> HarnessResult<Uuid> {
    value.ok_or_else(|| HarnessError::assertion(step, format!("missing prerequisite: {what}")))
}

fn truncate(body: &str, max: usize) -> &str {
    match body.char_indices().nth(max) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

/// Identifier of a timeline or listing entry, whichever spelling it uses
pub(crate) fn entry_post_id(entry: &serde_json::Value) -> Option<Uuid> {
    entry
        .get("postId")
        .or_else(|| entry.get("id"))
        .and_then(|v| v.as_str())
        .and_then(|s| Uuid::parse_str(s).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_post_id() {
        let id = "123e4567-e89b-12d3-a456-426614174000";
        assert_eq!(
            entry_post_id(&json!({ "postId": id })).map(|u| u.to_string()),
            Some(id.to_string())
        );
        assert_eq!(
            entry_post_id(&json!({ "id": id })).map(|u| u.to_string()),
            Some(id.to_string())
        );
        assert_eq!(entry_post_id(&json!({ "text": "x" })), None);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("abc", 10), "abc");
    }

    #[test]
    fn test_require_reports_missing_prerequisite() {
        let err = require("Get a post", None, "user1 post id").unwrap_err();
        assert!(err.to_string().contains("missing prerequisite: user1 post id"));
    }
}
