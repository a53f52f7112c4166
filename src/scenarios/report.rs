//! Step-by-step result recording for scenarios.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Instant;

use crate::error::HarnessResult;
use crate::logging::{log_error, log_scenario_step};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum StepOutcome {
    Passed,
    Failed(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepReport {
    pub name: String,
    pub outcome: StepOutcome,
    pub elapsed_ms: u64,
}

impl StepReport {
    pub fn passed(&self) -> bool {
        self.outcome == StepOutcome::Passed
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub scenario: String,
    pub steps: Vec<StepReport>,
}

impl ScenarioReport {
    pub fn passed(&self) -> bool {
        self.steps.iter().all(StepReport::passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &StepReport> {
        self.steps.iter().filter(|step| !step.passed())
    }

    pub fn step(&self, name: &str) -> Option<&StepReport> {
        self.steps.iter().find(|step| step.name == name)
    }
}

impl std::fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Scenario: {}", self.scenario)?;
        for step in &self.steps {
            match &step.outcome {
                StepOutcome::Passed => {
                    writeln!(f, "  ✓ {} ({}ms)", step.name, step.elapsed_ms)?
                }
                StepOutcome::Failed(message) => writeln!(
                    f,
                    "  ✗ {} ({}ms): {}",
                    step.name, step.elapsed_ms, message
                )?,
            }
        }
        let failed = self.failures().count();
        write!(
            f,
            "{} steps, {} passed, {} failed",
            self.steps.len(),
            self.steps.len() - failed,
            failed
        )
    }
}

/// Collects step results while a scenario runs
#[derive(Debug)]
pub struct ScenarioRecorder {
    report: ScenarioReport,
}

impl ScenarioRecorder {
    pub fn new(scenario: impl Into<String>) -> Self {
        Self {
            report: ScenarioReport {
                scenario: scenario.into(),
                steps: Vec::new(),
            },
        }
    }

    /// Run one step and record its outcome; the value is kept for later steps
    pub async fn step<T, Fut>(&mut self, name: &str, step: Fut) -> Option<T>
    where
        Fut: Future<Output = HarnessResult<T>>,
    {
        let started = Instant::now();
        let result = step.await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let (outcome, value) = match result {
            Ok(value) => {
                log_scenario_step(&self.report.scenario, name, "passed", elapsed_ms, None);
                (StepOutcome::Passed, Some(value))
            }
            Err(e) => {
                let message = e.to_string();
                log_scenario_step(
                    &self.report.scenario,
                    name,
                    "failed",
                    elapsed_ms,
                    Some(&message),
                );
                log_error("scenario", name, &message, Some(&self.report.scenario));
                (StepOutcome::Failed(message), None)
            }
        };

        self.report.steps.push(StepReport {
            name: name.to_string(),
            outcome,
            elapsed_ms,
        });
        value
    }

    pub fn finish(self) -> ScenarioReport {
        self.report
    }
}
