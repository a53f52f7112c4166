//! Scenario command handlers

use anyhow::Result;
use social_harness::api_clients::ServiceClients;
use social_harness::config::{HarnessConfig, StressConfig};
use social_harness::scenarios::{run_stress_flow, run_user_flow, ScenarioReport, StepOutcome};

use crate::OutputFormat;

pub async fn handle_stress_command(
    config: &HarnessConfig,
    stress: &StressConfig,
    format: OutputFormat,
) -> Result<bool> {
    let clients = ServiceClients::from_config(config)?;

    if format == OutputFormat::Text {
        println!(
            "Creating {} posts in batches of {} ({}ms apart)...",
            stress.total_posts, stress.batch_size, stress.inter_batch_delay_ms
        );
    }

    let stress_report = run_stress_flow(&clients, &config.fixtures, stress).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stress_report)?),
        OutputFormat::Text => {
            print_steps(&stress_report.report);
            if let Some(outcome) = stress_report.outcome {
                println!(
                    "\nBulk creation: {outcome} (required: {})",
                    stress_report.required_successes
                );
            }
            print_verdict(&stress_report.report);
        }
    }

    Ok(stress_report.passed())
}

pub async fn handle_user_flow_command(config: &HarnessConfig, format: OutputFormat) -> Result<bool> {
    let clients = ServiceClients::from_config(config)?;
    let report = run_user_flow(&clients, &config.fixtures).await;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => {
            print_steps(&report);
            print_verdict(&report);
        }
    }

    Ok(report.passed())
}

fn print_steps(report: &ScenarioReport) {
    println!("Scenario: {}", report.scenario);
    for step in &report.steps {
        match &step.outcome {
            StepOutcome::Passed => println!("  ✓ {} ({}ms)", step.name, step.elapsed_ms),
            StepOutcome::Failed(reason) => {
                println!("  ✗ {} ({}ms)", step.name, step.elapsed_ms);
                println!("      {reason}");
            }
        }
    }
}

fn print_verdict(report: &ScenarioReport) {
    if report.passed() {
        println!("\n✓ {report}");
    } else {
        println!("\n✗ {report}");
    }
}
