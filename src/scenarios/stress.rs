//! The stress flow: one user publishes a large number of posts through the
//! batch driver, then another user follows them and both timelines are read
//! back.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::report::{ScenarioRecorder, ScenarioReport};
use super::expect_status;
use crate::api_clients::ServiceClients;
use crate::batch::{AttemptResult, BatchRequestDriver, BatchSettings, RunOutcome};
use crate::config::{StressConfig, UserFixtures};
use crate::error::{HarnessError, HarnessResult};
use crate::models::{CreatedPost, NewPost};

pub const SCENARIO_NAME: &str = "stress-flow";

/// Scenario steps plus the aggregate of the batched run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StressReport {
    pub report: ScenarioReport,
    pub outcome: Option<RunOutcome>,
    pub total_posts: usize,
    pub required_successes: usize,
}

impl StressReport {
    pub fn passed(&self) -> bool {
        self.report.passed()
    }
}

/// Run the stress flow
///
/// Invalid stress parameters are reported before any request is made.
pub async fn run_stress_flow(
    clients: &ServiceClients,
    users: &UserFixtures,
    stress: &StressConfig,
) -> HarnessResult<StressReport> {
    let settings = BatchSettings::from_stress_config(stress)?;
    let required_successes = stress.required_successes();
    let mut recorder = ScenarioRecorder::new(SCENARIO_NAME);
    let posts = &clients.posts;

    const FIRST_POST: &str = "User1 creates post 1";
    recorder
        .step(FIRST_POST, async {
            let response = posts.create_post(users.user1, &NewPost::text("ewqew")).await?;
            let created: CreatedPost =
                expect_status(FIRST_POST, response, StatusCode::CREATED)?.json()?;
            Ok(created.post_id)
        })
        .await;

    let bulk_step = format!("User2 creates {} posts", stress.total_posts);
    let outcome = recorder
        .step(&bulk_step, async {
            let mut driver = BatchRequestDriver::new(settings);
            let author = users.user2;
            let outcome = driver
                .run(|item| async move {
                    let post = NewPost::text(format!("Hello World {}", item.index() + 1));
                    let status = posts
                        .create_post(author, &post)
                        .await
                        .map(|response| response.status_code());
                    AttemptResult::from_call(status, StatusCode::CREATED.as_u16())
                })
                .await?;

            info!(
                succeeded = outcome.succeeded(),
                failed = outcome.failed(),
                total = stress.total_posts,
                "Successfully created {}/{} posts",
                outcome.succeeded(),
                stress.total_posts
            );
            Ok(outcome)
        })
        .await;

    const VERDICT: &str = "Bulk creation meets acceptance threshold";
    recorder
        .step(VERDICT, async {
            let outcome = outcome.ok_or_else(|| {
                HarnessError::assertion(VERDICT, "missing prerequisite: bulk run outcome")
            })?;
            if outcome.meets_threshold(required_successes) {
                Ok(())
            } else {
                Err(HarnessError::assertion(
                    VERDICT,
                    format!(
                        "{} of {} posts created, {} required ({} failed)",
                        outcome.succeeded(),
                        stress.total_posts,
                        required_successes,
                        outcome.failed()
                    ),
                ))
            }
        })
        .await;

    const FOLLOW: &str = "User1 follows User2";
    recorder
        .step(FOLLOW, async {
            let _ = clients.social.unblock(users.user1, users.user2).await;
            let response = clients.social.follow(users.user1, users.user2).await?;
            expect_status(FOLLOW, response, StatusCode::CREATED)?;
            Ok(())
        })
        .await;

    const USER_TIMELINE: &str = "Get UserTimeline for user2";
    recorder
        .step(USER_TIMELINE, async {
            let response = clients.timelines.user_timeline(&[users.user2]).await?;
            let entries = expect_status(USER_TIMELINE, response, StatusCode::OK)?.json_array()?;
            info!(entries = entries.len(), "User timeline of user2");
            Ok(entries.len())
        })
        .await;

    const HOME_TIMELINE: &str = "Get HomeTimeline for User1";
    recorder
        .step(HOME_TIMELINE, async {
            let response = clients.timelines.home_timeline(users.user1).await?;
            let entries = expect_status(HOME_TIMELINE, response, StatusCode::OK)?.json_array()?;
            info!(entries = entries.len(), "Home timeline of user1");
            Ok(entries.len())
        })
        .await;

    Ok(StressReport {
        report: recorder.finish(),
        outcome,
        total_posts: stress.total_posts,
        required_successes,
    })
}
