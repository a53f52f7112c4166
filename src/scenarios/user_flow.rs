//! The social user flow: three users post, reply, follow, block, unfollow,
//! search and read their timelines, then clean up.

use reqwest::StatusCode;
use tracing::info;

use super::report::{ScenarioRecorder, ScenarioReport};
use super::{entry_post_id, expect_status, require};
use crate::api_clients::ServiceClients;
use crate::config::UserFixtures;
use crate::error::HarnessError;
use crate::models::{CreatedPost, NewPost, PostRecord};

pub const SCENARIO_NAME: &str = "user-flow";

const POST_TEXT: &str = "ewqew";
const SEARCH_TERM: &str = "world";

/// Run the full user flow and report every step
pub async fn run_user_flow(clients: &ServiceClients, users: &UserFixtures) -> ScenarioReport {
    let mut recorder = ScenarioRecorder::new(SCENARIO_NAME);
    let posts = &clients.posts;
    let social = &clients.social;
    let timelines = &clients.timelines;

    info!(
        user1 = %users.user1,
        user2 = %users.user2,
        user3 = %users.user3,
        "Starting user flow"
    );

    const USER1_POST: &str = "User1 creates post 1";
    let user1_post = recorder
        .step(USER1_POST, async {
            let response = posts.create_post(users.user1, &NewPost::text(POST_TEXT)).await?;
            let created: CreatedPost =
                expect_status(USER1_POST, response, StatusCode::CREATED)?.json()?;
            Ok(created.post_id)
        })
        .await;

    const USER2_POST: &str = "User2 creates post 2";
    let user2_post = recorder
        .step(USER2_POST, async {
            let response = posts.create_post(users.user2, &NewPost::text(POST_TEXT)).await?;
            let created: CreatedPost =
                expect_status(USER2_POST, response, StatusCode::CREATED)?.json()?;
            Ok(created.post_id)
        })
        .await;

    const USER3_POST: &str = "User3 creates post 3";
    recorder
        .step(USER3_POST, async {
            let response = posts.create_post(users.user3, &NewPost::text(POST_TEXT)).await?;
            let created: CreatedPost =
                expect_status(USER3_POST, response, StatusCode::CREATED)?.json()?;
            Ok(created.post_id)
        })
        .await;

    const USER3_REPLY: &str = "User3 replies to User1 post 1";
    recorder
        .step(USER3_REPLY, async {
            let parent = require(USER3_REPLY, user1_post, "post id of user1")?;
            let post = NewPost::reply_to("replyTo: 'Hello World 2'", parent);
            let response = posts.create_post(users.user3, &post).await?;
            let created: CreatedPost =
                expect_status(USER3_REPLY, response, StatusCode::CREATED)?.json()?;
            Ok(created.post_id)
        })
        .await;

    // The flow answers user2's post through `replyId`, as the services expect
    const USER3_REPOST: &str = "User3 reposts to User2 post 1";
    recorder
        .step(USER3_REPOST, async {
            let parent = require(USER3_REPOST, user2_post, "post id of user2")?;
            let post = NewPost::reply_to("replyTo: 'Hello World 3'", parent);
            let response = posts.create_post(users.user3, &post).await?;
            let created: CreatedPost =
                expect_status(USER3_REPOST, response, StatusCode::CREATED)?.json()?;
            Ok(created.post_id)
        })
        .await;

    const USER2_TIMELINE: &str = "Get UserTimeline of user2";
    recorder
        .step(USER2_TIMELINE, async {
            let response = timelines.user_timeline(&[users.user2]).await?;
            let entries = expect_status(USER2_TIMELINE, response, StatusCode::OK)?.json_array()?;
            let expected = require(USER2_TIMELINE, user2_post, "post id of user2")?;
            if entries.iter().filter_map(entry_post_id).any(|id| id == expected) {
                Ok(())
            } else {
                Err(HarnessError::assertion(
                    USER2_TIMELINE,
                    format!(
                        "timeline of {} entries does not contain post {expected}",
                        entries.len()
                    ),
                ))
            }
        })
        .await;

    const FOLLOW_USER2: &str = "User1 follows User2";
    recorder
        .step(FOLLOW_USER2, async {
            // Clears a block left by a previous run; the result is not asserted
            let _ = social.unblock(users.user1, users.user2).await;
            let response = social.follow(users.user1, users.user2).await?;
            expect_status(FOLLOW_USER2, response, StatusCode::CREATED)?;
            Ok(())
        })
        .await;

    const FOLLOW_USER3: &str = "User1 follows User3";
    recorder
        .step(FOLLOW_USER3, async {
            let response = social.follow(users.user1, users.user3).await?;
            expect_status(FOLLOW_USER3, response, StatusCode::CREATED)?;
            Ok(())
        })
        .await;

    const HOME_TIMELINE: &str = "Get HomeTimeline for User1";
    recorder
        .step(HOME_TIMELINE, async {
            let response = timelines.home_timeline(users.user1).await?;
            expect_status(HOME_TIMELINE, response, StatusCode::OK)?;
            Ok(())
        })
        .await;

    const BLOCK_USER2: &str = "User1 blocks User2";
    recorder
        .step(BLOCK_USER2, async {
            let response = social.block(users.user1, users.user2).await?;
            expect_status(BLOCK_USER2, response, StatusCode::CREATED)?;
            Ok(())
        })
        .await;

    // Blocking removed the follow relation
    const UNFOLLOW_USER2: &str = "User1 unfollows User2";
    recorder
        .step(UNFOLLOW_USER2, async {
            let response = social.unfollow(users.user1, users.user2).await?;
            expect_status(UNFOLLOW_USER2, response, StatusCode::NOT_FOUND)?;
            Ok(())
        })
        .await;

    const UNFOLLOW_USER3: &str = "User1 unfollows User3";
    recorder
        .step(UNFOLLOW_USER3, async {
            let response = social.unfollow(users.user1, users.user3).await?;
            expect_status(UNFOLLOW_USER3, response, StatusCode::NO_CONTENT)?;
            Ok(())
        })
        .await;

    const FOLLOWERS: &str = "Get followers of User2";
    recorder
        .step(FOLLOWERS, async {
            let response = social.followers(users.user2).await?;
            expect_status(FOLLOWERS, response, StatusCode::OK)?;
            Ok(())
        })
        .await;

    const SEARCH: &str = "Search for \"world\"";
    recorder
        .step(SEARCH, async {
            let response = clients.search.search(SEARCH_TERM).await?;
            expect_status(SEARCH, response, StatusCode::OK)?;
            Ok(())
        })
        .await;

    const USER3_TIMELINE: &str = "Get UserTimeline for user3";
    recorder
        .step(USER3_TIMELINE, async {
            let response = timelines.user_timeline(&[users.user3]).await?;
            expect_status(USER3_TIMELINE, response, StatusCode::OK)?;
            Ok(())
        })
        .await;

    const HOME_TIMELINE_AGAIN: &str = "Get HomeTimeline for user1 again";
    recorder
        .step(HOME_TIMELINE_AGAIN, async {
            let response = timelines.home_timeline(users.user1).await?;
            expect_status(HOME_TIMELINE_AGAIN, response, StatusCode::OK)?;
            Ok(())
        })
        .await;

    const GET_POST: &str = "Get a specific post by postId";
    recorder
        .step(GET_POST, async {
            let post_id = require(GET_POST, user1_post, "post id of user1")?;
            let response = posts.get_post(users.user1, post_id).await?;
            let record: PostRecord = expect_status(GET_POST, response, StatusCode::OK)?.json()?;
            if record.id == post_id {
                Ok(())
            } else {
                Err(HarnessError::assertion(
                    GET_POST,
                    format!("expected post {post_id}, got {}", record.id),
                ))
            }
        })
        .await;

    const DELETE_POST: &str = "User1 deletes a post";
    recorder
        .step(DELETE_POST, async {
            let post_id = require(DELETE_POST, user1_post, "post id of user1")?;
            let response = posts.delete_post(users.user1, post_id).await?;
            expect_status(DELETE_POST, response, StatusCode::NO_CONTENT)?;
            Ok(())
        })
        .await;

    const USER_POSTS: &str = "Get posts by a specific user";
    recorder
        .step(USER_POSTS, async {
            let response = posts.list_user_posts(users.user1).await?;
            expect_status(USER_POSTS, response, StatusCode::OK)?.json_array()?;
            Ok(())
        })
        .await;

    const REPLIES: &str = "Get replies to a specific post";
    recorder
        .step(REPLIES, async {
            let post_id = require(REPLIES, user2_post, "post id of user2")?;
            let response = posts.list_replies(post_id).await?;
            expect_status(REPLIES, response, StatusCode::OK)?.json_array()?;
            Ok(())
        })
        .await;

    let report = recorder.finish();
    info!(
        passed = report.passed(),
        failures = report.failures().count(),
        "User flow finished"
    );
    report
}
