//! # Mock Service Infrastructure
//!
//! In-process stand-ins for the post, social, timeline and search services
//! and for the search engine's index API. Each server binds an ephemeral port
//! on localhost and keeps just enough state for the scenarios to observe the
//! effects of their own calls.

#![allow(dead_code)]

use axum::extract::{Multipart, Path, RawQuery, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, head, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use social_harness::api_clients::ServiceClients;
use social_harness::config::{HarnessConfig, ServiceEndpoints};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Knobs for the service mock
#[derive(Debug, Clone, Default)]
pub struct MockBehavior {
    /// Answer `500` for `"Hello World {n}"` posts where `n` is a multiple
    pub fail_every: Option<usize>,
    /// Hold every post creation for this long before answering
    pub post_latency: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct StoredPost {
    pub id: Uuid,
    pub author: Uuid,
    pub text: String,
    pub reply_id: Option<Uuid>,
    pub repost_id: Option<Uuid>,
}

impl StoredPost {
    fn to_json(&self) -> Value {
        json!({
            "postId": self.id,
            "authorId": self.author,
            "text": self.text,
            "mediaId": null,
            "replyId": self.reply_id,
            "repostId": self.repost_id,
            "creationDate": "2025-03-21T14:05:00",
        })
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub user_id: Option<String>,
    pub terms: Option<String>,
    pub authorization: Option<String>,
}

#[derive(Debug, Default)]
pub struct MockState {
    pub behavior: MockBehavior,
    pub posts: Mutex<Vec<StoredPost>>,
    pub follows: Mutex<HashSet<(Uuid, Uuid)>>,
    pub blocks: Mutex<HashSet<(Uuid, Uuid)>>,
    /// (user, post) pairs
    pub likes: Mutex<HashSet<(Uuid, Uuid)>>,
    /// Raw JSON bodies received by the like endpoints
    pub like_bodies: Mutex<Vec<Value>>,
    pub requests: Mutex<Vec<RecordedRequest>>,
    pub post_forms: Mutex<Vec<HashMap<String, String>>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockState {
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn post_count(&self) -> usize {
        self.posts.lock().unwrap().len()
    }

    pub fn requests_to(&self, method: &str, path: &str) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .cloned()
            .collect()
    }

    fn enter(&self) -> InFlight<'_> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        InFlight(&self.in_flight)
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// All five services behind one listener
pub struct MockServices {
    pub base_url: String,
    pub state: Arc<MockState>,
    shutdown_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl MockServices {
    pub async fn start() -> Self {
        Self::start_with(MockBehavior::default()).await
    }

    pub async fn start_with(behavior: MockBehavior) -> Self {
        let state = Arc::new(MockState {
            behavior,
            ..MockState::default()
        });

        let app = Router::new()
            .route("/api/posts", post(create_post))
            .route("/api/posts/:id", get(get_post).delete(delete_post))
            .route("/api/posts/:id/replies", get(list_replies))
            .route("/api/posts/:id/reposts", get(list_reposts))
            .route("/api/users/:id/posts", get(list_user_posts))
            .route("/api/users/timeline", get(user_timeline))
            .route("/api/users/:id/home-timeline", get(home_timeline))
            .route("/api/repo-social/users/follow", post(follow))
            .route("/api/repo-social/users/unfollow", axum::routing::delete(unfollow))
            .route("/api/repo-social/users/block", post(block))
            .route("/api/repo-social/users/unblock", axum::routing::delete(unblock))
            .route("/api/repo-social/users/:id/:relation", get(relation_listing))
            .route("/api/repo-social/posts/like", post(like_post))
            .route("/api/repo-social/posts/unlike", axum::routing::delete(unlike_post))
            .route("/api/repo-social/posts/:id/likes", get(post_likes))
            .route("/search", get(search))
            .layer(middleware::from_fn_with_state(state.clone(), record_request))
            .with_state(state.clone());

        let (base_url, shutdown_tx, handle) = serve(app).await;
        Self {
            base_url,
            state,
            shutdown_tx,
            handle,
        }
    }

    /// Configuration pointing every service at this mock
    pub fn config(&self) -> HarnessConfig {
        HarnessConfig {
            services: ServiceEndpoints {
                post_url: self.base_url.clone(),
                social_url: self.base_url.clone(),
                search_url: self.base_url.clone(),
                user_timeline_url: self.base_url.clone(),
                home_timeline_url: self.base_url.clone(),
                request_timeout_ms: 5_000,
            },
            ..HarnessConfig::default()
        }
    }

    pub fn clients(&self) -> ServiceClients {
        ServiceClients::from_config(&self.config()).expect("mock clients")
    }

    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        let _ = self.handle.await;
    }
}

async fn serve(app: Router) -> (String, oneshot::Sender<()>, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock listener");
    let addr = listener.local_addr().expect("mock listener address");
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .expect("mock server failed");
    });

    (format!("http://{addr}"), shutdown_tx, handle)
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn acting_user(headers: &HeaderMap) -> Option<Uuid> {
    header_str(headers, "X-user-id").and_then(|v| Uuid::parse_str(&v).ok())
}

async fn record_request(
    State(state): State<Arc<MockState>>,
    request: Request,
    next: Next,
) -> Response {
    let headers = request.headers();
    let recorded = RecordedRequest {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        query: request.uri().query().map(str::to_string),
        user_id: header_str(headers, "X-user-id"),
        terms: header_str(headers, "X-Terms"),
        authorization: header_str(headers, "authorization"),
    };
    state.requests.lock().unwrap().push(recorded);
    next.run(request).await
}

async fn create_post(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let _in_flight = state.enter();
    let Some(author) = acting_user(&headers) else {
        return (StatusCode::BAD_REQUEST, "missing X-user-id").into_response();
    };

    let mut fields = HashMap::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let value = field.text().await.unwrap_or_default();
        fields.insert(name, value);
    }
    state.post_forms.lock().unwrap().push(fields.clone());

    if let Some(latency) = state.behavior.post_latency {
        tokio::time::sleep(latency).await;
    }

    let text = fields.get("text").cloned().unwrap_or_default();
    if let Some(every) = state.behavior.fail_every {
        let n = text
            .strip_prefix("Hello World ")
            .and_then(|n| n.parse::<usize>().ok());
        if n.is_some_and(|n| n % every == 0) {
            return (StatusCode::INTERNAL_SERVER_ERROR, "injected failure").into_response();
        }
    }

    let parse = |key: &str| fields.get(key).and_then(|v| Uuid::parse_str(v).ok());
    let stored = StoredPost {
        id: Uuid::new_v4(),
        author,
        text,
        reply_id: parse("replyId"),
        repost_id: parse("repostId"),
    };
    let id = stored.id;
    state.posts.lock().unwrap().push(stored);

    (StatusCode::CREATED, Json(json!({ "postId": id }))).into_response()
}

async fn get_post(State(state): State<Arc<MockState>>, Path(id): Path<Uuid>) -> Response {
    match state.posts.lock().unwrap().iter().find(|p| p.id == id) {
        Some(post) => Json(post.to_json()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn delete_post(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> StatusCode {
    let mut posts = state.posts.lock().unwrap();
    match posts.iter().position(|p| p.id == id) {
        Some(idx) if Some(posts[idx].author) == acting_user(&headers) => {
            posts.remove(idx);
            StatusCode::NO_CONTENT
        }
        Some(_) => StatusCode::FORBIDDEN,
        None => StatusCode::NOT_FOUND,
    }
}

fn listing<F: Fn(&StoredPost) -> bool>(state: &MockState, keep: F) -> Json<Value> {
    let posts = state.posts.lock().unwrap();
    Json(Value::Array(
        posts.iter().rev().filter(|p| keep(p)).map(StoredPost::to_json).collect(),
    ))
}

async fn list_replies(State(state): State<Arc<MockState>>, Path(id): Path<Uuid>) -> Json<Value> {
    listing(&state, |p| p.reply_id == Some(id))
}

async fn list_reposts(State(state): State<Arc<MockState>>, Path(id): Path<Uuid>) -> Json<Value> {
    listing(&state, |p| p.repost_id == Some(id))
}

async fn list_user_posts(
    State(state): State<Arc<MockState>>,
    Path(id): Path<Uuid>,
) -> Json<Value> {
    listing(&state, |p| p.author == id)
}

async fn user_timeline(State(state): State<Arc<MockState>>, RawQuery(query): RawQuery) -> Response {
    let user_ids: HashSet<Uuid> = query
        .unwrap_or_default()
        .split('&')
        .filter_map(|pair| pair.strip_prefix("userIds="))
        .filter_map(|v| Uuid::parse_str(v).ok())
        .collect();

    if user_ids.is_empty() {
        return (StatusCode::BAD_REQUEST, "userIds required").into_response();
    }
    listing(&state, |p| user_ids.contains(&p.author)).into_response()
}

async fn home_timeline(State(state): State<Arc<MockState>>, Path(id): Path<Uuid>) -> Json<Value> {
    let followees: HashSet<Uuid> = state
        .follows
        .lock()
        .unwrap()
        .iter()
        .filter(|(follower, _)| *follower == id)
        .map(|(_, followee)| *followee)
        .collect();
    listing(&state, |p| followees.contains(&p.author))
}

async fn follow(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(target): Json<Uuid>,
) -> StatusCode {
    let Some(user) = acting_user(&headers) else {
        return StatusCode::BAD_REQUEST;
    };
    let blocks = state.blocks.lock().unwrap();
    if blocks.contains(&(user, target)) || blocks.contains(&(target, user)) {
        return StatusCode::FORBIDDEN;
    }
    if state.follows.lock().unwrap().insert((user, target)) {
        StatusCode::CREATED
    } else {
        StatusCode::CONFLICT
    }
}

async fn unfollow(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(target): Json<Uuid>,
) -> StatusCode {
    let Some(user) = acting_user(&headers) else {
        return StatusCode::BAD_REQUEST;
    };
    if state.follows.lock().unwrap().remove(&(user, target)) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn block(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(target): Json<Uuid>,
) -> StatusCode {
    let Some(user) = acting_user(&headers) else {
        return StatusCode::BAD_REQUEST;
    };
    {
        let mut follows = state.follows.lock().unwrap();
        follows.remove(&(user, target));
        follows.remove(&(target, user));
    }
    if state.blocks.lock().unwrap().insert((user, target)) {
        StatusCode::CREATED
    } else {
        StatusCode::CONFLICT
    }
}

async fn unblock(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(target): Json<Uuid>,
) -> StatusCode {
    let Some(user) = acting_user(&headers) else {
        return StatusCode::BAD_REQUEST;
    };
    if state.blocks.lock().unwrap().remove(&(user, target)) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn relation_listing(
    State(state): State<Arc<MockState>>,
    Path((id, relation)): Path<(Uuid, String)>,
) -> Response {
    let pairs: Vec<(Uuid, Uuid)> = match relation.as_str() {
        "followers" | "follows" => state.follows.lock().unwrap().iter().copied().collect(),
        "blocks" | "blocked" => state.blocks.lock().unwrap().iter().copied().collect(),
        "likes" => state.likes.lock().unwrap().iter().copied().collect(),
        _ => return StatusCode::NOT_FOUND.into_response(),
    };

    let ids: Vec<Uuid> = match relation.as_str() {
        "followers" | "blocked" => pairs.iter().filter(|(_, b)| *b == id).map(|(a, _)| *a).collect(),
        _ => pairs.iter().filter(|(a, _)| *a == id).map(|(_, b)| *b).collect(),
    };
    Json(ids).into_response()
}

/// Like bodies are `{"postId": "<uuid>"}`; anything else is a `400`
fn liked_post_id(state: &MockState, body: Value) -> Option<Uuid> {
    let post_id = body
        .get("postId")
        .and_then(Value::as_str)
        .and_then(|v| Uuid::parse_str(v).ok());
    state.like_bodies.lock().unwrap().push(body);
    post_id
}

async fn like_post(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    let (Some(user), Some(post_id)) = (acting_user(&headers), liked_post_id(&state, body)) else {
        return StatusCode::BAD_REQUEST;
    };
    if !state.posts.lock().unwrap().iter().any(|p| p.id == post_id) {
        return StatusCode::NOT_FOUND;
    }
    if state.likes.lock().unwrap().insert((user, post_id)) {
        StatusCode::CREATED
    } else {
        StatusCode::CONFLICT
    }
}

async fn unlike_post(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    let (Some(user), Some(post_id)) = (acting_user(&headers), liked_post_id(&state, body)) else {
        return StatusCode::BAD_REQUEST;
    };
    if state.likes.lock().unwrap().remove(&(user, post_id)) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn post_likes(State(state): State<Arc<MockState>>, Path(id): Path<Uuid>) -> Json<Vec<Uuid>> {
    Json(
        state
            .likes
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, post)| *post == id)
            .map(|(user, _)| *user)
            .collect(),
    )
}

async fn search(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    let Some(terms) = header_str(&headers, "X-Terms").filter(|t| !t.trim().is_empty()) else {
        return (StatusCode::BAD_REQUEST, "X-Terms required").into_response();
    };
    let terms: Vec<String> = terms.split_whitespace().map(str::to_lowercase).collect();
    listing(&state, |p| {
        let text = p.text.to_lowercase();
        terms.iter().any(|t| text.contains(t))
    })
    .into_response()
}

/// Search engine index API stand-in
pub struct MockSearchEngine {
    pub base_url: String,
    pub state: Arc<EngineState>,
    shutdown_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

#[derive(Debug, Default)]
pub struct EngineState {
    pub exists: AtomicBool,
    /// HEAD reports the index missing even once it exists
    pub hide_on_head: bool,
    pub heads: AtomicUsize,
    pub puts: AtomicUsize,
    pub mapping: Mutex<Option<Value>>,
}

impl MockSearchEngine {
    pub async fn start() -> Self {
        Self::start_with(EngineState::default()).await
    }

    pub async fn start_with(state: EngineState) -> Self {
        let state = Arc::new(state);
        let app = Router::new()
            .route("/:index", head(index_head).put(index_put))
            .with_state(state.clone());

        let (base_url, shutdown_tx, handle) = serve(app).await;
        Self {
            base_url,
            state,
            shutdown_tx,
            handle,
        }
    }

    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        let _ = self.handle.await;
    }
}

async fn index_head(State(state): State<Arc<EngineState>>) -> StatusCode {
    state.heads.fetch_add(1, Ordering::SeqCst);
    if state.exists.load(Ordering::SeqCst) && !state.hide_on_head {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn index_put(
    State(state): State<Arc<EngineState>>,
    Path(index): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    state.puts.fetch_add(1, Ordering::SeqCst);
    if state.exists.swap(true, Ordering::SeqCst) {
        let error = json!({
            "error": {
                "type": "resource_already_exists_exception",
                "reason": format!("index [{index}] already exists"),
            },
            "status": 400,
        });
        return (StatusCode::BAD_REQUEST, Json(error)).into_response();
    }
    *state.mapping.lock().unwrap() = Some(body);
    Json(json!({ "acknowledged": true, "index": index })).into_response()
}
