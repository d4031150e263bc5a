#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use time::macros::datetime;
use time::OffsetDateTime;
use tower::ServiceExt;

use driftboard::app::comments::CommentService;
use driftboard::app::posts::PostService;
use driftboard::domain::retention::RetentionPolicy;
use driftboard::infra::clock::ManualClock;
use driftboard::infra::db::Db;
use driftboard::AppState;

pub const START: OffsetDateTime = datetime!(2024-06-01 09:00:00 +8);

// ---------------------------------------------------------------------------
// TestApp: one private in-memory database and manual clock per test
// ---------------------------------------------------------------------------

pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub clock: ManualClock,
}

pub struct TestResponse {
    pub status: StatusCode,
    body_bytes: bytes::Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body_bytes).unwrap_or(Value::Null)
    }

    pub fn error_message(&self) -> String {
        self.json()["error"].as_str().unwrap_or("").to_string()
    }
}

/// Build an app with the default seven-day retention window.
pub async fn app() -> TestApp {
    TestApp::with_retention_days(7).await
}

impl TestApp {
    pub async fn with_retention_days(days: i64) -> Self {
        let db = Db::in_memory().await.expect("in-memory database");
        db.migrate().await.expect("migrations failed");

        let clock = ManualClock::new(START);
        let state = AppState {
            db,
            clock: Arc::new(clock.clone()),
            retention: RetentionPolicy::with_window_days(days),
        };
        let router = driftboard::http::router(state.clone());

        TestApp {
            router,
            state,
            clock,
        }
    }

    pub fn posts(&self) -> PostService {
        PostService::new(
            self.state.db.clone(),
            self.state.clock.clone(),
            self.state.retention,
        )
    }

    pub fn comments(&self) -> CommentService {
        CommentService::new(
            self.state.db.clone(),
            self.state.clock.clone(),
            self.state.retention,
        )
    }

    pub async fn count(&self, sql: &str) -> i64 {
        sqlx::query_scalar(sql)
            .fetch_one(self.state.db.pool())
            .await
            .expect("count query failed")
    }

    // ------------------------------------------------------------------
    // Low-level request helper
    // ------------------------------------------------------------------
    pub async fn request(&self, method: Method, path: &str, body: Option<Value>) -> TestResponse {
        let builder = Request::builder()
            .method(method)
            .uri(path)
            .header("host", "localhost");

        let request = if let Some(body) = body {
            builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap()
        } else {
            builder.body(Body::empty()).unwrap()
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("oneshot failed");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("failed to collect body")
            .to_bytes();

        TestResponse { status, body_bytes }
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(Method::GET, path, None).await
    }

    pub async fn post_json(&self, path: &str, body: Value) -> TestResponse {
        self.request(Method::POST, path, Some(body)).await
    }

    /// Create a post through the API and return its id.
    pub async fn create_post(&self, content: &str) -> i64 {
        let resp = self
            .post_json("/api/posts", serde_json::json!({ "content": content }))
            .await;
        assert_eq!(resp.status, StatusCode::CREATED);
        resp.json()["id"].as_i64().expect("post id")
    }
}
