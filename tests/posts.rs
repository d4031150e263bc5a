//! Post and comment API tests
//!
//! Covers creation, validation, listing, fetching and the expiry filter on
//! every read path.

mod common;

use axum::http::StatusCode;
use common::app;
use serde_json::json;
use time::Duration;

// ===========================================================================
// Post Creation
// ===========================================================================

#[tokio::test]
async fn create_post_valid() {
    let app = app().await;

    let resp = app
        .post_json("/api/posts", json!({ "content": "hello board", "author": "moth" }))
        .await;

    assert_eq!(resp.status, StatusCode::CREATED);
    let body = resp.json();
    assert!(body["id"].is_i64());
    assert_eq!(body["content"], "hello board");
    assert_eq!(body["author"], "moth");
    assert_eq!(body["created_at"], "2024-06-01 09:00:00");
    assert_eq!(body["expires_at"], "2024-06-08 09:00:00");
}

#[tokio::test]
async fn create_post_defaults_author() {
    let app = app().await;

    let resp = app.post_json("/api/posts", json!({ "content": "who am i" })).await;
    assert_eq!(resp.status, StatusCode::CREATED);
    assert_eq!(resp.json()["author"], "anonymous");

    let resp = app
        .post_json("/api/posts", json!({ "content": "still nobody", "author": "  " }))
        .await;
    assert_eq!(resp.json()["author"], "anonymous");
}

#[tokio::test]
async fn create_post_empty_content() {
    let app = app().await;

    let resp = app.post_json("/api/posts", json!({ "content": "   " })).await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error_message(), "content cannot be empty");
    assert_eq!(app.count("SELECT COUNT(*) FROM posts").await, 0);
}

#[tokio::test]
async fn create_post_content_too_long() {
    let app = app().await;

    let resp = app
        .post_json("/api/posts", json!({ "content": "a".repeat(10_001) }))
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error_message(), "content must be at most 10000 characters");
}

// ===========================================================================
// Reading
// ===========================================================================

#[tokio::test]
async fn list_posts_newest_first() {
    let app = app().await;
    let first = app.create_post("first").await;
    app.clock.advance(Duration::minutes(1));
    let second = app.create_post("second").await;

    let resp = app.get("/api/posts").await;
    assert_eq!(resp.status, StatusCode::OK);

    let ids: Vec<i64> = resp.json()["posts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![second, first]);
}

#[tokio::test]
async fn list_posts_hides_expired_before_sweep() {
    let app = app().await;
    let old = app.create_post("old").await;
    app.clock.advance(Duration::days(3));
    let fresh = app.create_post("fresh").await;

    app.clock.advance(Duration::days(4));

    let posts = app.get("/api/posts").await.json()["posts"].clone();
    let ids: Vec<i64> = posts
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![fresh]);

    // still physically present until the sweep runs
    let stored = app.count("SELECT COUNT(*) FROM posts").await;
    assert_eq!(stored, 2);
    assert!(old < fresh);
}

#[tokio::test]
async fn get_post_with_comments() {
    let app = app().await;
    let post_id = app.create_post("topic").await;

    for body in ["one", "two"] {
        app.clock.advance(Duration::minutes(1));
        let resp = app
            .post_json(&format!("/api/posts/{}/comments", post_id), json!({ "content": body }))
            .await;
        assert_eq!(resp.status, StatusCode::CREATED);
    }

    let resp = app.get(&format!("/api/posts/{}", post_id)).await;
    assert_eq!(resp.status, StatusCode::OK);

    let post = &resp.json()["post"];
    assert_eq!(post["id"].as_i64().unwrap(), post_id);
    let comments = post["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["content"], "one");
    assert_eq!(comments[1]["content"], "two");
    assert_eq!(comments[0]["author"], "anonymous");
    assert_eq!(post["expires_at"], "2024-06-08 09:02:00");
}

#[tokio::test]
async fn get_nonexistent_post() {
    let app = app().await;

    let resp = app.get("/api/posts/12345").await;

    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.error_message(), "post not found");
}

#[tokio::test]
async fn get_expired_post_before_sweep() {
    let app = app().await;
    let post_id = app.create_post("fading").await;

    app.clock.advance(Duration::days(7));

    let resp = app.get(&format!("/api/posts/{}", post_id)).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(app.count("SELECT COUNT(*) FROM posts").await, 1);
}

// ===========================================================================
// Comments
// ===========================================================================

#[tokio::test]
async fn comment_extends_expiry() {
    let app = app().await;
    let post_id = app.create_post("topic").await;

    app.clock.advance(Duration::days(2));
    let resp = app
        .post_json(
            &format!("/api/posts/{}/comments", post_id),
            json!({ "content": "bump", "author": "lark" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::CREATED);
    let comment = resp.json();
    assert_eq!(comment["post_id"].as_i64().unwrap(), post_id);
    assert_eq!(comment["created_at"], "2024-06-03 09:00:00");

    let post = app.get(&format!("/api/posts/{}", post_id)).await.json();
    assert_eq!(post["post"]["expires_at"], "2024-06-10 09:00:00");
}

#[tokio::test]
async fn comment_on_missing_post() {
    let app = app().await;

    let resp = app
        .post_json("/api/posts/777/comments", json!({ "content": "anyone?" }))
        .await;

    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.error_message(), "post not found");
    assert_eq!(app.count("SELECT COUNT(*) FROM comments").await, 0);
}

#[tokio::test]
async fn comment_empty_content() {
    let app = app().await;
    let post_id = app.create_post("topic").await;

    let resp = app
        .post_json(&format!("/api/posts/{}/comments", post_id), json!({ "content": "" }))
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error_message(), "content cannot be empty");
}

#[tokio::test]
async fn comment_on_expired_post_is_rejected() {
    let app = app().await;
    let post_id = app.create_post("topic").await;

    app.clock.advance(Duration::days(7) + Duration::seconds(1));
    let resp = app
        .post_json(&format!("/api/posts/{}/comments", post_id), json!({ "content": "revive" }))
        .await;

    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(app.count("SELECT COUNT(*) FROM comments").await, 0);
}

// ===========================================================================
// Misc
// ===========================================================================

#[tokio::test]
async fn health_and_ping() {
    let app = app().await;

    let resp = app.get("/health").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["status"], "ok");

    let resp = app.get("/ping").await;
    assert_eq!(resp.json()["message"], "pong");
}

#[tokio::test]
async fn random_nickname_has_two_parts() {
    let app = app().await;

    let resp = app.get("/api/random-nickname").await;
    assert_eq!(resp.status, StatusCode::OK);
    let nickname = resp.json()["nickname"].as_str().unwrap().to_string();
    assert_eq!(nickname.split('-').count(), 2);
}
