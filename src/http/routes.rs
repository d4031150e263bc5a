use axum::{routing::get, routing::post, Router};

use crate::http::handlers;
use crate::AppState;

pub fn health() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/ping", get(handlers::ping))
}

pub fn posts() -> Router<AppState> {
    Router::new()
        .route("/api/posts", get(handlers::list_posts))
        .route("/api/posts", post(handlers::create_post))
        .route("/api/posts/:id", get(handlers::get_post))
        .route("/api/posts/:id/comments", post(handlers::create_comment))
}

pub fn nicknames() -> Router<AppState> {
    Router::new().route("/api/random-nickname", get(handlers::random_nickname))
}
