use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::app::comments::CommentService;
use crate::app::nicknames::random_nickname as generate_nickname;
use crate::app::posts::PostService;
use crate::domain::post::{Comment, Post, PostDetail};
use crate::http::AppError;
use crate::AppState;

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
}

#[derive(Serialize)]
pub(crate) struct PingResponse {
    message: &'static str,
}

pub(crate) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = if state.db.ping().await.is_ok() {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse { status })
}

pub(crate) async fn ping() -> Json<PingResponse> {
    Json(PingResponse { message: "pong" })
}

#[derive(Deserialize)]
pub struct WriteRequest {
    pub content: String,
    #[serde(default)]
    pub author: Option<String>,
}

#[derive(Serialize)]
pub struct PostListResponse {
    pub posts: Vec<Post>,
}

#[derive(Serialize)]
pub struct PostResponse {
    pub post: PostDetail,
}

#[derive(Serialize)]
pub struct NicknameResponse {
    pub nickname: String,
}

fn post_service(state: &AppState) -> PostService {
    PostService::new(state.db.clone(), state.clock.clone(), state.retention)
}

pub async fn list_posts(State(state): State<AppState>) -> Result<Json<PostListResponse>, AppError> {
    let posts = post_service(&state)
        .list_active_posts()
        .await
        .map_err(|err| AppError::from_service(err, "list posts"))?;

    Ok(Json(PostListResponse { posts }))
}

pub async fn create_post(
    State(state): State<AppState>,
    Json(payload): Json<WriteRequest>,
) -> Result<(StatusCode, Json<Post>), AppError> {
    let post = post_service(&state)
        .create_post(payload.content, payload.author)
        .await
        .map_err(|err| AppError::from_service(err, "create post"))?;

    tracing::info!(post_id = post.id, "post created");
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn get_post(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<PostResponse>, AppError> {
    let post = post_service(&state)
        .get_post(id)
        .await
        .map_err(|err| AppError::from_service(err, "fetch post"))?;

    Ok(Json(PostResponse { post }))
}

pub async fn create_comment(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(payload): Json<WriteRequest>,
) -> Result<(StatusCode, Json<Comment>), AppError> {
    let service = CommentService::new(state.db.clone(), state.clock.clone(), state.retention);
    let comment = service
        .create_comment(id, payload.content, payload.author)
        .await
        .map_err(|err| AppError::from_service(err, "add comment"))?;

    tracing::info!(post_id = id, comment_id = comment.id, "comment added");
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn random_nickname() -> Json<NicknameResponse> {
    let nickname = generate_nickname(&mut rand::thread_rng());
    Json(NicknameResponse { nickname })
}
