use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::infra::clock;

pub const DEFAULT_AUTHOR: &str = "anonymous";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub content: String,
    pub author: String,
    #[serde(with = "clock::cst")]
    pub created_at: OffsetDateTime,
    #[serde(with = "clock::cst")]
    pub expires_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub content: String,
    pub author: String,
    #[serde(with = "clock::cst")]
    pub created_at: OffsetDateTime,
}

/// A post together with its comments, oldest comment first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub post: Post,
    pub comments: Vec<Comment>,
}

/// Trims the supplied author and falls back to [`DEFAULT_AUTHOR`] when blank.
pub fn author_or_default(author: Option<String>) -> String {
    match author {
        Some(author) if !author.trim().is_empty() => author.trim().to_string(),
        _ => DEFAULT_AUTHOR.to_string(),
    }
}
