use std::sync::Arc;

use sqlx::Row;

use crate::app::error::{require_text, ServiceError, ServiceResult};
use crate::app::posts::{write_expiry, MAX_AUTHOR_LEN};
use crate::domain::post::{author_or_default, Comment};
use crate::domain::retention::RetentionPolicy;
use crate::infra::clock::{self, Clock};
use crate::infra::db::Db;

pub const MAX_COMMENT_LEN: usize = 2_000;

#[derive(Clone)]
pub struct CommentService {
    db: Db,
    clock: Arc<dyn Clock>,
    retention: RetentionPolicy,
}

impl CommentService {
    pub fn new(db: Db, clock: Arc<dyn Clock>, retention: RetentionPolicy) -> Self {
        Self {
            db,
            clock,
            retention,
        }
    }

    /// Adds a comment to an active post and pushes the post's expiry out to
    /// one retention window after its latest activity.
    ///
    /// Expired posts are treated as missing even before the sweep removes
    /// them, so a comment can never revive a post readers can no longer see.
    pub async fn create_comment(
        &self,
        post_id: i64,
        content: String,
        author: Option<String>,
    ) -> ServiceResult<Comment> {
        require_text("content", &content, MAX_COMMENT_LEN)?;
        let author = author_or_default(author);
        require_text("author", &author, MAX_AUTHOR_LEN)?;

        let created_at = self.clock.now();
        let now = clock::to_epoch(created_at);

        let mut tx = self.db.pool().begin().await?;

        // The insert is the first statement so the transaction holds the
        // write lock before it reads anything; it only matches active posts.
        let result = sqlx::query(
            "INSERT INTO comments (content, post_id, author, created_at) \
             SELECT ?, id, ?, ? FROM posts WHERE id = ? AND expires_at > ?",
        )
        .bind(&content)
        .bind(&author)
        .bind(now)
        .bind(post_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound("post"));
        }

        let row = sqlx::query(
            "SELECT p.created_at, MAX(c.created_at) AS latest \
             FROM posts p JOIN comments c ON c.post_id = p.id \
             WHERE p.id = ?",
        )
        .bind(post_id)
        .fetch_one(&mut *tx)
        .await?;
        let post_created_at = clock::from_epoch(row.get("created_at"))?;
        let latest = clock::from_epoch(row.get("latest"))?;

        let expires_at = self.retention.expires_at(post_created_at, Some(latest));
        write_expiry(&mut tx, post_id, expires_at).await?;

        tx.commit().await?;

        tracing::debug!(
            post_id,
            expires_at = %clock::format(expires_at),
            "post expiry extended by comment"
        );

        Ok(Comment {
            id: result.last_insert_rowid(),
            post_id,
            content,
            author,
            created_at,
        })
    }
}
