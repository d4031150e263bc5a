use std::sync::Arc;

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use time::OffsetDateTime;

use crate::app::error::{require_text, ServiceError, ServiceResult};
use crate::domain::post::{author_or_default, Comment, Post, PostDetail};
use crate::domain::retention::RetentionPolicy;
use crate::infra::clock::{self, Clock};
use crate::infra::db::Db;

pub const MAX_POST_LEN: usize = 10_000;
pub const MAX_AUTHOR_LEN: usize = 64;

#[derive(Clone)]
pub struct PostService {
    db: Db,
    clock: Arc<dyn Clock>,
    retention: RetentionPolicy,
}

impl PostService {
    pub fn new(db: Db, clock: Arc<dyn Clock>, retention: RetentionPolicy) -> Self {
        Self {
            db,
            clock,
            retention,
        }
    }

    pub async fn create_post(&self, content: String, author: Option<String>) -> ServiceResult<Post> {
        require_text("content", &content, MAX_POST_LEN)?;
        let author = author_or_default(author);
        require_text("author", &author, MAX_AUTHOR_LEN)?;

        let created_at = self.clock.now();
        let expires_at = self.retention.expires_at(created_at, None);

        let result = sqlx::query(
            "INSERT INTO posts (content, author, created_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&content)
        .bind(&author)
        .bind(clock::to_epoch(created_at))
        .bind(clock::to_epoch(expires_at))
        .execute(self.db.pool())
        .await?;

        Ok(Post {
            id: result.last_insert_rowid(),
            content,
            author,
            created_at,
            expires_at,
        })
    }

    /// Posts that have not yet expired, newest first.
    pub async fn list_active_posts(&self) -> ServiceResult<Vec<Post>> {
        let now = clock::to_epoch(self.clock.now());
        let rows = sqlx::query(
            "SELECT id, content, author, created_at, expires_at \
             FROM posts \
             WHERE expires_at > ? \
             ORDER BY created_at DESC, id DESC",
        )
        .bind(now)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(post_from_row).collect()
    }

    /// Fetches an active post with its comments, oldest comment first.
    pub async fn get_post(&self, post_id: i64) -> ServiceResult<PostDetail> {
        let now = clock::to_epoch(self.clock.now());
        let mut tx = self.db.pool().begin().await?;

        let row = sqlx::query(
            "SELECT id, content, author, created_at, expires_at \
             FROM posts \
             WHERE id = ? AND expires_at > ?",
        )
        .bind(post_id)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Err(ServiceError::NotFound("post"));
        };
        let post = post_from_row(&row)?;

        let comments = sqlx::query(
            "SELECT id, post_id, content, author, created_at \
             FROM comments \
             WHERE post_id = ? \
             ORDER BY created_at ASC, id ASC",
        )
        .bind(post_id)
        .fetch_all(&mut *tx)
        .await?
        .iter()
        .map(comment_from_row)
        .collect::<ServiceResult<Vec<_>>>()?;

        tx.commit().await?;

        Ok(PostDetail { post, comments })
    }

    /// Overwrites a post's expiry. Setting the same value twice is a no-op.
    pub async fn set_post_expiry(&self, post_id: i64, expires_at: OffsetDateTime) -> ServiceResult<()> {
        let mut conn = self.db.pool().acquire().await?;
        write_expiry(&mut conn, post_id, expires_at).await
    }

    /// Removes every post whose expiry is strictly before `cutoff`, along with
    /// its comments, in one transaction. Returns the number of posts removed.
    pub async fn delete_expired(&self, cutoff: OffsetDateTime) -> ServiceResult<u64> {
        let cutoff = clock::to_epoch(cutoff);
        let mut tx = self.db.pool().begin().await?;

        // Comments go first so no comment outlives its post. Opening with a
        // write takes the write lock before anything is read.
        sqlx::query(
            "DELETE FROM comments \
             WHERE post_id IN (SELECT id FROM posts WHERE expires_at < ?)",
        )
        .bind(cutoff)
        .execute(&mut *tx)
        .await?;

        let deleted = sqlx::query("DELETE FROM posts WHERE expires_at < ?")
            .bind(cutoff)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(deleted)
    }
}

pub(crate) async fn write_expiry(
    conn: &mut SqliteConnection,
    post_id: i64,
    expires_at: OffsetDateTime,
) -> ServiceResult<()> {
    let expires_at = clock::to_epoch(expires_at);
    let result = sqlx::query("UPDATE posts SET expires_at = ?1 WHERE id = ?2 AND created_at <= ?1")
        .bind(expires_at)
        .bind(post_id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() > 0 {
        return Ok(());
    }

    let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM posts WHERE id = ?")
        .bind(post_id)
        .fetch_optional(&mut *conn)
        .await?;

    match exists {
        Some(_) => Err(ServiceError::validation(
            "expiry cannot precede the post's creation time",
        )),
        None => Err(ServiceError::NotFound("post")),
    }
}

pub(crate) fn post_from_row(row: &SqliteRow) -> ServiceResult<Post> {
    Ok(Post {
        id: row.get("id"),
        content: row.get("content"),
        author: row.get("author"),
        created_at: clock::from_epoch(row.get("created_at"))?,
        expires_at: clock::from_epoch(row.get("expires_at"))?,
    })
}

pub(crate) fn comment_from_row(row: &SqliteRow) -> ServiceResult<Comment> {
    Ok(Comment {
        id: row.get("id"),
        post_id: row.get("post_id"),
        content: row.get("content"),
        author: row.get("author"),
        created_at: clock::from_epoch(row.get("created_at"))?,
    })
}
