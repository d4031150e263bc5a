use anyhow::Result;
use tracing::info;

use crate::app::posts::PostService;
use crate::infra::clock::{self, Clock};

/// Deletes every post that expired before `clock`'s current time, and its
/// comments. Returns the number of posts removed; on failure nothing is
/// deleted.
pub async fn sweep(posts: &PostService, clock: &dyn Clock) -> Result<u64> {
    let now = clock.now();
    let deleted = posts.delete_expired(now).await?;

    if deleted > 0 {
        info!(deleted, cutoff = %clock::format(now), "removed expired posts");
    }
    Ok(deleted)
}
