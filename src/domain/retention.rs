//! Expiry arithmetic for posts.
//!
//! A post lives for `window_days` after its most recent activity, where
//! activity is either its creation or its newest comment.

use time::{Duration, OffsetDateTime};

pub const DEFAULT_WINDOW_DAYS: u32 = 7;

/// Longest accepted window, roughly a century. Anything larger would push
/// expiries past the range `OffsetDateTime` can represent.
pub const MAX_WINDOW_DAYS: u32 = 36_500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    window_days: u32,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
        }
    }
}

impl RetentionPolicy {
    /// Builds a policy from a configured day count, falling back to the
    /// default window for values `set_window_days` rejects.
    pub fn with_window_days(days: i64) -> Self {
        let mut policy = Self::default();
        policy.set_window_days(days);
        policy
    }

    pub fn window_days(&self) -> u32 {
        self.window_days
    }

    pub fn window(&self) -> Duration {
        Duration::days(i64::from(self.window_days))
    }

    /// Applies a new window. Values outside `1..=MAX_WINDOW_DAYS` are
    /// rejected and the current window is kept; returns whether the value was
    /// accepted.
    pub fn set_window_days(&mut self, days: i64) -> bool {
        match u32::try_from(days) {
            Ok(days) if (1..=MAX_WINDOW_DAYS).contains(&days) => {
                self.window_days = days;
                true
            }
            _ => false,
        }
    }

    pub fn expires_at(
        &self,
        created_at: OffsetDateTime,
        latest_comment_at: Option<OffsetDateTime>,
    ) -> OffsetDateTime {
        let last_activity = match latest_comment_at {
            Some(commented_at) if commented_at > created_at => commented_at,
            _ => created_at,
        };
        last_activity + self.window()
    }
}
