use std::fmt;
use std::time::Duration;

use crate::domain::ArticleRecord;

pub const DEFAULT_FRESHNESS_WINDOW: Duration = Duration::from_secs(60 * 60);

/// Why a headline request has to go to the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshReason {
    Forced,
    Empty,
    Expired,
}

impl fmt::Display for RefreshReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshReason::Forced => write!(f, "forced"),
            RefreshReason::Empty => write!(f, "cache empty"),
            RefreshReason::Expired => write!(f, "cache expired"),
        }
    }
}

/// Decides whether a cached snapshot can be served as-is.
///
/// The cache is expired when its oldest record is older than `window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessPolicy {
    pub window: Duration,
}

impl FreshnessPolicy {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    pub fn window_millis(&self) -> i64 {
        i64::try_from(self.window.as_millis()).unwrap_or(i64::MAX)
    }

    /// Minimum `retrieved_at` of the snapshot, or 0 when empty.
    pub fn oldest_retrieved_at(snapshot: &[ArticleRecord]) -> i64 {
        snapshot.iter().map(|r| r.retrieved_at).min().unwrap_or(0)
    }

    pub fn is_expired(&self, snapshot: &[ArticleRecord], now_millis: i64) -> bool {
        let oldest = Self::oldest_retrieved_at(snapshot);
        now_millis.saturating_sub(oldest) > self.window_millis()
    }

    /// `None` when the snapshot is fresh and no refresh was requested.
    pub fn refresh_reason(
        &self,
        snapshot: &[ArticleRecord],
        force_refresh: bool,
        now_millis: i64,
    ) -> Option<RefreshReason> {
        if force_refresh {
            Some(RefreshReason::Forced)
        } else if snapshot.is_empty() {
            Some(RefreshReason::Empty)
        } else if self.is_expired(snapshot, now_millis) {
            Some(RefreshReason::Expired)
        } else {
            None
        }
    }
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_FRESHNESS_WINDOW)
    }
}
