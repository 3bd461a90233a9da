//! Like records and the per-post view exposed to the UI.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{IdentityId, PostId};

// ─── Remote record ───────────────────────────────────────────────────────────

/// One like, as stored by the authoritative remote table.
///
/// At most one record exists per `(post_id, identity_id)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeRecord {
  pub post_id:     PostId,
  pub identity_id: IdentityId,
  pub created_at:  DateTime<Utc>,
}

impl LikeRecord {
  /// A record stamped with the current time.
  pub fn new(post_id: PostId, identity_id: IdentityId) -> Self {
    Self { post_id, identity_id, created_at: Utc::now() }
  }
}

// ─── Wire responses ──────────────────────────────────────────────────────────

/// Aggregate like count for a post, as served over HTTP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeCount {
  pub rant_id: PostId,
  pub count:   u64,
}

/// Whether one identity likes a post, as served over HTTP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeExists {
  pub rant_id:     PostId,
  pub identity_id: IdentityId,
  pub liked:       bool,
}

// ─── View ────────────────────────────────────────────────────────────────────

/// What a single post card displays: whether the current identity likes the
/// post, the aggregate count, and whether reconciliation is still running.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
pub struct LikeStatusView {
  pub liked:   bool,
  pub count:   u64,
  pub loading: bool,
}

impl LikeStatusView {
  /// The view before the remote has answered: `liked` comes from the local
  /// cache and the count is unknown.
  pub fn pending(cached_liked: bool) -> Self {
    Self { liked: cached_liked, count: 0, loading: true }
  }

  /// Apply an optimistic like/unlike. Returns `false` (and leaves the view
  /// untouched) when `liked` already matches.
  pub fn apply_like(&mut self, liked: bool) -> bool {
    if self.liked == liked {
      return false;
    }
    self.liked = liked;
    self.count = if liked {
      self.count.saturating_add(1)
    } else {
      self.count.saturating_sub(1)
    };
    true
  }
}

// ─── Sync phase ──────────────────────────────────────────────────────────────

/// Where a post's like status sits in its reconciliation lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
  /// A reconciliation is in flight; the view holds the local estimate.
  Loading,
  /// The last reconciliation completed; the view reflects the remote.
  Synced,
  /// The last reconciliation failed at least partially; some of the view
  /// is local-only truth.
  Degraded,
}

/// Result of a like/unlike from the caller's perspective. Neither variant is
/// an error: the optimistic state stays applied either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
  /// The remote accepted the write.
  Confirmed,
  /// The remote write failed; local state is ahead of the remote until the
  /// next reconciliation.
  Unconfirmed,
}

impl WriteOutcome {
  pub fn is_confirmed(self) -> bool { matches!(self, Self::Confirmed) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unlike_at_zero_stays_at_zero() {
    let mut view = LikeStatusView { liked: true, count: 0, loading: false };
    assert!(view.apply_like(false));
    assert_eq!(view.count, 0);
    assert!(!view.liked);

    assert!(!view.apply_like(false));
    assert_eq!(view.count, 0);
  }

  #[test]
  fn repeated_like_is_a_no_op() {
    let mut view = LikeStatusView { liked: false, count: 5, loading: false };
    assert!(view.apply_like(true));
    assert!(!view.apply_like(true));
    assert_eq!(view, LikeStatusView { liked: true, count: 6, loading: false });
  }
}
