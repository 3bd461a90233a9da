//! The local, advisory set of liked posts.
//!
//! The set is persisted as one JSON array of post ids under a fixed storage
//! key. It is a cache, never a source of truth: unreadable or malformed
//! content is treated as empty and reset, and the remote always wins during
//! reconciliation.

use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};

use crate::{Result, id::PostId, storage::KeyValueStorage};

/// Storage key holding the liked-post array.
pub const LIKED_RANTS_KEY: &str = "liked_rants";

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Membership operations over a persisted set of post ids.
///
/// Implementations swallow storage failures (logging them); a cache must
/// never make a like action fail.
pub trait LikeCache: Send + Sync {
  fn contains(&self, post_id: &PostId) -> bool;

  /// Make `post_id` a member (or not). Returns whether membership changed.
  fn set(&self, post_id: &PostId, member: bool) -> bool;

  fn members(&self) -> Vec<PostId>;

  fn insert(&self, post_id: &PostId) -> bool { self.set(post_id, true) }

  fn remove(&self, post_id: &PostId) -> bool { self.set(post_id, false) }
}

// ─── PersistedSet ────────────────────────────────────────────────────────────

/// A set of post ids serialised as a JSON array under one storage key.
///
/// Every read-modify-write happens under a single mutex, so concurrent
/// updates to different posts never lose each other's entries. Use one
/// instance per key.
#[derive(Debug)]
pub struct PersistedSet<S> {
  storage: S,
  key:     String,
  lock:    Mutex<()>,
}

impl<S: KeyValueStorage> PersistedSet<S> {
  pub fn new(storage: S, key: impl Into<String>) -> Self {
    Self { storage, key: key.into(), lock: Mutex::new(()) }
  }

  /// The liked-rants cache over `storage`.
  pub fn liked_rants(storage: S) -> Self { Self::new(storage, LIKED_RANTS_KEY) }

  pub fn key(&self) -> &str { &self.key }

  pub fn contains(&self, post_id: &PostId) -> bool {
    let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
    self.load().contains(post_id)
  }

  pub fn set(&self, post_id: &PostId, member: bool) -> bool {
    let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
    let mut ids = self.load();
    let present = ids.contains(post_id);

    match (member, present) {
      (true, false) => ids.push(post_id.clone()),
      (false, true) => ids.retain(|id| id != post_id),
      _ => return false,
    }

    self.store(&ids);
    true
  }

  /// Flip membership of `post_id` in one read-modify-write and return the
  /// new membership.
  pub fn toggle(&self, post_id: &PostId) -> bool {
    let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
    let mut ids = self.load();

    let member = !ids.contains(post_id);
    if member {
      ids.push(post_id.clone());
    } else {
      ids.retain(|id| id != post_id);
    }

    self.store(&ids);
    member
  }

  pub fn members(&self) -> Vec<PostId> {
    let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
    self.load()
  }

  /// Read and decode the stored array. Callers must hold `lock`.
  fn load(&self) -> Vec<PostId> {
    let raw = match self.storage.read(&self.key) {
      Ok(Some(raw)) => raw,
      Ok(None) => return Vec::new(),
      Err(e) => {
        warn!(key = %self.key, error = %e, "local cache unreadable, treating as empty");
        return Vec::new();
      }
    };

    match decode(&raw) {
      Some(ids) => ids,
      None => {
        warn!(key = %self.key, "local cache is malformed, resetting");
        self.store(&[]);
        Vec::new()
      }
    }
  }

  /// Encode and write `ids`. Callers must hold `lock`.
  fn store(&self, ids: &[PostId]) {
    let encoded = match encode(ids) {
      Ok(encoded) => encoded,
      Err(e) => {
        warn!(key = %self.key, error = %e, "failed to encode local cache");
        return;
      }
    };
    match self.storage.write(&self.key, &encoded) {
      Ok(()) => debug!(key = %self.key, entries = ids.len(), "local cache written"),
      Err(e) => warn!(key = %self.key, error = %e, "failed to write local cache"),
    }
  }
}

fn encode(ids: &[PostId]) -> Result<String> { Ok(serde_json::to_string(ids)?) }

/// Parse a stored array. `None` means the content is malformed: it does not
/// start with `[` or is not an array of strings. Blank entries and
/// duplicates are dropped.
fn decode(raw: &str) -> Option<Vec<PostId>> {
  let trimmed = raw.trim();
  if !trimmed.starts_with('[') {
    return None;
  }
  let strings: Vec<String> = serde_json::from_str(trimmed).ok()?;

  let mut ids: Vec<PostId> = Vec::with_capacity(strings.len());
  for id in strings.into_iter().filter_map(|s| PostId::new(s).ok()) {
    if !ids.contains(&id) {
      ids.push(id);
    }
  }
  Some(ids)
}

impl<S: KeyValueStorage> LikeCache for PersistedSet<S> {
  fn contains(&self, post_id: &PostId) -> bool {
    PersistedSet::contains(self, post_id)
  }

  fn set(&self, post_id: &PostId, member: bool) -> bool {
    PersistedSet::set(self, post_id, member)
  }

  fn members(&self) -> Vec<PostId> { PersistedSet::members(self) }
}
