//! The [`RemoteLikeTable`] trait and an in-memory implementation.
//!
//! The trait is implemented by authoritative backends (e.g.
//! `rant-store-sqlite`) and by clients that reach one over the network.
//! [`crate::status::LikeStatusStore`] depends on this abstraction only.

use std::{
  collections::BTreeMap,
  convert::Infallible,
  future::Future,
  sync::{Mutex, PoisonError},
};

use crate::{
  id::{IdentityId, PostId},
  like::LikeRecord,
};

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Authoritative record of likes: a uniqueness-constrained set of
/// `(post, identity)` pairs.
///
/// Errors are transport or authorisation failures. "Already liked" and
/// "not liked" are never errors: `insert` of an existing pair and `delete`
/// of a missing pair both succeed without effect.
///
/// All methods return `Send` futures so implementations can be driven from
/// spawned tokio tasks.
pub trait RemoteLikeTable: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Whether `identity_id` currently likes `post_id`.
  fn exists<'a>(
    &'a self,
    post_id: &'a PostId,
    identity_id: &'a IdentityId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Number of likes recorded for `post_id`.
  fn count<'a>(
    &'a self,
    post_id: &'a PostId,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;

  /// Record a like. A no-op if the pair is already present.
  fn insert<'a>(
    &'a self,
    record: &'a LikeRecord,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Remove a like. A no-op if the pair is absent.
  fn delete<'a>(
    &'a self,
    post_id: &'a PostId,
    identity_id: &'a IdentityId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

// ─── In-memory table ─────────────────────────────────────────────────────────

/// A [`RemoteLikeTable`] held entirely in process memory. Never fails.
#[derive(Debug, Default)]
pub struct MemoryLikeTable {
  records: Mutex<BTreeMap<(PostId, IdentityId), LikeRecord>>,
}

impl MemoryLikeTable {
  pub fn new() -> Self { Self::default() }

  fn with_records<T>(
    &self,
    f: impl FnOnce(&mut BTreeMap<(PostId, IdentityId), LikeRecord>) -> T,
  ) -> T {
    let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut records)
  }

  /// Every record for `post_id`, oldest first.
  pub fn records_for(&self, post_id: &PostId) -> Vec<LikeRecord> {
    let mut out: Vec<LikeRecord> = self.with_records(|records| {
      records
        .values()
        .filter(|r| &r.post_id == post_id)
        .cloned()
        .collect()
    });
    out.sort_by_key(|r| r.created_at);
    out
  }
}

impl RemoteLikeTable for MemoryLikeTable {
  type Error = Infallible;

  async fn exists(
    &self,
    post_id: &PostId,
    identity_id: &IdentityId,
  ) -> Result<bool, Infallible> {
    let key = (post_id.clone(), identity_id.clone());
    Ok(self.with_records(|records| records.contains_key(&key)))
  }

  async fn count(&self, post_id: &PostId) -> Result<u64, Infallible> {
    Ok(self.with_records(|records| {
      records.keys().filter(|(p, _)| p == post_id).count() as u64
    }))
  }

  async fn insert(&self, record: &LikeRecord) -> Result<(), Infallible> {
    let key = (record.post_id.clone(), record.identity_id.clone());
    self.with_records(|records| {
      records.entry(key).or_insert_with(|| record.clone());
    });
    Ok(())
  }

  async fn delete(
    &self,
    post_id: &PostId,
    identity_id: &IdentityId,
  ) -> Result<(), Infallible> {
    let key = (post_id.clone(), identity_id.clone());
    self.with_records(|records| records.remove(&key));
    Ok(())
  }
}
