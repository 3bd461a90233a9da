//! [`LikeStatusStore`] — optimistic like state reconciled against the remote.
//!
//! Each post card gets a [`LikeStatus`] from [`LikeStatusStore::initialize`].
//! The view starts from the local cache, a spawned reconciliation replaces
//! it with the remote's answer, and [`LikeStatus::set_like_status`] applies
//! user actions optimistically before the remote write is issued.
//!
//! Two counters order the paths that mutate a view:
//!
//! - `version` is bumped by every write. A reconciliation remembers the
//!   version it started under. If a write landed in the meantime it keeps
//!   the written `liked` and only rebases the count, so a slow response
//!   never reverts a newer user action.
//! - `epoch` is bumped by every reconciliation. Only the newest one may
//!   apply its result, so overlapping refreshes converge.

use std::sync::{
  Arc, Mutex, MutexGuard, PoisonError,
  atomic::{AtomicBool, Ordering},
};

use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, warn};

use crate::{
  cache::LikeCache,
  id::{IdentityId, PostId},
  identity::IdentityProvider,
  like::{LikeRecord, LikeStatusView, Phase, WriteOutcome},
  remote::RemoteLikeTable,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// Process-wide entry point: the remote table, the local like cache, and the
/// identity likes are recorded under.
///
/// Cloning is cheap; all parts are shared.
pub struct LikeStatusStore<R, C> {
  remote:   Arc<R>,
  cache:    Arc<C>,
  identity: IdentityId,
}

impl<R, C> Clone for LikeStatusStore<R, C> {
  fn clone(&self) -> Self {
    Self {
      remote:   Arc::clone(&self.remote),
      cache:    Arc::clone(&self.cache),
      identity: self.identity.clone(),
    }
  }
}

impl<R, C> LikeStatusStore<R, C>
where
  R: RemoteLikeTable + 'static,
  C: LikeCache + 'static,
{
  /// Resolve the identity once; it is stable for the installation.
  pub fn new(remote: Arc<R>, cache: Arc<C>, identity: &impl IdentityProvider) -> Self {
    Self { remote, cache, identity: identity.current_identity() }
  }

  pub fn identity(&self) -> &IdentityId { &self.identity }

  pub fn cache(&self) -> &C { &self.cache }

  /// Start tracking `post_id`.
  ///
  /// The returned view is immediately usable: `liked` comes from the local
  /// cache and `loading` is `true`. Reconciliation with the remote runs on
  /// a spawned task, so this must be called from within a tokio runtime.
  pub fn initialize(&self, post_id: PostId) -> LikeStatus<R, C> {
    let cached = self.cache.contains(&post_id);
    let (view, _) = watch::channel(LikeStatusView::pending(cached));

    let status = LikeStatus {
      shared: Arc::new(Shared {
        post_id,
        identity: self.identity.clone(),
        remote: Arc::clone(&self.remote),
        cache: Arc::clone(&self.cache),
        sync: Mutex::new(SyncState { version: 0, epoch: 0, phase: Phase::Loading }),
        cached: Mutex::new(Stamp::default()),
        view,
        disposed: AtomicBool::new(false),
      }),
      task:   Mutex::new(None),
    };
    status.spawn_reconcile();
    status
  }
}

// ─── Per-post handle ─────────────────────────────────────────────────────────

/// Like state for one post, owned by whatever displays that post.
///
/// Dropping the handle disposes it: a pending reconciliation is aborted and,
/// if it resumes anyway, mutates nothing.
pub struct LikeStatus<R, C> {
  shared: Arc<Shared<R, C>>,
  task:   Mutex<Option<JoinHandle<()>>>,
}

impl<R, C> LikeStatus<R, C>
where
  R: RemoteLikeTable + 'static,
  C: LikeCache + 'static,
{
  pub fn post_id(&self) -> &PostId { &self.shared.post_id }

  /// Snapshot of the current view.
  pub fn view(&self) -> LikeStatusView { *self.shared.view.borrow() }

  /// A receiver that observes every change to the view.
  pub fn subscribe(&self) -> watch::Receiver<LikeStatusView> {
    self.shared.view.subscribe()
  }

  pub fn phase(&self) -> Phase { self.shared.lock().phase }

  /// Wait until no reconciliation is pending and return the view.
  pub async fn reconciled(&self) -> LikeStatusView {
    let mut rx = self.shared.view.subscribe();
    match rx.wait_for(|v| !v.loading).await {
      Ok(view) => *view,
      // The sender lives in `shared`, which we hold; unreachable in practice.
      Err(_) => self.view(),
    }
  }

  /// Reconcile with the remote again and wait for the result.
  ///
  /// This is the recovery path after a [`WriteOutcome::Unconfirmed`] write.
  pub async fn refresh(&self) -> LikeStatusView {
    self.spawn_reconcile();
    self.reconciled().await
  }

  /// Like or unlike the post.
  ///
  /// The view and local cache are updated before the remote write starts.
  /// A request matching the displayed state leaves the view untouched but
  /// still writes to the remote. Remote failures are logged, never rolled
  /// back, and reported as [`WriteOutcome::Unconfirmed`].
  pub async fn set_like_status(&self, liked: bool) -> WriteOutcome {
    let shared = &self.shared;
    let stamp = {
      let mut sync = shared.lock();
      sync.version += 1;
      shared.view.send_if_modified(|view| view.apply_like(liked));
      Stamp { version: sync.version, reconciled: false }
    };
    shared.store_cached(stamp, liked);

    let result = if liked {
      let record = LikeRecord::new(shared.post_id.clone(), shared.identity.clone());
      shared.remote.insert(&record).await
    } else {
      shared.remote.delete(&shared.post_id, &shared.identity).await
    };

    match result {
      Ok(()) => WriteOutcome::Confirmed,
      Err(e) => {
        warn!(
          rant_id = %shared.post_id,
          liked,
          error = %e,
          "remote like write failed; local state is ahead of the remote"
        );
        WriteOutcome::Unconfirmed
      }
    }
  }

  fn spawn_reconcile(&self) {
    let ticket = self.shared.begin_reconcile();
    let shared = Arc::clone(&self.shared);
    let handle = tokio::spawn(async move { shared.reconcile(ticket).await });

    let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
    // A superseded reconciliation could not apply its result anyway.
    if let Some(previous) = task.replace(handle) {
      previous.abort();
    }
  }
}

impl<R, C> Drop for LikeStatus<R, C> {
  fn drop(&mut self) {
    {
      // Taken so disposal cannot land between a reconciliation's checks and
      // its writes.
      let _sync = self.shared.lock();
      let _cached = self.shared.lock_cached();
      self.shared.disposed.store(true, Ordering::Release);
    }
    let task = self.task.get_mut().unwrap_or_else(PoisonError::into_inner);
    if let Some(task) = task.take() {
      task.abort();
    }
  }
}

// ─── Shared state ────────────────────────────────────────────────────────────

struct Shared<R, C> {
  post_id:  PostId,
  identity: IdentityId,
  remote:   Arc<R>,
  cache:    Arc<C>,
  sync:     Mutex<SyncState>,
  /// Newest cache write so far; older ones are skipped.
  cached:   Mutex<Stamp>,
  view:     watch::Sender<LikeStatusView>,
  disposed: AtomicBool,
}

struct SyncState {
  /// Bumped by every write.
  version: u64,
  /// Bumped by every reconciliation.
  epoch:   u64,
  phase:   Phase,
}

/// What a reconciliation saw when it started.
#[derive(Debug, Clone, Copy)]
struct Ticket {
  version: u64,
  epoch:   u64,
}

/// Orders writes to the local cache. A reconciliation outranks the write it
/// started after.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
struct Stamp {
  version:    u64,
  reconciled: bool,
}

impl<R, C> Shared<R, C> {
  fn lock(&self) -> MutexGuard<'_, SyncState> {
    self.sync.lock().unwrap_or_else(PoisonError::into_inner)
  }

  fn lock_cached(&self) -> MutexGuard<'_, Stamp> {
    self.cached.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl<R, C> Shared<R, C>
where
  R: RemoteLikeTable,
  C: LikeCache,
{
  /// Write `liked` to the local cache unless a newer stamp got there first
  /// or the handle was disposed. Returns whether membership changed.
  ///
  /// Runs outside `sync`; the cache may block on storage.
  fn store_cached(&self, stamp: Stamp, liked: bool) -> bool {
    let mut cached = self.lock_cached();
    if self.disposed.load(Ordering::Acquire) || stamp < *cached {
      return false;
    }
    *cached = stamp;
    self.cache.set(&self.post_id, liked)
  }

  fn begin_reconcile(&self) -> Ticket {
    let mut sync = self.lock();
    sync.epoch += 1;
    sync.phase = Phase::Loading;
    self.view.send_if_modified(|view| !std::mem::replace(&mut view.loading, true));
    Ticket { version: sync.version, epoch: sync.epoch }
  }

  async fn reconcile(&self, ticket: Ticket) {
    let (exists, count) = tokio::join!(
      self.remote.exists(&self.post_id, &self.identity),
      self.remote.count(&self.post_id),
    );

    let liked = exists
      .inspect_err(|e| {
        warn!(rant_id = %self.post_id, error = %e, "failed to fetch like status")
      })
      .ok();
    let count = count
      .inspect_err(|e| {
        warn!(rant_id = %self.post_id, error = %e, "failed to fetch like count")
      })
      .ok();

    self.finish(ticket, liked, count);
  }

  /// Apply a reconciliation result, unless it was superseded or the handle
  /// was disposed. `None` fields failed and keep their local value.
  fn finish(&self, ticket: Ticket, liked: Option<bool>, count: Option<u64>) {
    {
      let mut sync = self.lock();
      if self.disposed.load(Ordering::Acquire) {
        debug!(rant_id = %self.post_id, "like status disposed; dropping reconciliation");
        return;
      }
      if sync.epoch != ticket.epoch {
        debug!(rant_id = %self.post_id, "reconciliation superseded by a newer one");
        return;
      }

      sync.phase = if liked.is_some() && count.is_some() {
        Phase::Synced
      } else {
        Phase::Degraded
      };

      if sync.version != ticket.version {
        // Keep the optimistic `liked`, but rebase the count on everyone
        // else's likes as the remote reported them.
        debug!(
          rant_id = %self.post_id,
          "local write landed during reconciliation; keeping optimistic state"
        );
        self.view.send_modify(|view| {
          if let (Some(remote_liked), Some(count)) = (liked, count) {
            let others = count.saturating_sub(u64::from(remote_liked));
            view.count = others + u64::from(view.liked);
          }
          view.loading = false;
        });
        return;
      }

      self.view.send_modify(|view| {
        if let Some(liked) = liked {
          view.liked = liked;
        }
        if let Some(count) = count {
          view.count = count;
        }
        view.loading = false;
      });
    }

    let stamp = Stamp { version: ticket.version, reconciled: true };
    if let Some(liked) = liked
      && self.store_cached(stamp, liked)
    {
      debug!(rant_id = %self.post_id, liked, "corrected local like cache from remote");
    }

    debug!(rant_id = %self.post_id, ?liked, ?count, "like status reconciled");
  }
}
