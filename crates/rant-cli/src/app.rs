//! Command implementations.

use std::{fmt, path::Path, sync::Arc};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rant_core::{
  bookmark::Bookmarks,
  cache::PersistedSet,
  id::{IdentityId, PostId},
  identity::{FixedIdentity, IdentityProvider, StoredIdentity},
  like::{LikeStatusView, Phase, WriteOutcome},
  rant::Rant,
  status::LikeStatusStore,
  storage::FileStorage,
};

use crate::client::HttpLikeTable;

type Store = LikeStatusStore<HttpLikeTable, PersistedSet<Arc<FileStorage>>>;

pub struct App {
  storage:  Arc<FileStorage>,
  identity: IdentityId,
  url:      String,
}

/// What a like command ended up showing.
#[derive(Debug)]
pub struct LikeReport {
  pub rant:    PostId,
  pub view:    LikeStatusView,
  pub phase:   Phase,
  /// `None` when no write was needed.
  pub outcome: Option<WriteOutcome>,
}

impl App {
  pub fn open(url: String, data_dir: &Path) -> Result<Self> {
    let storage = Arc::new(
      FileStorage::open(data_dir)
        .with_context(|| format!("opening data directory {}", data_dir.display()))?,
    );
    let identity = StoredIdentity::new(Arc::clone(&storage)).current_identity();
    Ok(Self { storage, identity, url })
  }

  pub fn identity(&self) -> &IdentityId { &self.identity }

  fn like_store(&self) -> Result<Store> {
    let remote = Arc::new(HttpLikeTable::new(&self.url)?);
    let cache = Arc::new(PersistedSet::liked_rants(Arc::clone(&self.storage)));
    Ok(LikeStatusStore::new(remote, cache, &FixedIdentity(self.identity.clone())))
  }

  fn bookmarks(&self) -> Bookmarks<Arc<FileStorage>> {
    Bookmarks::new(Arc::clone(&self.storage))
  }

  // ── Likes ─────────────────────────────────────────────────────────────────

  pub async fn status(&self, rant: PostId) -> Result<LikeReport> {
    let store = self.like_store()?;
    let status = store.initialize(rant);
    let view = status.reconciled().await;
    Ok(LikeReport {
      rant: status.post_id().clone(),
      view,
      phase: status.phase(),
      outcome: None,
    })
  }

  /// Like or unlike, skipping the write when the reconciled state already
  /// matches, as the post card does.
  pub async fn like(&self, rant: PostId, liked: bool) -> Result<LikeReport> {
    let store = self.like_store()?;
    let status = store.initialize(rant);
    let before = status.reconciled().await;

    let outcome = if before.liked == liked {
      None
    } else {
      Some(status.set_like_status(liked).await)
    };

    Ok(LikeReport {
      rant: status.post_id().clone(),
      view: status.view(),
      phase: status.phase(),
      outcome,
    })
  }

  // ── Cards ─────────────────────────────────────────────────────────────────

  /// Render a rant exported as JSON, with its live like state.
  pub async fn card(&self, path: &Path) -> Result<String> {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading rant file {}", path.display()))?;
    let rant: Rant = serde_json::from_str(&raw).context("parsing rant")?;

    let likes = self.status(rant.id.clone()).await?;
    let bookmarked = self.bookmarks().is_bookmarked(&rant.id);
    Ok(render_card(&rant, &likes, bookmarked, Utc::now()))
  }

  // ── Bookmarks ─────────────────────────────────────────────────────────────

  /// Flip the bookmark and return the new state.
  pub fn toggle_bookmark(&self, rant: &PostId) -> bool { self.bookmarks().toggle(rant) }

  pub fn list_bookmarks(&self) -> Vec<PostId> { self.bookmarks().list() }
}

impl LikeReport {
  fn heart(&self) -> String {
    let heart = if self.view.liked { "♥" } else { "♡" };
    format!("{heart} {}", self.view.count)
  }

  fn notes(&self) -> String {
    let mut notes = String::new();
    if self.phase == Phase::Degraded {
      notes.push_str("  (server unreachable; showing local estimate)");
    }
    if self.outcome == Some(WriteOutcome::Unconfirmed) {
      notes.push_str("  (not saved yet; will reconcile on next load)");
    }
    notes
  }
}

impl fmt::Display for LikeReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}  {}{}", self.rant, self.heart(), self.notes())
  }
}

fn render_card(
  rant: &Rant,
  likes: &LikeReport,
  bookmarked: bool,
  now: DateTime<Utc>,
) -> String {
  let mut header = format!(
    "{} {}  ·  {}",
    rant.mood.unicode_emoji(),
    rant.mood.label(),
    rant.author_tag()
  );
  if rant.is_new(now) {
    header.push_str("  [new]");
  }

  let mut footer = format!("{}  💬 {}", likes.heart(), rant.comments);
  if bookmarked {
    footer.push_str("  🔖");
  }
  footer.push_str(&likes.notes());

  format!("{header}\n{}\n{footer}", rant.content)
}

#[cfg(test)]
mod tests {
  use chrono::Duration;
  use rant_core::{like::LikeRecord, mood::Mood, remote::RemoteLikeTable};
  use tempfile::TempDir;

  use super::*;
  use crate::client::tests::{dead_url, serve};

  fn post(id: &str) -> PostId { PostId::new(id).unwrap() }

  fn who(id: &str) -> IdentityId { IdentityId::new(id).unwrap() }

  #[tokio::test]
  async fn like_then_unlike_through_the_server() {
    let (url, table) = serve().await;
    table.insert(&LikeRecord::new(post("r1"), who("other"))).await.unwrap();
    let dir = TempDir::new().unwrap();
    let app = App::open(url, dir.path()).unwrap();

    let report = app.like(post("r1"), true).await.unwrap();
    assert_eq!(report.view, LikeStatusView { liked: true, count: 2, loading: false });
    assert_eq!(report.outcome, Some(WriteOutcome::Confirmed));
    assert!(table.exists(&post("r1"), app.identity()).await.unwrap());
    assert_eq!(report.to_string(), "r1  ♥ 2");

    let report = app.like(post("r1"), false).await.unwrap();
    assert_eq!(report.view, LikeStatusView { liked: false, count: 1, loading: false });
    assert!(!table.exists(&post("r1"), app.identity()).await.unwrap());
  }

  #[tokio::test]
  async fn redundant_like_skips_the_write() {
    let (url, table) = serve().await;
    let dir = TempDir::new().unwrap();
    let app = App::open(url, dir.path()).unwrap();
    table.insert(&LikeRecord::new(post("r1"), app.identity().clone())).await.unwrap();

    let report = app.like(post("r1"), true).await.unwrap();
    assert_eq!(report.outcome, None);
    assert_eq!(report.view, LikeStatusView { liked: true, count: 1, loading: false });
    assert_eq!(report.phase, Phase::Synced);
  }

  #[tokio::test]
  async fn unreachable_server_reports_estimate_and_unsaved_write() {
    let dir = TempDir::new().unwrap();
    let app = App::open(dead_url().await, dir.path()).unwrap();

    let report = app.like(post("r1"), true).await.unwrap();
    assert_eq!(report.phase, Phase::Degraded);
    assert_eq!(report.outcome, Some(WriteOutcome::Unconfirmed));
    assert!(report.view.liked);

    let line = report.to_string();
    assert!(line.contains("server unreachable"), "{line}");
    assert!(line.contains("not saved yet"), "{line}");

    // The optimistic like survives in the local cache.
    assert!(app.status(post("r1")).await.unwrap().view.liked);
  }

  #[tokio::test]
  async fn identity_is_stable_across_opens() {
    let dir = TempDir::new().unwrap();
    let first = App::open(dead_url().await, dir.path()).unwrap();
    let second = App::open(dead_url().await, dir.path()).unwrap();
    assert_eq!(first.identity(), second.identity());
  }

  #[test]
  fn bookmarks_toggle_and_list() {
    let dir = TempDir::new().unwrap();
    let app = App::open("http://localhost:8787".into(), dir.path()).unwrap();

    assert!(app.toggle_bookmark(&post("a")));
    assert!(app.toggle_bookmark(&post("b")));
    assert!(!app.toggle_bookmark(&post("a")));
    assert_eq!(app.list_bookmarks(), vec![post("b")]);
  }

  #[tokio::test]
  async fn card_shows_mood_author_and_live_likes() {
    let (url, table) = serve().await;
    table.insert(&LikeRecord::new(post("r1"), who("other"))).await.unwrap();
    let dir = TempDir::new().unwrap();
    let app = App::open(url, dir.path()).unwrap();
    app.toggle_bookmark(&post("r1"));

    let file = dir.path().join("rant.json");
    std::fs::write(
      &file,
      r#"{"id": "r1", "content": "monday again", "mood": "tired", "likes": 0,
          "comments": 3, "created_at": "2024-05-01T12:00:00Z",
          "anonymous_user_id": "anon-4f2c9a"}"#,
    )
    .unwrap();

    let card = app.card(&file).await.unwrap();
    assert_eq!(card, "😩 Tired  ·  Anonymous C9A\nmonday again\n♡ 1  💬 3  🔖");
  }

  #[test]
  fn fresh_rants_are_badged_new() {
    let now = Utc::now();
    let rant = Rant {
      id: post("r1"),
      content: "hi".into(),
      mood: Mood::Happy,
      likes: 0,
      comments: 0,
      created_at: now - Duration::seconds(30),
      anonymous_user_id: String::new(),
      is_optimistic: false,
    };
    let likes = LikeReport {
      rant: post("r1"),
      view: LikeStatusView { liked: true, count: 4, loading: false },
      phase: Phase::Synced,
      outcome: None,
    };

    assert_eq!(
      render_card(&rant, &likes, false, now),
      "😊 Happy  ·  Anonymous ???  [new]\nhi\n♥ 4  💬 0"
    );
  }
}
