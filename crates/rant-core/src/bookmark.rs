//! Local bookmarks: a persisted set of post ids the user saved for later.
//!
//! Bookmarks never leave the device. Storage follows the same corruption
//! policy as the like cache.

use crate::{cache::PersistedSet, id::PostId, storage::KeyValueStorage};

/// Storage key holding the bookmarked-post array.
pub const BOOKMARKS_KEY: &str = "bentoRant_bookmarks";

#[derive(Debug)]
pub struct Bookmarks<S> {
  set: PersistedSet<S>,
}

impl<S: KeyValueStorage> Bookmarks<S> {
  pub fn new(storage: S) -> Self {
    Self { set: PersistedSet::new(storage, BOOKMARKS_KEY) }
  }

  pub fn is_bookmarked(&self, post_id: &PostId) -> bool {
    self.set.contains(post_id)
  }

  /// Flip the bookmark for `post_id` and return the new state.
  pub fn toggle(&self, post_id: &PostId) -> bool { self.set.toggle(post_id) }

  /// Bookmarked posts in the order they were added.
  pub fn list(&self) -> Vec<PostId> { self.set.members() }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::storage::MemoryStorage;

  fn post(id: &str) -> PostId { PostId::new(id).unwrap() }

  #[test]
  fn toggle_flips_state() {
    let bookmarks = Bookmarks::new(MemoryStorage::new());

    assert!(bookmarks.toggle(&post("a")));
    assert!(bookmarks.toggle(&post("b")));
    assert!(bookmarks.is_bookmarked(&post("a")));
    assert_eq!(bookmarks.list(), vec![post("a"), post("b")]);

    assert!(!bookmarks.toggle(&post("a")));
    assert_eq!(bookmarks.list(), vec![post("b")]);
  }

  #[test]
  fn corrupted_bookmarks_read_as_empty() {
    let storage = MemoryStorage::new().with_entry(BOOKMARKS_KEY, "oops");
    let bookmarks = Bookmarks::new(storage);
    assert!(bookmarks.list().is_empty());
    assert!(bookmarks.toggle(&post("a")));
  }

  #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
  async fn concurrent_toggles_of_one_post_alternate() {
    let bookmarks = std::sync::Arc::new(Bookmarks::new(MemoryStorage::new()));

    let tasks: Vec<_> = (0..64)
      .map(|_| {
        let bookmarks = std::sync::Arc::clone(&bookmarks);
        tokio::spawn(async move { bookmarks.toggle(&post("a")) })
      })
      .collect();
    for task in tasks {
      task.await.unwrap();
    }

    assert!(!bookmarks.is_bookmarked(&post("a")));
    assert!(bookmarks.list().is_empty());
  }
}
