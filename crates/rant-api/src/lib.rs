//! JSON HTTP API over the authoritative like table.
//!
//! Exposes an axum [`Router`] backed by any [`RemoteLikeTable`]. TLS and
//! transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", rant_api::api_router(table.clone()))
//! ```

pub mod error;
pub mod likes;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::get};
use rant_core::remote::RemoteLikeTable;
use serde::Deserialize;

pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `RANT_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  /// SQLite database holding the like table.
  pub store_path: PathBuf,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the like API router for `table`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(table: Arc<S>) -> Router<()>
where
  S: RemoteLikeTable + 'static,
{
  Router::new()
    .route("/rants/{rant_id}/likes", get(likes::count::<S>))
    .route(
      "/rants/{rant_id}/likes/{identity_id}",
      get(likes::exists::<S>)
        .put(likes::insert::<S>)
        .delete(likes::delete::<S>),
    )
    .with_state(table)
}

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
  };
  use rant_core::{
    id::{IdentityId, PostId},
    like::{LikeCount, LikeExists, LikeRecord},
  };
  use rant_store_sqlite::SqliteLikeTable;
  use serde::de::DeserializeOwned;
  use thiserror::Error;
  use tower::ServiceExt as _;

  async fn table() -> Arc<SqliteLikeTable> {
    Arc::new(SqliteLikeTable::open_in_memory().await.unwrap())
  }

  async fn send<S: RemoteLikeTable + 'static>(
    table: Arc<S>,
    method: Method,
    uri: &str,
  ) -> axum::response::Response {
    let req = Request::builder()
      .method(method)
      .uri(uri)
      .body(Body::empty())
      .unwrap();
    api_router(table).oneshot(req).await.unwrap()
  }

  async fn json<T: DeserializeOwned>(resp: axum::response::Response) -> T {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  #[tokio::test]
  async fn count_starts_at_zero() {
    let resp = send(table().await, Method::GET, "/rants/r1/likes").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: LikeCount = json(resp).await;
    assert_eq!(body, LikeCount { rant_id: PostId::new("r1").unwrap(), count: 0 });
  }

  #[tokio::test]
  async fn put_is_idempotent() {
    let t = table().await;

    for _ in 0..2 {
      let resp = send(Arc::clone(&t), Method::PUT, "/rants/r1/likes/anon-a").await;
      assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }

    let body: LikeCount = json(send(Arc::clone(&t), Method::GET, "/rants/r1/likes").await).await;
    assert_eq!(body.count, 1);

    let body: LikeExists =
      json(send(Arc::clone(&t), Method::GET, "/rants/r1/likes/anon-a").await).await;
    assert!(body.liked);
    assert_eq!(body.identity_id, IdentityId::new("anon-a").unwrap());
  }

  #[tokio::test]
  async fn delete_unlikes() {
    let t = table().await;
    t.insert(&LikeRecord::new(
      PostId::new("r1").unwrap(),
      IdentityId::new("anon-a").unwrap(),
    ))
    .await
    .unwrap();

    let resp = send(Arc::clone(&t), Method::DELETE, "/rants/r1/likes/anon-a").await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let body: LikeExists =
      json(send(Arc::clone(&t), Method::GET, "/rants/r1/likes/anon-a").await).await;
    assert!(!body.liked);

    // Deleting again is still fine.
    let resp = send(t, Method::DELETE, "/rants/r1/likes/anon-a").await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
  }

  #[tokio::test]
  async fn blank_ids_are_rejected() {
    let resp = send(table().await, Method::PUT, "/rants/%20/likes/anon-a").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("empty"));
  }

  // ── Store failures ──────────────────────────────────────────────────────────

  #[derive(Debug, Error)]
  #[error("database is on fire")]
  struct Broken;

  struct BrokenTable;

  impl RemoteLikeTable for BrokenTable {
    type Error = Broken;

    async fn exists(&self, _: &PostId, _: &IdentityId) -> Result<bool, Broken> { Err(Broken) }

    async fn count(&self, _: &PostId) -> Result<u64, Broken> { Err(Broken) }

    async fn insert(&self, _: &LikeRecord) -> Result<(), Broken> { Err(Broken) }

    async fn delete(&self, _: &PostId, _: &IdentityId) -> Result<(), Broken> { Err(Broken) }
  }

  #[tokio::test]
  async fn store_errors_become_500() {
    let resp = send(Arc::new(BrokenTable), Method::GET, "/rants/r1/likes").await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: serde_json::Value = json(resp).await;
    assert_eq!(body["error"], "database is on fire");
  }
}
