//! Async HTTP client for the rant like API, usable as a [`RemoteLikeTable`].

use std::time::Duration;

use anyhow::{Context, anyhow};
use rant_core::{
  id::{IdentityId, PostId},
  like::{LikeCount, LikeExists, LikeRecord},
  remote::RemoteLikeTable,
};
use reqwest::{Client, Response, StatusCode, Url};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
  #[error("request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("{method} {url} → {status}")]
  Status {
    method: &'static str,
    url:    Url,
    status: StatusCode,
  },
}

/// The like table behind a rant server.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpLikeTable {
  client: Client,
  base:   Url,
}

impl HttpLikeTable {
  pub fn new(base_url: &str) -> anyhow::Result<Self> {
    let base = Url::parse(base_url)
      .with_context(|| format!("invalid server url {base_url:?}"))?;
    if base.cannot_be_a_base() {
      return Err(anyhow!("server url {base_url:?} cannot carry a path"));
    }

    let client = Client::builder()
      .timeout(Duration::from_secs(10))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, base })
  }

  /// `base` with `segments` appended, each percent-encoded.
  fn url(&self, segments: &[&str]) -> Url {
    let mut url = self.base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
      path.pop_if_empty().extend(segments);
    }
    url
  }

  fn like_url(&self, post_id: &PostId, identity_id: &IdentityId) -> Url {
    self.url(&["rants", post_id.as_str(), "likes", identity_id.as_str()])
  }
}

fn check(
  method: &'static str,
  url: Url,
  resp: Response,
) -> Result<Response, ClientError> {
  let status = resp.status();
  if status.is_success() {
    Ok(resp)
  } else {
    Err(ClientError::Status { method, url, status })
  }
}

impl RemoteLikeTable for HttpLikeTable {
  type Error = ClientError;

  /// `GET /rants/:rant_id/likes/:identity_id`
  async fn exists(
    &self,
    post_id: &PostId,
    identity_id: &IdentityId,
  ) -> Result<bool, ClientError> {
    let url = self.like_url(post_id, identity_id);
    let resp = self.client.get(url.clone()).send().await?;
    let body: LikeExists = check("GET", url, resp)?.json().await?;
    Ok(body.liked)
  }

  /// `GET /rants/:rant_id/likes`
  async fn count(&self, post_id: &PostId) -> Result<u64, ClientError> {
    let url = self.url(&["rants", post_id.as_str(), "likes"]);
    let resp = self.client.get(url.clone()).send().await?;
    let body: LikeCount = check("GET", url, resp)?.json().await?;
    Ok(body.count)
  }

  /// `PUT /rants/:rant_id/likes/:identity_id` — the server assigns the
  /// timestamp, so `record.created_at` is not sent.
  async fn insert(&self, record: &LikeRecord) -> Result<(), ClientError> {
    let url = self.like_url(&record.post_id, &record.identity_id);
    let resp = self.client.put(url.clone()).send().await?;
    check("PUT", url, resp)?;
    Ok(())
  }

  /// `DELETE /rants/:rant_id/likes/:identity_id`
  async fn delete(
    &self,
    post_id: &PostId,
    identity_id: &IdentityId,
  ) -> Result<(), ClientError> {
    let url = self.like_url(post_id, identity_id);
    let resp = self.client.delete(url.clone()).send().await?;
    check("DELETE", url, resp)?;
    Ok(())
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use std::sync::Arc;

  use rant_core::remote::MemoryLikeTable;
  use tokio::net::TcpListener;

  use super::*;

  /// Serve the real API over an in-memory table on an ephemeral port.
  pub(crate) async fn serve() -> (String, Arc<MemoryLikeTable>) {
    let table = Arc::new(MemoryLikeTable::new());
    let app = rant_api::api_router(Arc::clone(&table));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    (format!("http://{addr}"), table)
  }

  fn post(id: &str) -> PostId { PostId::new(id).unwrap() }

  fn who(id: &str) -> IdentityId { IdentityId::new(id).unwrap() }

  #[test]
  fn url_segments_are_encoded() {
    let client = HttpLikeTable::new("http://localhost:8787/api/").unwrap();
    let url = client.like_url(&post("a b"), &who("x/y"));
    assert_eq!(url.as_str(), "http://localhost:8787/api/rants/a%20b/likes/x%2Fy");
  }

  #[test]
  fn rejects_unusable_base_url() {
    assert!(HttpLikeTable::new("not a url").is_err());
    assert!(HttpLikeTable::new("mailto:someone@example.com").is_err());
  }

  #[tokio::test]
  async fn speaks_the_api() {
    let (base, table) = serve().await;
    let client = HttpLikeTable::new(&base).unwrap();

    assert!(!client.exists(&post("r1"), &who("a")).await.unwrap());
    client.insert(&LikeRecord::new(post("r1"), who("a"))).await.unwrap();
    client.insert(&LikeRecord::new(post("r1"), who("a"))).await.unwrap();
    client.insert(&LikeRecord::new(post("r1"), who("b"))).await.unwrap();

    assert!(client.exists(&post("r1"), &who("a")).await.unwrap());
    assert_eq!(client.count(&post("r1")).await.unwrap(), 2);
    assert_eq!(table.count(&post("r1")).await.unwrap(), 2);

    client.delete(&post("r1"), &who("a")).await.unwrap();
    assert_eq!(client.count(&post("r1")).await.unwrap(), 1);
  }

  /// A URL nothing listens on.
  pub(crate) async fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
  }

  #[tokio::test]
  async fn unreachable_server_is_a_transport_error() {
    let client = HttpLikeTable::new(&dead_url().await).unwrap();
    assert!(matches!(
      client.count(&post("r1")).await,
      Err(ClientError::Http(_))
    ));
  }
}
