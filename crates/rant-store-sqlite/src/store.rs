//! [`SqliteLikeTable`] — the SQLite implementation of [`RemoteLikeTable`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use tracing::debug;
use uuid::Uuid;

use rant_core::{
  id::{IdentityId, PostId},
  like::LikeRecord,
  remote::RemoteLikeTable,
};

use crate::{
  Result,
  encode::{RawLike, encode_dt},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// The authoritative like table, backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteLikeTable {
  conn: tokio_rusqlite::Connection,
}

impl SqliteLikeTable {
  /// Open (or create) a table at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let table = Self { conn };
    table.init_schema().await?;
    Ok(table)
  }

  /// Open an in-memory table — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let table = Self { conn };
    table.init_schema().await?;
    Ok(table)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// The stored record for a pair, if any.
  pub async fn get(
    &self,
    post_id: &PostId,
    identity_id: &IdentityId,
  ) -> Result<Option<LikeRecord>> {
    let rant_id = post_id.as_str().to_owned();
    let user_id = identity_id.as_str().to_owned();

    let raw: Option<RawLike> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT rant_id, anonymous_user_id, created_at FROM likes
             WHERE rant_id = ?1 AND anonymous_user_id = ?2",
            rusqlite::params![rant_id, user_id],
            |row| {
              Ok(RawLike {
                rant_id:           row.get(0)?,
                anonymous_user_id: row.get(1)?,
                created_at:        row.get(2)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawLike::into_record).transpose()
  }

  /// Every post `identity_id` has liked, most recent first.
  pub async fn liked_by(&self, identity_id: &IdentityId) -> Result<Vec<PostId>> {
    let user_id = identity_id.as_str().to_owned();

    let ids: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT rant_id FROM likes
           WHERE anonymous_user_id = ?1
           ORDER BY created_at DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_id], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(ids.into_iter().map(PostId::new).collect::<rant_core::Result<_>>()?)
  }
}

// ─── RemoteLikeTable impl ────────────────────────────────────────────────────

impl RemoteLikeTable for SqliteLikeTable {
  type Error = crate::Error;

  async fn exists(&self, post_id: &PostId, identity_id: &IdentityId) -> Result<bool> {
    let rant_id = post_id.as_str().to_owned();
    let user_id = identity_id.as_str().to_owned();

    let found = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT 1 FROM likes WHERE rant_id = ?1 AND anonymous_user_id = ?2",
            rusqlite::params![rant_id, user_id],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false))
      })
      .await?;

    Ok(found)
  }

  async fn count(&self, post_id: &PostId) -> Result<u64> {
    let rant_id = post_id.as_str().to_owned();

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM likes WHERE rant_id = ?1",
          rusqlite::params![rant_id],
          |row| row.get(0),
        )?)
      })
      .await?;

    Ok(u64::try_from(count).unwrap_or(0))
  }

  async fn insert(&self, record: &LikeRecord) -> Result<()> {
    let like_id = Uuid::new_v4().hyphenated().to_string();
    let rant_id = record.post_id.as_str().to_owned();
    let user_id = record.identity_id.as_str().to_owned();
    let at_str  = encode_dt(record.created_at);

    let inserted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT INTO likes (like_id, rant_id, anonymous_user_id, created_at)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (rant_id, anonymous_user_id) DO NOTHING",
          rusqlite::params![like_id, rant_id, user_id, at_str],
        )?)
      })
      .await?;

    if inserted == 0 {
      debug!(rant_id = %record.post_id, "duplicate like ignored");
    }
    Ok(())
  }

  async fn delete(&self, post_id: &PostId, identity_id: &IdentityId) -> Result<()> {
    let rant_id = post_id.as_str().to_owned();
    let user_id = identity_id.as_str().to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM likes WHERE rant_id = ?1 AND anonymous_user_id = ?2",
          rusqlite::params![rant_id, user_id],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
