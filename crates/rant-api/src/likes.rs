//! Handlers for the like table.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/rants/:rant_id/likes` | Aggregate count |
//! | `GET`    | `/rants/:rant_id/likes/:identity_id` | Whether that identity likes the rant |
//! | `PUT`    | `/rants/:rant_id/likes/:identity_id` | Idempotent like; 204 |
//! | `DELETE` | `/rants/:rant_id/likes/:identity_id` | Idempotent unlike; 204 |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use rant_core::{
  id::{IdentityId, PostId},
  like::{LikeCount, LikeExists, LikeRecord},
  remote::RemoteLikeTable,
};
use tracing::info;

use crate::error::ApiError;

fn parse_pair(rant_id: String, identity_id: String) -> Result<(PostId, IdentityId), ApiError> {
  Ok((PostId::new(rant_id)?, IdentityId::new(identity_id)?))
}

/// `GET /rants/:rant_id/likes`
pub async fn count<S: RemoteLikeTable>(
  State(table): State<Arc<S>>,
  Path(rant_id): Path<String>,
) -> Result<Json<LikeCount>, ApiError> {
  let rant_id = PostId::new(rant_id)?;
  let count = table.count(&rant_id).await.map_err(ApiError::store)?;
  Ok(Json(LikeCount { rant_id, count }))
}

/// `GET /rants/:rant_id/likes/:identity_id`
pub async fn exists<S: RemoteLikeTable>(
  State(table): State<Arc<S>>,
  Path((rant_id, identity_id)): Path<(String, String)>,
) -> Result<Json<LikeExists>, ApiError> {
  let (rant_id, identity_id) = parse_pair(rant_id, identity_id)?;
  let liked = table
    .exists(&rant_id, &identity_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(LikeExists { rant_id, identity_id, liked }))
}

/// `PUT /rants/:rant_id/likes/:identity_id` — the server stamps `created_at`.
pub async fn insert<S: RemoteLikeTable>(
  State(table): State<Arc<S>>,
  Path((rant_id, identity_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
  let (rant_id, identity_id) = parse_pair(rant_id, identity_id)?;
  let record = LikeRecord::new(rant_id, identity_id);
  table.insert(&record).await.map_err(ApiError::store)?;
  info!(rant_id = %record.post_id, "like recorded");
  Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /rants/:rant_id/likes/:identity_id`
pub async fn delete<S: RemoteLikeTable>(
  State(table): State<Arc<S>>,
  Path((rant_id, identity_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
  let (rant_id, identity_id) = parse_pair(rant_id, identity_id)?;
  table
    .delete(&rant_id, &identity_id)
    .await
    .map_err(ApiError::store)?;
  info!(rant_id = %rant_id, "like removed");
  Ok(StatusCode::NO_CONTENT)
}
