//! Conversions between domain types and the plain-text SQLite columns.
//!
//! Timestamps are RFC 3339 strings; ids are stored verbatim.

use chrono::{DateTime, Utc};
use rant_core::{
  id::{IdentityId, PostId},
  like::LikeRecord,
};

use crate::{Error, Result};

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// A `likes` row as read, before validation.
pub struct RawLike {
  pub rant_id:           String,
  pub anonymous_user_id: String,
  pub created_at:        String,
}

impl RawLike {
  pub fn into_record(self) -> Result<LikeRecord> {
    Ok(LikeRecord {
      post_id:     PostId::new(self.rant_id)?,
      identity_id: IdentityId::new(self.anonymous_user_id)?,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}
