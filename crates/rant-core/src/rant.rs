//! Rant — a short, anonymous, mood-tagged post.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{id::PostId, mood::Mood};

/// Seconds during which a rant is badged as new.
pub const NEW_WINDOW_SECS: i64 = 120;

/// Seconds during which a rant is assumed to still be an unconfirmed local
/// insert.
pub const OPTIMISTIC_WINDOW_SECS: i64 = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rant {
  pub id:                PostId,
  pub content:           String,
  #[serde(default, deserialize_with = "crate::mood::deserialize_lossy")]
  pub mood:              Mood,
  /// Denormalised like count as of when the rant was fetched.
  pub likes:             u64,
  pub comments:          u64,
  pub created_at:        DateTime<Utc>,
  /// Author identity. Old rows may carry an empty one.
  #[serde(default)]
  pub anonymous_user_id: String,
  /// Set on rants inserted locally before the server confirmed them.
  #[serde(default)]
  pub is_optimistic:     bool,
}

impl Rant {
  pub fn age(&self, now: DateTime<Utc>) -> Duration { now - self.created_at }

  pub fn is_new(&self, now: DateTime<Utc>) -> bool {
    self.age(now) < Duration::seconds(NEW_WINDOW_SECS)
  }

  pub fn looks_optimistic(&self, now: DateTime<Utc>) -> bool {
    self.is_optimistic || self.age(now) < Duration::seconds(OPTIMISTIC_WINDOW_SECS)
  }

  /// Short public tag for the author: "Anonymous" plus the last three
  /// characters of their identity, uppercased, or "???" when there is none.
  pub fn author_tag(&self) -> String {
    let id = self.anonymous_user_id.trim();
    if id.is_empty() {
      return "Anonymous ???".to_string();
    }
    let tail: Vec<char> = id.chars().rev().take(3).collect();
    let tail: String = tail.into_iter().rev().collect();
    format!("Anonymous {}", tail.to_uppercase())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn rant(created_at: DateTime<Utc>, author: &str) -> Rant {
    Rant {
      id: PostId::new("rant-1").unwrap(),
      content: "the bus was late again".into(),
      mood: Mood::Angry,
      likes: 0,
      comments: 0,
      created_at,
      anonymous_user_id: author.into(),
      is_optimistic: false,
    }
  }

  #[test]
  fn newness_windows() {
    let now = Utc::now();
    assert!(rant(now - Duration::seconds(1), "a").looks_optimistic(now));
    assert!(rant(now - Duration::seconds(60), "a").is_new(now));
    assert!(!rant(now - Duration::seconds(60), "a").looks_optimistic(now));
    assert!(!rant(now - Duration::seconds(300), "a").is_new(now));

    let mut flagged = rant(now - Duration::seconds(300), "a");
    flagged.is_optimistic = true;
    assert!(flagged.looks_optimistic(now));
  }

  #[test]
  fn author_tag_uses_identity_tail() {
    assert_eq!(rant(Utc::now(), "anon-4f2c9a").author_tag(), "Anonymous C9A");
    assert_eq!(rant(Utc::now(), "ab").author_tag(), "Anonymous AB");
    assert_eq!(rant(Utc::now(), "").author_tag(), "Anonymous ???");
  }

  #[test]
  fn missing_optimistic_flag_defaults_false() {
    let json = r#"{
      "id": "r1", "content": "ugh", "mood": "tired", "likes": 3,
      "comments": 1, "created_at": "2024-05-01T12:00:00Z",
      "anonymous_user_id": "anon-1"
    }"#;
    let parsed: Rant = serde_json::from_str(json).unwrap();
    assert!(!parsed.is_optimistic);
    assert_eq!(parsed.mood, Mood::Tired);
  }

  #[test]
  fn legacy_rows_still_parse() {
    let json = r#"{
      "id": "r2", "content": "new job!", "mood": "Excited", "likes": 0,
      "comments": 0, "created_at": "2024-05-01T12:00:00Z",
      "anonymous_user_id": ""
    }"#;
    let parsed: Rant = serde_json::from_str(json).unwrap();
    assert_eq!(parsed.mood, Mood::Neutral);
    assert_eq!(parsed.author_tag(), "Anonymous ???");

    let json = r#"{
      "id": "r3", "content": "meh", "likes": 0, "comments": 0,
      "created_at": "2024-05-01T12:00:00Z", "mood": null
    }"#;
    let parsed: Rant = serde_json::from_str(json).unwrap();
    assert_eq!(parsed.mood, Mood::Neutral);
    assert!(parsed.anonymous_user_id.is_empty());
  }
}
