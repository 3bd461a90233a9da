//! Moods: the emotional tag attached to every rant.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};

use crate::Error;

#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum Mood {
  Sad,
  Crying,
  Happy,
  #[default]
  Neutral,
  Angry,
  EyeRoll,
  Heartbroken,
  MindBlown,
  Speechless,
  Confused,
  Tired,
  Nervous,
  Smiling,
  Laughing,
  Celebratory,
  Confident,
  Loved,
}

impl Mood {
  pub const ALL: [Mood; 17] = [
    Mood::Sad,
    Mood::Crying,
    Mood::Happy,
    Mood::Neutral,
    Mood::Angry,
    Mood::EyeRoll,
    Mood::Heartbroken,
    Mood::MindBlown,
    Mood::Speechless,
    Mood::Confused,
    Mood::Tired,
    Mood::Nervous,
    Mood::Smiling,
    Mood::Laughing,
    Mood::Celebratory,
    Mood::Confident,
    Mood::Loved,
  ];

  /// The wire spelling; must match the serde renames above.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Sad => "sad",
      Self::Crying => "crying",
      Self::Happy => "happy",
      Self::Neutral => "neutral",
      Self::Angry => "angry",
      Self::EyeRoll => "eyeRoll",
      Self::Heartbroken => "heartbroken",
      Self::MindBlown => "mindBlown",
      Self::Speechless => "speechless",
      Self::Confused => "confused",
      Self::Tired => "tired",
      Self::Nervous => "nervous",
      Self::Smiling => "smiling",
      Self::Laughing => "laughing",
      Self::Celebratory => "celebratory",
      Self::Confident => "confident",
      Self::Loved => "loved",
    }
  }

  /// Human-readable label, e.g. "Mind Blown".
  pub fn label(self) -> &'static str {
    match self {
      Self::Sad => "Sad",
      Self::Crying => "Crying",
      Self::Happy => "Happy",
      Self::Neutral => "Neutral",
      Self::Angry => "Angry",
      Self::EyeRoll => "Eye Roll",
      Self::Heartbroken => "Heartbroken",
      Self::MindBlown => "Mind Blown",
      Self::Speechless => "Speechless",
      Self::Confused => "Confused",
      Self::Tired => "Tired",
      Self::Nervous => "Nervous",
      Self::Smiling => "Smiling",
      Self::Laughing => "Laughing",
      Self::Celebratory => "Celebratory",
      Self::Confident => "Confident",
      Self::Loved => "Loved",
    }
  }

  pub fn unicode_emoji(self) -> &'static str {
    match self {
      Self::Sad => "😞",
      Self::Crying => "😭",
      Self::Happy => "😊",
      Self::Neutral => "😐",
      Self::Angry => "😡",
      Self::EyeRoll => "🙄",
      Self::Heartbroken => "💔",
      Self::MindBlown => "🤯",
      Self::Speechless => "😶",
      Self::Confused => "😕",
      Self::Tired => "😩",
      Self::Nervous => "😬",
      Self::Smiling => "🙂",
      Self::Laughing => "😂",
      Self::Celebratory => "🎉",
      Self::Confident => "😎",
      Self::Loved => "🥰",
    }
  }

  /// Path of the animated emoji asset for this mood.
  pub fn emoji_path(self) -> String {
    format!("/assets/emojis/{}.gif", self.as_str())
  }

  /// Parse a stored mood, falling back to [`Mood::Neutral`] for anything
  /// unrecognised. Rows written by older clients carry moods that no longer
  /// exist.
  pub fn parse_lossy(s: &str) -> Self { s.parse().unwrap_or(Self::Neutral) }
}

impl FromStr for Mood {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Error> {
    Self::ALL
      .into_iter()
      .find(|m| m.as_str() == s)
      .ok_or_else(|| Error::UnknownMood(s.to_owned()))
  }
}

/// Serde adapter for stored rows: unknown or missing moods become
/// [`Mood::Neutral`] instead of failing the whole record.
pub fn deserialize_lossy<'de, D>(deserializer: D) -> Result<Mood, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = Option::<String>::deserialize(deserializer)?;
  Ok(raw.as_deref().map(Mood::parse_lossy).unwrap_or_default())
}

impl fmt::Display for Mood {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn as_str_matches_serde() {
    for mood in Mood::ALL {
      let json = serde_json::to_string(&mood).unwrap();
      assert_eq!(json, format!("\"{}\"", mood.as_str()));
      assert_eq!(mood.as_str().parse::<Mood>().unwrap(), mood);
    }
  }

  #[test]
  fn unknown_mood_falls_back_to_neutral() {
    assert!(matches!("Excited".parse::<Mood>(), Err(Error::UnknownMood(_))));
    assert_eq!(Mood::parse_lossy("Excited"), Mood::Neutral);
    assert_eq!(Mood::parse_lossy("mindBlown"), Mood::MindBlown);
  }

  #[test]
  fn emoji_lookup() {
    assert_eq!(Mood::EyeRoll.emoji_path(), "/assets/emojis/eyeRoll.gif");
    assert_eq!(Mood::Heartbroken.unicode_emoji(), "💔");
    assert_eq!(Mood::MindBlown.label(), "Mind Blown");
  }
}
