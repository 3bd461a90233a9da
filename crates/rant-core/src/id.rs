//! Opaque identifiers for posts and anonymous identities.
//!
//! Both are non-empty strings. The backend decides their shape (UUIDs in
//! practice); this crate only guarantees they are never blank.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

macro_rules! opaque_id {
  ($(#[$meta:meta])* $name:ident) => {
    $(#[$meta])*
    #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
    #[serde(try_from = "String", into = "String")]
    pub struct $name(String);

    impl $name {
      /// Wrap `value`, rejecting empty or whitespace-only input.
      pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.trim().is_empty() {
          return Err(Error::EmptyId);
        }
        Ok(Self(value))
      }

      pub fn as_str(&self) -> &str { &self.0 }
    }

    impl TryFrom<String> for $name {
      type Error = Error;

      fn try_from(value: String) -> Result<Self> { Self::new(value) }
    }

    impl From<$name> for String {
      fn from(id: $name) -> Self { id.0 }
    }

    impl FromStr for $name {
      type Err = Error;

      fn from_str(s: &str) -> Result<Self> { Self::new(s) }
    }

    impl AsRef<str> for $name {
      fn as_ref(&self) -> &str { &self.0 }
    }

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
      }
    }
  };
}

opaque_id! {
  /// Identifier of a rant (the post being liked or bookmarked).
  PostId
}

opaque_id! {
  /// Pseudonymous, stable-per-installation identity used in place of
  /// user accounts.
  IdentityId
}

impl From<uuid::Uuid> for IdentityId {
  fn from(id: uuid::Uuid) -> Self { Self(id.hyphenated().to_string()) }
}
