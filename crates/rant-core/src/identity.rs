//! Pseudonymous client identity.

use std::sync::OnceLock;

use tracing::{info, warn};
use uuid::Uuid;

use crate::{id::IdentityId, storage::KeyValueStorage};

/// Storage key holding the generated identity.
pub const IDENTITY_KEY: &str = "anonymous_user_id";

/// Yields the identity of the current client. Must be deterministic for a
/// given installation.
pub trait IdentityProvider: Send + Sync {
  fn current_identity(&self) -> IdentityId;
}

/// An identity known up front (tests, server-side tooling).
#[derive(Debug, Clone)]
pub struct FixedIdentity(pub IdentityId);

impl IdentityProvider for FixedIdentity {
  fn current_identity(&self) -> IdentityId { self.0.clone() }
}

/// An identity generated on first use and persisted in local storage.
///
/// If storage cannot be read or written a fresh id is still produced and
/// remembered for the lifetime of this value, so the session stays
/// consistent even when persistence does not.
#[derive(Debug)]
pub struct StoredIdentity<S> {
  storage:  S,
  resolved: OnceLock<IdentityId>,
}

impl<S: KeyValueStorage> StoredIdentity<S> {
  pub fn new(storage: S) -> Self { Self { storage, resolved: OnceLock::new() } }

  fn load_or_create(&self) -> IdentityId {
    match self.storage.read(IDENTITY_KEY) {
      Ok(Some(stored)) => {
        if let Ok(id) = IdentityId::new(stored.trim()) {
          return id;
        }
        warn!("stored identity is blank, generating a new one");
      }
      Ok(None) => {}
      Err(e) => warn!(error = %e, "failed to read stored identity"),
    }

    let id = IdentityId::from(Uuid::new_v4());
    match self.storage.write(IDENTITY_KEY, id.as_str()) {
      Ok(()) => info!(identity = %id, "generated new anonymous identity"),
      Err(e) => warn!(error = %e, "failed to persist generated identity"),
    }
    id
  }
}

impl<S: KeyValueStorage> IdentityProvider for StoredIdentity<S> {
  fn current_identity(&self) -> IdentityId {
    self.resolved.get_or_init(|| self.load_or_create()).clone()
  }
}
