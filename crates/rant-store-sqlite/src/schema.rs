//! SQL schema for the like table.
//!
//! Executed at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per (rant, identity). The UNIQUE constraint is what makes a
-- repeated like a no-op.
CREATE TABLE IF NOT EXISTS likes (
    like_id           TEXT PRIMARY KEY,
    rant_id           TEXT NOT NULL,
    anonymous_user_id TEXT NOT NULL,
    created_at        TEXT NOT NULL,   -- RFC 3339 UTC
    UNIQUE (rant_id, anonymous_user_id)
);

CREATE INDEX IF NOT EXISTS likes_rant_idx ON likes(rant_id);

PRAGMA user_version = 1;
";
