//! Core types and trait definitions for the rant like-status engine.
//!
//! The centre of this crate is [`status::LikeStatusStore`], which keeps a
//! per-post `liked` flag and like count consistent between an optimistic
//! local cache and an authoritative [`remote::RemoteLikeTable`]. The crate
//! is free of HTTP and database dependencies; backends live in sibling
//! crates.

pub mod bookmark;
pub mod cache;
pub mod error;
pub mod id;
pub mod identity;
pub mod like;
pub mod mood;
pub mod rant;
pub mod remote;
pub mod status;
pub mod storage;

pub use error::{Error, Result};
