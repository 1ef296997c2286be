//! Durable session mappings
//!
//! Three key families back the coordinator's decisions:
//! - voice conference → meeting id (written on meeting creation)
//! - user id → locale (written on speech-locale changes)
//! - user id → provider (written on speech-locale changes)
//!
//! All lookups are asynchronous and may legitimately return nothing; callers
//! treat an absent value as "resolution incomplete, do not act".

mod kv;
mod session;

pub use kv::{KvStore, MemoryKv, NatsKv};
pub use session::SessionStore;
