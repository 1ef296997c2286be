//! Provider and locale resolution
//!
//! Maps a user to the speech provider serving them and that provider to a
//! concrete endpoint plus start/end message payloads.

mod resolver;

pub use resolver::{ProviderResolver, ResolvedProvider};
