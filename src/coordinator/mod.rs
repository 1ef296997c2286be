//! Per-channel transcription session coordination
//!
//! This module provides the coordination core that reconciles three
//! independently arriving event streams into one decision per channel:
//! - telephony lifecycle events (answer, hangup, floor, talk/mute)
//! - key-value lookups (meeting mapping, per-user locale and provider)
//! - provider transcript callbacks
//!
//! Channels never block each other; events for the same channel serialize on
//! that channel's session lock.

mod coordinator;
mod filter;
mod router;
mod session;

pub use coordinator::Coordinator;
pub use filter::{FilteredTranscript, TranscriptFilter};
pub use router::dispatch;
pub use session::{ChannelSession, ForkState};
