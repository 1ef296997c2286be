//! Application message bus
//!
//! Outbound: transcript updates in the conferencing application's envelope
//! format, fire-and-forget. Inbound: the meeting-creation and speech-locale
//! events that feed the session store.

pub mod client;
pub mod messages;

pub use client::BusClient;
pub use messages::{AppEvent, TranscriptEnvelope};

use anyhow::Result;
use async_trait::async_trait;

/// Outbound side of the bus. Publish failures are the caller's to log and
/// drop; transcripts are never re-queued.
#[async_trait]
pub trait TranscriptPublisher: Send + Sync {
    async fn publish_transcript(&self, envelope: &TranscriptEnvelope) -> Result<()>;
}
