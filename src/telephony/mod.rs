//! Telephony transport interface
//!
//! The coordinator only ever sees two things from the telephony side: a
//! stream of [`TelephonyEvent`]s and the [`ForkControl`] trait for issuing
//! fork-control commands. [`EslTransport`] is the production implementation
//! speaking the FreeSWITCH event-socket link; its wire details stay here.

mod command;
mod esl;
mod event;

pub use command::ForkCommand;
pub use esl::EslTransport;
pub use event::{user_id_from_caller, TelephonyEvent};

use anyhow::Result;
use async_trait::async_trait;

/// Fork-control side of the telephony transport. Commands are opaque strings
/// built by [`ForkCommand`]; dispatch is fire-and-forget.
#[async_trait]
pub trait ForkControl: Send + Sync {
    async fn execute(&self, command: &str) -> Result<()>;
}
