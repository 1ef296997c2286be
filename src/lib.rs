pub mod bus;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod provider;
pub mod proxy;
pub mod store;
pub mod telephony;

pub use bus::{AppEvent, BusClient, TranscriptEnvelope, TranscriptPublisher};
pub use config::Config;
pub use coordinator::{Coordinator, ForkState, TranscriptFilter};
pub use error::Error;
pub use provider::{ProviderResolver, ResolvedProvider};
pub use store::{KvStore, MemoryKv, NatsKv, SessionStore};
pub use telephony::{EslTransport, ForkCommand, ForkControl, TelephonyEvent};
