use thiserror::Error;

/// Failures of the per-channel coordination core. None of these are
/// process-fatal; they stay scoped to the channel that raised them.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Lookup for {0} returned nothing yet")]
    ResolutionIncomplete(String),

    #[error("No usable provider/locale pair for user {0}")]
    NoProviderConfigured(String),

    #[error("Invalid {0} message template: {1}")]
    BadTemplate(String, String),

    #[error("Fork-control command dispatch failed: {0}")]
    CommandDispatch(String),

    #[error("Bus publish failed, transcript dropped: {0}")]
    Publish(String),

    #[error("Key-value store failure: {0}")]
    Store(String),
}
