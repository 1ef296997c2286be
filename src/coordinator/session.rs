use super::filter::TranscriptFilter;

/// Fork lifecycle for one telephony channel. Transitions are monotonic:
/// Idle → Active → StopRequested → Idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForkState {
    /// No fork running, no stop pending
    Idle,
    /// Fork running
    Active,
    /// A stop was requested once; the confirming second request (or a final
    /// transcript) issues the actual stop command
    StopRequested,
}

/// Per-channel coordinator record. Exclusively owned by the coordinator and
/// only ever mutated under its own lock.
pub struct ChannelSession {
    pub user_id: String,
    /// Provider serving the running fork, fixed when the start command goes out
    pub provider: String,
    pub fork_state: ForkState,
    /// Transcript dedupe state, scoped to this channel
    pub filter: TranscriptFilter,
    /// Bumped on every transition so the stop-grace timer can tell whether
    /// the state it armed against has since moved on
    pub generation: u64,
}

impl ChannelSession {
    pub fn new(user_id: &str, provider: &str, filter: TranscriptFilter) -> Self {
        Self {
            user_id: user_id.to_string(),
            provider: provider.to_string(),
            fork_state: ForkState::Idle,
            filter,
            generation: 0,
        }
    }

    pub fn transition(&mut self, next: ForkState) {
        self.fork_state = next;
        self.generation += 1;
    }
}
