use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use anyhow::Result;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::filter::TranscriptFilter;
use super::session::{ChannelSession, ForkState};
use crate::bus::{TranscriptEnvelope, TranscriptPublisher};
use crate::config::TranscriptionConfig;
use crate::error::Error;
use crate::provider::ProviderResolver;
use crate::store::SessionStore;
use crate::telephony::{user_id_from_caller, ForkCommand, ForkControl};

/// The per-channel transcription session coordinator.
///
/// Owns one [`ChannelSession`] per active channel. The map lock is only held
/// for entry access; all state transitions happen under the session's own
/// lock, so events for different channels proceed independently while events
/// for the same channel serialize.
pub struct Coordinator {
    sessions: RwLock<HashMap<String, Arc<Mutex<ChannelSession>>>>,
    resolver: ProviderResolver,
    store: Arc<SessionStore>,
    transport: Arc<dyn ForkControl>,
    publisher: Arc<dyn TranscriptPublisher>,
    include_partial_results: bool,
    stop_grace: Option<Duration>,
    weak: Weak<Coordinator>,
}

impl Coordinator {
    pub fn new(
        resolver: ProviderResolver,
        store: Arc<SessionStore>,
        transport: Arc<dyn ForkControl>,
        publisher: Arc<dyn TranscriptPublisher>,
        settings: &TranscriptionConfig,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            sessions: RwLock::new(HashMap::new()),
            resolver,
            store,
            transport,
            publisher,
            include_partial_results: settings.include_partial_results,
            stop_grace: settings.stop_grace(),
            weak: weak.clone(),
        })
    }

    /// Start forking a channel's audio to the user's resolved provider.
    ///
    /// Idempotent while the fork is running; a pending stop is cleared by a
    /// fresh start. Without a usable provider/locale pair this logs and does
    /// nothing.
    pub async fn start_fork(&self, channel_id: &str, user_id: &str) -> Result<()> {
        let resolved = match self.resolver.resolve(user_id).await {
            Ok(resolved) => resolved,
            Err(Error::NoProviderConfigured(_)) => {
                warn!("No provider set for {}, not transcribing", user_id);
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        // Built before the session record exists so a broken template never
        // leaves an entry behind.
        let payload = self.resolver.start_message(&resolved)?;

        let session = {
            let mut sessions = self.sessions.write().await;
            sessions
                .entry(channel_id.to_string())
                .or_insert_with(|| {
                    Arc::new(Mutex::new(ChannelSession::new(
                        user_id,
                        &resolved.provider,
                        TranscriptFilter::new(self.include_partial_results),
                    )))
                })
                .clone()
        };

        let mut session = session.lock().await;
        match session.fork_state {
            ForkState::StopRequested => {
                // The fork is still running; clearing the pending stop is
                // all a fresh start needs.
                info!("Clearing pending stop on channel {}", channel_id);
                session.transition(ForkState::Active);
            }
            ForkState::Active => {
                debug!("Fork already active on channel {}", channel_id);
            }
            ForkState::Idle => {
                let command = ForkCommand::Start {
                    channel_id,
                    server_url: &resolved.server_url,
                    sample_rate_khz: self.resolver.sample_rate_khz(),
                    payload: &payload,
                }
                .to_string();

                info!(
                    "Starting audio fork on channel {} to {} ({}, {})",
                    channel_id, resolved.server_url, resolved.provider, resolved.locale
                );
                session.provider = resolved.provider.clone();
                self.dispatch(&command).await;
                session.transition(ForkState::Active);
            }
        }

        Ok(())
    }

    /// Request a stop. The first request only marks the session; the second
    /// request, a final transcript, or the stop-grace timer issues the
    /// command. The debounce keeps a hangup from cutting off a final result
    /// still in flight.
    pub async fn stop_fork(&self, channel_id: &str) -> Result<()> {
        let Some(session) = self.session(channel_id).await else {
            debug!("Stop requested for unknown channel {}", channel_id);
            return Ok(());
        };

        let pending = {
            let mut guard = session.lock().await;
            match guard.fork_state {
                ForkState::Idle => return Ok(()),
                ForkState::Active => {
                    guard.transition(ForkState::StopRequested);
                    debug!(
                        "Stop pending on channel {}, awaiting final result",
                        channel_id
                    );
                    self.arm_stop_grace(channel_id, guard.generation);
                    return Ok(());
                }
                ForkState::StopRequested => true,
            }
        };

        if pending {
            self.issue_stop(channel_id, &session).await;
        }
        Ok(())
    }

    /// A final transcript confirms a pending stop.
    pub async fn on_transcript_final(&self, channel_id: &str) {
        let Some(session) = self.session(channel_id).await else {
            return;
        };

        let pending = session.lock().await.fork_state == ForkState::StopRequested;
        if pending {
            self.issue_stop(channel_id, &session).await;
        }
    }

    pub async fn on_hangup(&self, channel_id: &str) -> Result<()> {
        self.stop_fork(channel_id).await
    }

    /// Full provider-callback path: resolve the meeting, filter, publish,
    /// and feed the stop-on-final side effect back into the state machine.
    pub async fn handle_transcript(
        &self,
        channel_id: &str,
        voice_conf: &str,
        caller_username: &str,
        body: &str,
    ) -> Result<()> {
        let Some(meeting_id) = self.store.meeting_for_voice_conf(voice_conf).await? else {
            debug!(
                "{}",
                Error::ResolutionIncomplete(format!("voiceToMeeting {voice_conf}"))
            );
            return Ok(());
        };

        let user_id = user_id_from_caller(caller_username);
        let stored_locale = self.store.user_locale(&user_id).await?;

        let forwarded = match self.session(channel_id).await {
            Some(session) => session.lock().await.filter.apply_raw(body),
            // Late callbacks can outlive the session record; judge them
            // without dedupe history.
            None => TranscriptFilter::new(self.include_partial_results).apply_raw(body),
        };

        let Some(transcript) = forwarded else {
            return Ok(());
        };

        if transcript.is_final {
            info!("Final text on channel {}: {}", channel_id, transcript.text);
        }

        let locale = transcript
            .locale
            .clone()
            .or(stored_locale)
            .unwrap_or_default();
        let envelope = TranscriptEnvelope::new(
            &meeting_id,
            &user_id,
            &locale,
            &transcript.text,
            transcript.is_final,
        );

        if let Err(err) = self.publisher.publish_transcript(&envelope).await {
            warn!("{}", Error::Publish(format!("{err:#}")));
        }

        if transcript.is_final {
            self.on_transcript_final(channel_id).await;
        }

        Ok(())
    }

    /// Current fork state of a channel, if a session exists.
    pub async fn fork_state(&self, channel_id: &str) -> Option<ForkState> {
        let session = self.session(channel_id).await?;
        let state = session.lock().await.fork_state;
        Some(state)
    }

    pub async fn active_session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    async fn session(&self, channel_id: &str) -> Option<Arc<Mutex<ChannelSession>>> {
        self.sessions.read().await.get(channel_id).cloned()
    }

    /// Terminal stop: issue the command once, return to Idle, drop the
    /// session record. Re-checks state under the lock because the confirming
    /// paths race each other.
    async fn issue_stop(&self, channel_id: &str, session: &Arc<Mutex<ChannelSession>>) {
        {
            let mut guard = session.lock().await;
            if guard.fork_state != ForkState::StopRequested {
                return;
            }

            match self.resolver.end_message(&guard.provider) {
                Ok(payload) => {
                    let command = ForkCommand::Stop {
                        channel_id,
                        payload: &payload,
                    }
                    .to_string();

                    info!("Stopping audio fork on channel {}", channel_id);
                    self.dispatch(&command).await;
                }
                Err(err) => warn!(
                    "No end message for provider {}: {}",
                    guard.provider, err
                ),
            }

            guard.transition(ForkState::Idle);
        }

        // A fresh start may have won the session lock between the transition
        // above and here; only a record still Idle is dropped.
        let mut sessions = self.sessions.write().await;
        if let Some(entry) = sessions.get(channel_id).cloned() {
            if entry.lock().await.fork_state == ForkState::Idle {
                sessions.remove(channel_id);
            }
        }
    }

    /// With a grace configured, a pending stop that never sees its final
    /// result is forced out after the bound instead of wedging the channel.
    fn arm_stop_grace(&self, channel_id: &str, generation: u64) {
        let Some(grace) = self.stop_grace else { return };
        let Some(coordinator) = self.weak.upgrade() else {
            return;
        };
        let channel_id = channel_id.to_string();

        tokio::spawn(async move {
            tokio::time::sleep(grace).await;

            let Some(session) = coordinator.session(&channel_id).await else {
                return;
            };
            let still_pending = {
                let guard = session.lock().await;
                guard.fork_state == ForkState::StopRequested && guard.generation == generation
            };

            if still_pending {
                warn!(
                    "No final result within stop grace on channel {}, forcing stop",
                    channel_id
                );
                coordinator.issue_stop(&channel_id, &session).await;
            }
        });
    }

    /// Fire-and-forget dispatch: a failure is logged, never retried, and the
    /// transition stands so a later event retries naturally.
    async fn dispatch(&self, command: &str) {
        if let Err(err) = self.transport.execute(command).await {
            warn!("{}", Error::CommandDispatch(format!("{err:#}")));
        }
    }
}
