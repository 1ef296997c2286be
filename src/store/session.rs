use super::kv::KvStore;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

const VOICE_TO_MEETING_KEY: &str = "transcription-manager_voiceToMeeting";
const USER_LOCALE_KEY: &str = "transcription-manager_locale";
const USER_PROVIDER_KEY: &str = "transcription-manager_provider";

/// Typed access to the coordinator's three key families. Writers are the
/// application-bus events; readers are the fork-start decision and the
/// transcript callback path.
pub struct SessionStore {
    kv: Arc<dyn KvStore>,
    lookup_timeout: Option<Duration>,
}

impl SessionStore {
    pub fn new(kv: Arc<dyn KvStore>, lookup_timeout: Option<Duration>) -> Self {
        Self { kv, lookup_timeout }
    }

    pub async fn meeting_for_voice_conf(&self, voice_conf: &str) -> Result<Option<String>> {
        self.get(format!("{VOICE_TO_MEETING_KEY}_{voice_conf}")).await
    }

    pub async fn set_voice_to_meeting(&self, voice_conf: &str, meeting_id: &str) -> Result<()> {
        self.kv
            .set(&format!("{VOICE_TO_MEETING_KEY}_{voice_conf}"), meeting_id)
            .await
    }

    pub async fn user_locale(&self, user_id: &str) -> Result<Option<String>> {
        self.get(format!("{USER_LOCALE_KEY}_{user_id}")).await
    }

    pub async fn set_user_locale(&self, user_id: &str, locale: &str) -> Result<()> {
        self.kv
            .set(&format!("{USER_LOCALE_KEY}_{user_id}"), locale)
            .await
    }

    pub async fn user_provider(&self, user_id: &str) -> Result<Option<String>> {
        self.get(format!("{USER_PROVIDER_KEY}_{user_id}")).await
    }

    pub async fn set_user_provider(&self, user_id: &str, provider: &str) -> Result<()> {
        self.kv
            .set(&format!("{USER_PROVIDER_KEY}_{user_id}"), provider)
            .await
    }

    /// A lookup that outlives the configured bound is reported as absent so
    /// the caller waits instead of wedging a channel.
    async fn get(&self, key: String) -> Result<Option<String>> {
        match self.lookup_timeout {
            Some(limit) => match tokio::time::timeout(limit, self.kv.get(&key)).await {
                Ok(result) => result,
                Err(_) => {
                    warn!("Lookup timed out for {}", key);
                    Ok(None)
                }
            },
            None => self.kv.get(&key).await,
        }
    }
}
