use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use transcription_manager::store::{KvStore, MemoryKv, SessionStore};

/// Backend that takes a fixed time to answer any lookup.
struct SlowKv {
    delay: Duration,
}

#[async_trait]
impl KvStore for SlowKv {
    async fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
        tokio::time::sleep(self.delay).await;
        Ok(Some("value".to_string()))
    }

    async fn set(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn lookup_past_the_bound_is_treated_as_absent() {
    let kv = Arc::new(SlowKv {
        delay: Duration::from_millis(200),
    });
    let store = SessionStore::new(kv, Some(Duration::from_millis(20)));

    assert_eq!(store.user_provider("U1").await.unwrap(), None);
    assert_eq!(store.meeting_for_voice_conf("V1").await.unwrap(), None);
}

#[tokio::test]
async fn lookup_within_the_bound_passes_through() {
    let kv = Arc::new(SlowKv {
        delay: Duration::from_millis(5),
    });
    let store = SessionStore::new(kv, Some(Duration::from_millis(500)));

    assert_eq!(
        store.user_locale("U1").await.unwrap(),
        Some("value".to_string())
    );
}

#[tokio::test]
async fn no_bound_means_the_lookup_always_completes() {
    let kv = Arc::new(MemoryKv::new());
    let store = SessionStore::new(kv, None);

    store.set_user_locale("U1", "en-US").await.unwrap();
    assert_eq!(
        store.user_locale("U1").await.unwrap(),
        Some("en-US".to_string())
    );
}
