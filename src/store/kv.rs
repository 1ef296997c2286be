use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::info;

/// Plain get/set key-value access with no cross-key semantics.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// JetStream KV backed store, sharing the bus's NATS connection.
pub struct NatsKv {
    store: async_nats::jetstream::kv::Store,
}

impl NatsKv {
    /// Open the named bucket, creating it on first use.
    pub async fn open(client: async_nats::Client, bucket: &str) -> Result<Self> {
        let jetstream = async_nats::jetstream::new(client);

        let store = match jetstream.get_key_value(bucket).await {
            Ok(store) => store,
            Err(_) => {
                info!("Creating KV bucket {}", bucket);
                jetstream
                    .create_key_value(async_nats::jetstream::kv::Config {
                        bucket: bucket.to_string(),
                        ..Default::default()
                    })
                    .await
                    .context("Failed to create KV bucket")?
            }
        };

        Ok(Self { store })
    }
}

#[async_trait]
impl KvStore for NatsKv {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entry = self
            .store
            .get(key)
            .await
            .with_context(|| format!("KV get failed for {key}"))?;

        Ok(entry.map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.store
            .put(key, value.as_bytes().to_vec().into())
            .await
            .with_context(|| format!("KV put failed for {key}"))?;

        Ok(())
    }
}

/// In-memory store for tests and ephemeral single-process deployments.
#[derive(Default)]
pub struct MemoryKv {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryKv {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
