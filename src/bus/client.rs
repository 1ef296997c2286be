use super::messages::TranscriptEnvelope;
use super::TranscriptPublisher;
use anyhow::{Context, Result};
use async_nats::Client;
use async_trait::async_trait;
use tracing::info;

/// NATS-backed bus client. The same connection also carries the KV bucket.
pub struct BusClient {
    client: Client,
    publish_subject: String,
}

impl BusClient {
    pub async fn connect(url: &str, publish_subject: String) -> Result<Self> {
        info!("Connecting to NATS at {}", url);

        let client = async_nats::connect(url)
            .await
            .context("Failed to connect to NATS")?;

        info!("Connected to NATS successfully");

        Ok(Self {
            client,
            publish_subject,
        })
    }

    /// Handle for opening the KV bucket on the shared connection.
    pub fn nats_client(&self) -> Client {
        self.client.clone()
    }

    /// Subscribe to the application's event subject.
    pub async fn subscribe_app_events(&self, subject: &str) -> Result<async_nats::Subscriber> {
        info!("Subscribing to application events on {}", subject);

        self.client
            .subscribe(subject.to_string())
            .await
            .context("Failed to subscribe to application events")
    }
}

#[async_trait]
impl TranscriptPublisher for BusClient {
    async fn publish_transcript(&self, envelope: &TranscriptEnvelope) -> Result<()> {
        let payload = serde_json::to_vec(envelope)?;

        self.client
            .publish(self.publish_subject.clone(), payload.into())
            .await
            .context("Failed to publish transcript")?;

        Ok(())
    }
}
