use anyhow::Result;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub freeswitch: FreeswitchConfig,
    pub nats: NatsConfig,
    pub transcription: TranscriptionConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub providers: HashMap<String, ProviderSettings>,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
}

/// Event-socket endpoint of the telephony platform.
#[derive(Debug, Deserialize)]
pub struct FreeswitchConfig {
    pub host: String,
    pub port: u16,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct NatsConfig {
    pub url: String,
    /// Subject transcript updates are published to
    pub publish_subject: String,
    /// Subject carrying meeting-created and locale-changed events
    pub subscribe_subject: String,
    /// JetStream KV bucket holding the session mappings
    pub kv_bucket: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionConfig {
    /// Fork audio sample rate in kHz, forwarded to providers as "<rate>000"
    pub sample_rate: u32,

    /// Whether partial (interim) provider results are forwarded at all
    pub include_partial_results: bool,

    /// Upper bound on a single key-value lookup; elapse counts as "absent"
    pub lookup_timeout_ms: Option<u64>,

    /// How long a pending stop waits for a final result before the stop
    /// command is forced out anyway
    pub stop_grace_ms: Option<u64>,
}

impl TranscriptionConfig {
    pub fn lookup_timeout(&self) -> Option<Duration> {
        self.lookup_timeout_ms.map(Duration::from_millis)
    }

    pub fn stop_grace(&self) -> Option<Duration> {
        self.stop_grace_ms.map(Duration::from_millis)
    }
}

/// Per-provider endpoint and message templates. A provider either exposes one
/// global `server` or a `servers` table keyed by locale, never both.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSettings {
    pub server: Option<String>,
    #[serde(default)]
    pub servers: HashMap<String, String>,
    /// JSON template sent when a fork starts, patched per provider
    pub start_message: String,
    /// JSON template sent when a fork stops
    pub end_message: String,
}

/// Supervised auxiliary process proxying one provider's protocol.
#[derive(Debug, Clone, Deserialize)]
pub struct ProxyConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_proxy_log")]
    pub log_file: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            command: String::new(),
            args: Vec::new(),
            log_file: default_proxy_log(),
        }
    }
}

fn default_proxy_log() -> String {
    "gladia-proxy.log".to_string()
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
