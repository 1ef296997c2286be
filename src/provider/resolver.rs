use crate::config::ProviderSettings;
use crate::error::Error;
use crate::store::SessionStore;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// The provider/locale pair chosen for one fork-start decision, together with
/// the endpoint the transport should stream to.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProvider {
    pub provider: String,
    pub locale: String,
    pub server_url: String,
}

/// Resolves users to providers and providers to endpoints and messages.
///
/// Resolution is intentionally uncached: provider and locale can change in
/// the middle of a call and the next decision must see the new values.
pub struct ProviderResolver {
    providers: HashMap<String, ProviderSettings>,
    sample_rate: u32,
    store: Arc<SessionStore>,
}

impl ProviderResolver {
    pub fn new(
        providers: HashMap<String, ProviderSettings>,
        sample_rate: u32,
        store: Arc<SessionStore>,
    ) -> Self {
        Self {
            providers,
            sample_rate,
            store,
        }
    }

    pub fn sample_rate_khz(&self) -> u32 {
        self.sample_rate
    }

    /// Two independent lookups, provider then locale. Either one missing or
    /// empty means no session may start for this user.
    pub async fn resolve(&self, user_id: &str) -> Result<ResolvedProvider, Error> {
        let provider = self
            .store
            .user_provider(user_id)
            .await
            .map_err(|e| Error::Store(e.to_string()))?;
        let locale = self
            .store
            .user_locale(user_id)
            .await
            .map_err(|e| Error::Store(e.to_string()))?;

        let (provider, locale) = match (non_empty(provider), non_empty(locale)) {
            (Some(provider), Some(locale)) => (provider, locale),
            _ => return Err(Error::NoProviderConfigured(user_id.to_string())),
        };

        let settings = self
            .providers
            .get(&provider)
            .ok_or_else(|| Error::NoProviderConfigured(user_id.to_string()))?;

        let server_url = match &settings.server {
            // Globally scoped provider, one endpoint for every locale
            Some(url) => url.clone(),
            None => settings
                .servers
                .get(&locale)
                // config file keys may arrive case-normalized
                .or_else(|| settings.servers.get(&locale.to_lowercase()))
                .cloned()
                .ok_or_else(|| Error::NoProviderConfigured(user_id.to_string()))?,
        };

        Ok(ResolvedProvider {
            provider,
            locale,
            server_url,
        })
    }

    /// The provider's start template with the per-provider fields patched in.
    pub fn start_message(&self, resolved: &ResolvedProvider) -> Result<Value, Error> {
        let mut message = self.template(&resolved.provider, "start")?;

        match resolved.provider.as_str() {
            "vosk" => {
                message["config"]["sample_rate"] =
                    Value::String(format!("{}000", self.sample_rate));
            }
            "gladia" => {
                message["sample_rate"] = Value::from(u64::from(self.sample_rate) * 1000);
                message["language"] =
                    Value::String(resolved.locale.chars().take(2).collect());
            }
            _ => {}
        }

        Ok(message)
    }

    pub fn end_message(&self, provider: &str) -> Result<Value, Error> {
        self.template(provider, "end")
    }

    fn template(&self, provider: &str, which: &str) -> Result<Value, Error> {
        let settings = self
            .providers
            .get(provider)
            .ok_or_else(|| Error::NoProviderConfigured(provider.to_string()))?;

        let raw = match which {
            "start" => &settings.start_message,
            _ => &settings.end_message,
        };

        let message: Value = serde_json::from_str(raw)
            .map_err(|e| Error::BadTemplate(provider.to_string(), e.to_string()))?;

        if !message.is_object() {
            return Err(Error::BadTemplate(
                provider.to_string(),
                "template is not a JSON object".to_string(),
            ));
        }

        Ok(message)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
