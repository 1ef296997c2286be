use std::collections::HashMap;
use std::sync::Arc;

use transcription_manager::config::ProviderSettings;
use transcription_manager::provider::ProviderResolver;
use transcription_manager::store::{MemoryKv, SessionStore};
use transcription_manager::Error;

fn resolver_with(providers: HashMap<String, ProviderSettings>) -> (ProviderResolver, Arc<SessionStore>) {
    let store = Arc::new(SessionStore::new(Arc::new(MemoryKv::new()), None));
    (ProviderResolver::new(providers, 16, Arc::clone(&store)), store)
}

fn vosk_settings() -> ProviderSettings {
    ProviderSettings {
        server: None,
        servers: HashMap::from([("en-US".to_string(), "ws://vosk-en:2700".to_string())]),
        start_message: r#"{"config": {"sample_rate": "8000"}}"#.to_string(),
        end_message: r#"{"eof": 1}"#.to_string(),
    }
}

fn gladia_settings() -> ProviderSettings {
    ProviderSettings {
        server: Some("ws://gladia:9000".to_string()),
        servers: HashMap::new(),
        start_message: r#"{"x_gladia_key": "key"}"#.to_string(),
        end_message: r#"{"event": "terminate"}"#.to_string(),
    }
}

#[tokio::test]
async fn unset_provider_fails_resolution() {
    let (resolver, store) = resolver_with(HashMap::from([("vosk".to_string(), vosk_settings())]));
    store.set_user_locale("U1", "en-US").await.unwrap();

    assert!(matches!(
        resolver.resolve("U1").await,
        Err(Error::NoProviderConfigured(_))
    ));
}

#[tokio::test]
async fn empty_locale_fails_resolution() {
    let (resolver, store) = resolver_with(HashMap::from([("vosk".to_string(), vosk_settings())]));
    store.set_user_provider("U1", "vosk").await.unwrap();
    store.set_user_locale("U1", "").await.unwrap();

    assert!(matches!(
        resolver.resolve("U1").await,
        Err(Error::NoProviderConfigured(_))
    ));
}

#[tokio::test]
async fn locale_scoped_provider_picks_the_locale_endpoint() {
    let (resolver, store) = resolver_with(HashMap::from([("vosk".to_string(), vosk_settings())]));
    store.set_user_provider("U1", "vosk").await.unwrap();
    store.set_user_locale("U1", "en-US").await.unwrap();

    let resolved = resolver.resolve("U1").await.unwrap();
    assert_eq!(resolved.server_url, "ws://vosk-en:2700");
    assert_eq!(resolved.provider, "vosk");
    assert_eq!(resolved.locale, "en-US");
}

#[tokio::test]
async fn locale_without_endpoint_fails_resolution() {
    let (resolver, store) = resolver_with(HashMap::from([("vosk".to_string(), vosk_settings())]));
    store.set_user_provider("U1", "vosk").await.unwrap();
    store.set_user_locale("U1", "de-DE").await.unwrap();

    assert!(matches!(
        resolver.resolve("U1").await,
        Err(Error::NoProviderConfigured(_))
    ));
}

#[tokio::test]
async fn global_provider_ignores_locale_for_the_endpoint() {
    let (resolver, store) =
        resolver_with(HashMap::from([("gladia".to_string(), gladia_settings())]));
    store.set_user_provider("U1", "gladia").await.unwrap();
    store.set_user_locale("U1", "fr-FR").await.unwrap();

    let resolved = resolver.resolve("U1").await.unwrap();
    assert_eq!(resolved.server_url, "ws://gladia:9000");
}

#[tokio::test]
async fn vosk_start_message_patches_sample_rate_as_string() {
    let (resolver, store) = resolver_with(HashMap::from([("vosk".to_string(), vosk_settings())]));
    store.set_user_provider("U1", "vosk").await.unwrap();
    store.set_user_locale("U1", "en-US").await.unwrap();

    let resolved = resolver.resolve("U1").await.unwrap();
    let message = resolver.start_message(&resolved).unwrap();

    assert_eq!(message["config"]["sample_rate"], "16000");
}

#[tokio::test]
async fn gladia_start_message_patches_rate_and_language() {
    let (resolver, store) =
        resolver_with(HashMap::from([("gladia".to_string(), gladia_settings())]));
    store.set_user_provider("U1", "gladia").await.unwrap();
    store.set_user_locale("U1", "fr-FR").await.unwrap();

    let resolved = resolver.resolve("U1").await.unwrap();
    let message = resolver.start_message(&resolved).unwrap();

    assert_eq!(message["sample_rate"], 16000);
    assert_eq!(message["language"], "fr");
    assert_eq!(message["x_gladia_key"], "key");
}

#[tokio::test]
async fn unknown_start_template_provider_is_not_patched() {
    let mut settings = vosk_settings();
    settings.start_message = r#"{"hello": true}"#.to_string();
    let (resolver, store) = resolver_with(HashMap::from([("other".to_string(), settings)]));
    store.set_user_provider("U1", "other").await.unwrap();
    store.set_user_locale("U1", "en-US").await.unwrap();

    // "other" has no en-US endpoint either, but the template path is
    // reachable directly.
    let message = resolver
        .start_message(&transcription_manager::ResolvedProvider {
            provider: "other".to_string(),
            locale: "en-US".to_string(),
            server_url: "ws://x".to_string(),
        })
        .unwrap();

    assert_eq!(message, serde_json::json!({"hello": true}));
}

#[tokio::test]
async fn broken_template_is_reported() {
    let mut settings = vosk_settings();
    settings.end_message = "{not json".to_string();
    let (resolver, _store) = resolver_with(HashMap::from([("vosk".to_string(), settings)]));

    assert!(matches!(
        resolver.end_message("vosk"),
        Err(Error::BadTemplate(_, _))
    ));
}
