use anyhow::{Context, Result};
use clap::Parser;
use futures::StreamExt;
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info, warn};

use transcription_manager::bus::{AppEvent, BusClient, TranscriptPublisher};
use transcription_manager::coordinator::{self, Coordinator};
use transcription_manager::provider::ProviderResolver;
use transcription_manager::proxy::ProxySupervisor;
use transcription_manager::store::{NatsKv, SessionStore};
use transcription_manager::telephony::{EslTransport, ForkControl};
use transcription_manager::Config;

#[derive(Parser, Debug)]
#[command(
    name = "transcription-manager",
    about = "Bridges telephony audio forks to speech-to-text providers"
)]
struct Args {
    /// Configuration file, without extension
    #[arg(long, default_value = "config/transcription-manager")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("{} starting", cfg.service.name);

    let proxy = if cfg.proxy.enabled {
        Some(ProxySupervisor::spawn(&cfg.proxy)?)
    } else {
        None
    };

    let bus = Arc::new(BusClient::connect(&cfg.nats.url, cfg.nats.publish_subject.clone()).await?);
    let kv = Arc::new(NatsKv::open(bus.nats_client(), &cfg.nats.kv_bucket).await?);
    let store = Arc::new(SessionStore::new(kv, cfg.transcription.lookup_timeout()));

    // The one failure that prevents startup.
    let (transport, mut telephony_events) = EslTransport::connect(
        &cfg.freeswitch.host,
        cfg.freeswitch.port,
        &cfg.freeswitch.password,
    )
    .await
    .context("Failed to establish telephony transport connection")?;

    let resolver = ProviderResolver::new(
        cfg.providers.clone(),
        cfg.transcription.sample_rate,
        Arc::clone(&store),
    );
    let coordinator = Coordinator::new(
        resolver,
        Arc::clone(&store),
        Arc::new(transport) as Arc<dyn ForkControl>,
        Arc::clone(&bus) as Arc<dyn TranscriptPublisher>,
        &cfg.transcription,
    );

    // Application bus intake keeps the session mappings current.
    let mut app_events = bus.subscribe_app_events(&cfg.nats.subscribe_subject).await?;
    let intake_store = Arc::clone(&store);
    tokio::spawn(async move {
        while let Some(message) = app_events.next().await {
            let Some(event) = AppEvent::parse(&message.payload) else {
                continue;
            };
            if let Err(err) = apply_app_event(&intake_store, event).await {
                warn!("Failed to apply application event: {:#}", err);
            }
        }
    });

    // Each telephony event runs in its own task so channels never block each
    // other; same-channel ordering rides the per-session lock.
    let dispatcher = Arc::clone(&coordinator);
    let telephony_loop = tokio::spawn(async move {
        while let Some(event) = telephony_events.recv().await {
            let coordinator = Arc::clone(&dispatcher);
            tokio::spawn(async move {
                coordinator::dispatch(&coordinator, event).await;
            });
        }
        error!("Telephony event stream closed");
    });

    wait_for_shutdown().await?;
    info!("Closing process, cleaning up");

    if let Some(proxy) = proxy {
        proxy.shutdown().await;
    }
    telephony_loop.abort();

    Ok(())
}

async fn apply_app_event(store: &SessionStore, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::MeetingCreated {
            voice_conf,
            meeting_id,
        } => store.set_voice_to_meeting(&voice_conf, &meeting_id).await,
        AppEvent::SpeechLocaleChanged {
            user_id,
            provider,
            locale,
        } => {
            info!("Speech changed {} {} {}", user_id, provider, locale);
            store.set_user_provider(&user_id, &provider).await?;
            store.set_user_locale(&user_id, &locale).await
        }
    }
}

/// INT, QUIT and TERM all map to the same graceful-shutdown path.
async fn wait_for_shutdown() -> Result<()> {
    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut quit = signal(SignalKind::quit())?;
    let mut terminate = signal(SignalKind::terminate())?;

    tokio::select! {
        _ = interrupt.recv() => {}
        _ = quit.recv() => {}
        _ = terminate.recv() => {}
    }

    Ok(())
}
