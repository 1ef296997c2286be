use super::coordinator::Coordinator;
use crate::telephony::{user_id_from_caller, TelephonyEvent};
use std::sync::Arc;
use tracing::{error, info};

/// Dispatches one inbound telephony event. Answer drives the fork start when
/// the channel carries a caller, hangup drives the stop path, transcript
/// callbacks run the full filter/publish path. Floor and voice-activity
/// events are observational.
pub async fn dispatch(coordinator: &Arc<Coordinator>, event: TelephonyEvent) {
    match event {
        TelephonyEvent::ChannelAnswer {
            channel_id,
            call_id,
            caller_username,
        } => {
            info!("FS: associating channel {} {}", channel_id, call_id);

            if let Some(caller) = caller_username {
                let user_id = user_id_from_caller(&caller);
                if let Err(err) = coordinator.start_fork(&channel_id, &user_id).await {
                    error!("Failed to start fork on channel {}: {:#}", channel_id, err);
                }
            }
        }
        TelephonyEvent::ChannelHangup {
            channel_id,
            call_id,
        } => {
            info!("FS: channel hangup {} {}", channel_id, call_id);

            if let Err(err) = coordinator.on_hangup(&channel_id).await {
                error!("Failed to stop fork on channel {}: {:#}", channel_id, err);
            }
        }
        TelephonyEvent::FloorChanged { room_id, member_id } => {
            info!("FS: floor changed {} {}", room_id, member_id);
        }
        TelephonyEvent::StartTalking {
            channel_id,
            user_id,
        } => {
            info!("FS: start talking {} userId: {}", channel_id, user_id);
        }
        TelephonyEvent::StopTalking {
            channel_id,
            user_id,
        } => {
            info!("FS: stop talking {} userId: {}", channel_id, user_id);
        }
        TelephonyEvent::Muted {
            channel_id,
            user_id,
        } => {
            info!("FS: muted {} userId: {}", channel_id, user_id);
        }
        TelephonyEvent::ProviderTranscript {
            channel_id,
            voice_conf,
            caller_username,
            body,
        } => {
            if let Err(err) = coordinator
                .handle_transcript(&channel_id, &voice_conf, &caller_username, &body)
                .await
            {
                error!(
                    "Failed to handle transcript on channel {}: {:#}",
                    channel_id, err
                );
            }
        }
    }
}
