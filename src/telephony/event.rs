use serde_json::Value;

/// Inbound telephony lifecycle events, decoded from the event socket's JSON
/// event frames into the shape the router dispatches on.
#[derive(Debug, Clone)]
pub enum TelephonyEvent {
    ChannelAnswer {
        channel_id: String,
        call_id: String,
        caller_username: Option<String>,
    },
    ChannelHangup {
        channel_id: String,
        call_id: String,
    },
    FloorChanged {
        room_id: String,
        member_id: String,
    },
    StartTalking {
        channel_id: String,
        user_id: String,
    },
    StopTalking {
        channel_id: String,
        user_id: String,
    },
    Muted {
        channel_id: String,
        user_id: String,
    },
    /// Speech provider callback forwarded over the fork, body is the raw
    /// provider JSON
    ProviderTranscript {
        channel_id: String,
        voice_conf: String,
        caller_username: String,
        body: String,
    },
}

/// The caller username carries the user id as its first two `_`-separated
/// segments; the rest is per-leg decoration.
pub fn user_id_from_caller(caller_username: &str) -> String {
    caller_username
        .split('_')
        .take(2)
        .collect::<Vec<_>>()
        .join("_")
}

impl TelephonyEvent {
    /// Maps one event-socket JSON frame; events the coordinator does not
    /// consume come back as `None`.
    pub fn from_esl_json(event: &Value) -> Option<Self> {
        let name = event.get("Event-Name")?.as_str()?;

        match name {
            "CHANNEL_ANSWER" => Some(Self::ChannelAnswer {
                channel_id: header(event, "Channel-Call-UUID")?,
                call_id: header(event, "Unique-ID").unwrap_or_default(),
                caller_username: header(event, "Caller-Username"),
            }),
            "CHANNEL_HANGUP" => Some(Self::ChannelHangup {
                channel_id: header(event, "Channel-Call-UUID")?,
                call_id: header(event, "Unique-ID").unwrap_or_default(),
            }),
            "CUSTOM" => match event.get("Event-Subclass")?.as_str()? {
                "mod_audio_fork::json" => Some(Self::ProviderTranscript {
                    channel_id: header(event, "Channel-Call-UUID")?,
                    voice_conf: header(event, "variable_conference_name")?,
                    caller_username: header(event, "Caller-Username")?,
                    body: header(event, "_body").unwrap_or_default(),
                }),
                "conference::maintenance" => Self::from_conference_event(event),
                _ => None,
            },
            _ => None,
        }
    }

    fn from_conference_event(event: &Value) -> Option<Self> {
        let action = header(event, "Action")?;
        let channel_id = header(event, "Channel-Call-UUID").unwrap_or_default();
        let user_id = header(event, "Caller-Username")
            .as_deref()
            .map(user_id_from_caller)
            .unwrap_or_default();

        match action.as_str() {
            "floor-change" => Some(Self::FloorChanged {
                room_id: header(event, "Conference-Name")?,
                member_id: header(event, "New-ID").unwrap_or_default(),
            }),
            "start-talking" => Some(Self::StartTalking { channel_id, user_id }),
            "stop-talking" => Some(Self::StopTalking { channel_id, user_id }),
            "mute-member" => Some(Self::Muted { channel_id, user_id }),
            _ => None,
        }
    }
}

fn header(event: &Value, name: &str) -> Option<String> {
    event.get(name)?.as_str().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn caller_username_keeps_first_two_segments() {
        assert_eq!(user_id_from_caller("w_abc123_1_john"), "w_abc123");
        assert_eq!(user_id_from_caller("solo"), "solo");
    }

    #[test]
    fn transcript_event_carries_body() {
        let frame = json!({
            "Event-Name": "CUSTOM",
            "Event-Subclass": "mod_audio_fork::json",
            "Channel-Call-UUID": "chan-1",
            "variable_conference_name": "70000",
            "Caller-Username": "w_abc123_1_john",
            "_body": "{\"text\": \"hello\"}",
        });

        match TelephonyEvent::from_esl_json(&frame) {
            Some(TelephonyEvent::ProviderTranscript {
                channel_id,
                voice_conf,
                caller_username,
                body,
            }) => {
                assert_eq!(channel_id, "chan-1");
                assert_eq!(voice_conf, "70000");
                assert_eq!(caller_username, "w_abc123_1_john");
                assert_eq!(body, "{\"text\": \"hello\"}");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn unknown_events_are_skipped() {
        let frame = json!({"Event-Name": "HEARTBEAT"});
        assert!(TelephonyEvent::from_esl_json(&frame).is_none());
    }
}
