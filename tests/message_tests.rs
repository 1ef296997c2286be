use transcription_manager::bus::messages::{AppEvent, TranscriptEnvelope};

#[test]
fn envelope_routes_match_the_composer_inputs() {
    let envelope = TranscriptEnvelope::new("M1", "U1", "en-US", "hi there", true);

    assert_eq!(envelope.envelope.name, "UpdateTranscriptPubMsg");
    assert_eq!(envelope.envelope.routing.meeting_id, "M1");
    assert_eq!(envelope.envelope.routing.user_id, "U1");
    assert_eq!(envelope.core.header.meeting_id, "M1");
    assert_eq!(envelope.core.header.user_id, "U1");
    assert_eq!(envelope.core.body.transcript, "hi there");
    assert_eq!(envelope.core.body.locale, "en-US");
    assert!(envelope.core.body.result);
    assert_eq!(
        envelope.core.body.transcript_id,
        format!("U1-{}", envelope.envelope.timestamp)
    );
}

#[test]
fn envelope_serializes_with_the_wire_field_names() {
    let envelope = TranscriptEnvelope::new("M1", "U1", "en-US", "partial text", false);
    let json = serde_json::to_string(&envelope).unwrap();

    assert!(json.contains(r#""meetingId":"M1""#));
    assert!(json.contains(r#""userId":"U1""#));
    assert!(json.contains(r#""transcriptId":"#));
    assert!(json.contains(r#""result":false"#));
    assert!(json.contains(r#""start":"0""#));
    assert!(json.contains(r#""end":"0""#));
    assert!(json.contains(r#""text":"""#));

    let back: TranscriptEnvelope = serde_json::from_str(&json).unwrap();
    assert_eq!(back.core.body.transcript, "partial text");
}

#[test]
fn meeting_created_event_is_decoded() {
    let payload = r#"{
        "envelope": {"name": "MeetingCreatedEvtMsg"},
        "core": {
            "header": {"name": "MeetingCreatedEvtMsg"},
            "body": {
                "props": {
                    "meetingProp": {"intId": "M1"},
                    "voiceProp": {"voiceConf": "70000"}
                }
            }
        }
    }"#;

    assert_eq!(
        AppEvent::parse(payload.as_bytes()),
        Some(AppEvent::MeetingCreated {
            voice_conf: "70000".to_string(),
            meeting_id: "M1".to_string(),
        })
    );
}

#[test]
fn speech_locale_changed_event_is_decoded() {
    let payload = r#"{
        "core": {
            "header": {
                "name": "UserSpeechLocaleChangedEvtMsg",
                "meetingId": "M1",
                "userId": "U1"
            },
            "body": {"provider": "vosk", "locale": "pt-BR"}
        }
    }"#;

    assert_eq!(
        AppEvent::parse(payload.as_bytes()),
        Some(AppEvent::SpeechLocaleChanged {
            user_id: "U1".to_string(),
            provider: "vosk".to_string(),
            locale: "pt-BR".to_string(),
        })
    );
}

#[test]
fn unrelated_and_malformed_messages_are_ignored() {
    let other = r#"{"core": {"header": {"name": "SomethingElseEvtMsg"}, "body": {}}}"#;
    assert_eq!(AppEvent::parse(other.as_bytes()), None);

    assert_eq!(AppEvent::parse(b"not json"), None);
    assert_eq!(AppEvent::parse(b"{}"), None);
}
