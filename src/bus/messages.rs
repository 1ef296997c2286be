use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const UPDATE_TRANSCRIPT_MSG: &str = "UpdateTranscriptPubMsg";
pub const MEETING_CREATED_MSG: &str = "MeetingCreatedEvtMsg";
pub const SPEECH_LOCALE_CHANGED_MSG: &str = "UserSpeechLocaleChangedEvtMsg";

/// Outbound transcript update in the owning application's envelope format.
/// Field names and the redundant header/body shape mirror that application's
/// wire contract exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEnvelope {
    pub envelope: Envelope,
    pub core: Core,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub name: String,
    pub routing: Routing,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Routing {
    #[serde(rename = "meetingId")]
    pub meeting_id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Core {
    pub header: CoreHeader,
    pub body: TranscriptBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreHeader {
    pub name: String,
    #[serde(rename = "meetingId")]
    pub meeting_id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptBody {
    /// Unique per update, never parsed back
    #[serde(rename = "transcriptId")]
    pub transcript_id: String,
    pub start: String,
    pub end: String,
    pub text: String,
    pub transcript: String,
    pub locale: String,
    /// `true` for a final result, `false` for a partial
    pub result: bool,
}

impl TranscriptEnvelope {
    pub fn new(
        meeting_id: &str,
        user_id: &str,
        locale: &str,
        transcript: &str,
        result: bool,
    ) -> Self {
        let timestamp = Utc::now().timestamp_millis();

        Self {
            envelope: Envelope {
                name: UPDATE_TRANSCRIPT_MSG.to_string(),
                routing: Routing {
                    meeting_id: meeting_id.to_string(),
                    user_id: user_id.to_string(),
                },
                timestamp,
            },
            core: Core {
                header: CoreHeader {
                    name: UPDATE_TRANSCRIPT_MSG.to_string(),
                    meeting_id: meeting_id.to_string(),
                    user_id: user_id.to_string(),
                },
                body: TranscriptBody {
                    transcript_id: format!("{user_id}-{timestamp}"),
                    start: "0".to_string(),
                    end: "0".to_string(),
                    text: String::new(),
                    transcript: transcript.to_string(),
                    locale: locale.to_string(),
                    result,
                },
            },
        }
    }
}

/// Inbound application events the coordinator subscribes for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    MeetingCreated {
        voice_conf: String,
        meeting_id: String,
    },
    SpeechLocaleChanged {
        user_id: String,
        provider: String,
        locale: String,
    },
}

impl AppEvent {
    /// Decodes one bus message; messages with other names are ignored.
    pub fn parse(payload: &[u8]) -> Option<Self> {
        let message: Value = serde_json::from_slice(payload).ok()?;
        let core = message.get("core")?;
        let header = core.get("header")?;
        let body = core.get("body")?;

        match header.get("name")?.as_str()? {
            MEETING_CREATED_MSG => {
                let props = body.get("props")?;
                Some(Self::MeetingCreated {
                    voice_conf: field(props.get("voiceProp")?, "voiceConf")?,
                    meeting_id: field(props.get("meetingProp")?, "intId")?,
                })
            }
            SPEECH_LOCALE_CHANGED_MSG => Some(Self::SpeechLocaleChanged {
                user_id: field(header, "userId")?,
                provider: field(body, "provider")?,
                locale: field(body, "locale")?,
            }),
            _ => None,
        }
    }
}

fn field(value: &Value, name: &str) -> Option<String> {
    value.get(name)?.as_str().map(str::to_string)
}
