use serde_json::Value;
use std::fmt;

/// Fork-control command rendered into the transport's single-string form.
///
/// Start commands carry the provider endpoint, the audio format and the
/// JSON start payload; stop commands carry only the end payload.
#[derive(Debug)]
pub enum ForkCommand<'a> {
    Start {
        channel_id: &'a str,
        server_url: &'a str,
        sample_rate_khz: u32,
        payload: &'a Value,
    },
    Stop {
        channel_id: &'a str,
        payload: &'a Value,
    },
}

impl fmt::Display for ForkCommand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start {
                channel_id,
                server_url,
                sample_rate_khz,
                payload,
            } => write!(
                f,
                "uuid_audio_fork {} start {} mono {}k {}",
                channel_id, server_url, sample_rate_khz, payload
            ),
            Self::Stop {
                channel_id,
                payload,
            } => write!(f, "uuid_audio_fork {} stop {}", channel_id, payload),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn start_command_layout() {
        let payload = json!({"config": {"sample_rate": "16000"}});
        let command = ForkCommand::Start {
            channel_id: "chan-1",
            server_url: "ws://vosk:2700",
            sample_rate_khz: 16,
            payload: &payload,
        }
        .to_string();

        assert!(command.starts_with("uuid_audio_fork chan-1 start ws://vosk:2700 mono 16k "));
        assert!(command.ends_with(r#"{"config":{"sample_rate":"16000"}}"#));
    }

    #[test]
    fn stop_command_layout() {
        let payload = json!({"eof": 1});
        let command = ForkCommand::Stop {
            channel_id: "chan-1",
            payload: &payload,
        }
        .to_string();

        assert_eq!(command, r#"uuid_audio_fork chan-1 stop {"eof":1}"#);
    }
}
