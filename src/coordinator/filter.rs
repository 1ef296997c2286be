use serde_json::Value;
use tracing::debug;

/// Transcriptions never worth forwarding on their own.
const IGNORED_TRANSCRIPTIONS: [&str; 2] = ["", "the"];

/// A provider callback that passed filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredTranscript {
    pub text: String,
    pub is_final: bool,
    /// Locale the provider reported inline, if any
    pub locale: Option<String>,
}

/// Decides whether an incoming transcript is worth forwarding: suppresses
/// noise tokens, partials when disabled, and consecutive duplicate partials.
/// A final result always goes through.
#[derive(Debug, Clone)]
pub struct TranscriptFilter {
    include_partials: bool,
    prev_transcription: String,
}

impl TranscriptFilter {
    pub fn new(include_partials: bool) -> Self {
        Self {
            include_partials,
            prev_transcription: String::new(),
        }
    }

    /// Unparseable payloads are judged as empty, not failed.
    pub fn apply_raw(&mut self, raw: &str) -> Option<FilteredTranscript> {
        let body: Value =
            serde_json::from_str(raw).unwrap_or_else(|_| Value::Object(Default::default()));
        self.apply(&body)
    }

    pub fn apply(&mut self, body: &Value) -> Option<FilteredTranscript> {
        let final_text = non_empty_str(body.get("text"));
        let partial = non_empty_str(body.get("partial"));

        if partial.is_some() && !self.include_partials {
            debug!("Discard partial utterance");
            return None;
        }

        let transcription = final_text.or(partial).unwrap_or("");
        let is_final = final_text.is_some();

        if !is_final
            && (IGNORED_TRANSCRIPTIONS.contains(&transcription)
                || transcription == self.prev_transcription)
        {
            return None;
        }

        self.prev_transcription = transcription.to_string();

        Some(FilteredTranscript {
            text: transcription.to_string(),
            is_final,
            locale: body
                .get("locale")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}
