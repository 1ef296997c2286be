use serde_json::json;
use transcription_manager::TranscriptFilter;

#[test]
fn ignore_word_is_discarded() {
    let mut filter = TranscriptFilter::new(true);

    assert!(filter.apply(&json!({"partial": "the"})).is_none());
    assert!(filter.apply(&json!({"partial": ""})).is_none());
}

#[test]
fn consecutive_duplicate_partials_are_suppressed() {
    let mut filter = TranscriptFilter::new(true);

    let first = filter.apply(&json!({"partial": "hello"})).unwrap();
    assert_eq!(first.text, "hello");
    assert!(!first.is_final);

    assert!(filter.apply(&json!({"partial": "hello"})).is_none());

    let changed = filter.apply(&json!({"partial": "hello there"})).unwrap();
    assert_eq!(changed.text, "hello there");
}

#[test]
fn final_text_bypasses_duplicate_suppression() {
    let mut filter = TranscriptFilter::new(true);

    assert!(filter.apply(&json!({"partial": "hello"})).is_some());
    assert!(filter.apply(&json!({"partial": "hello"})).is_none());

    let final_result = filter.apply(&json!({"text": "hello"})).unwrap();
    assert_eq!(final_result.text, "hello");
    assert!(final_result.is_final);
}

#[test]
fn final_text_bypasses_ignore_list() {
    let mut filter = TranscriptFilter::new(true);

    let result = filter.apply(&json!({"text": "the"})).unwrap();
    assert!(result.is_final);
}

#[test]
fn partials_are_dropped_when_disabled() {
    let mut filter = TranscriptFilter::new(false);

    assert!(filter.apply(&json!({"partial": "hello"})).is_none());

    let final_result = filter.apply(&json!({"text": "hello"})).unwrap();
    assert!(final_result.is_final);
}

#[test]
fn malformed_payload_is_judged_as_empty() {
    let mut filter = TranscriptFilter::new(true);

    assert!(filter.apply_raw("not json at all").is_none());
    assert!(filter.apply_raw("").is_none());
}

#[test]
fn empty_payload_is_discarded() {
    let mut filter = TranscriptFilter::new(true);

    assert!(filter.apply(&json!({})).is_none());
}

#[test]
fn text_wins_over_partial_in_the_same_payload() {
    let mut filter = TranscriptFilter::new(true);

    let result = filter
        .apply(&json!({"partial": "hel", "text": "hello"}))
        .unwrap();
    assert_eq!(result.text, "hello");
    assert!(result.is_final);
}

#[test]
fn inline_locale_is_forwarded() {
    let mut filter = TranscriptFilter::new(true);

    let result = filter
        .apply(&json!({"text": "ola", "locale": "pt-BR"}))
        .unwrap();
    assert_eq!(result.locale.as_deref(), Some("pt-BR"));

    let mut filter = TranscriptFilter::new(true);
    let result = filter.apply(&json!({"text": "hello"})).unwrap();
    assert!(result.locale.is_none());
}
